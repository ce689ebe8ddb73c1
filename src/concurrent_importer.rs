use std::io::Write;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task;
use tracing::debug;

use crate::dedup::reconcile;
use crate::error::{ImportError, Result};
use crate::export::write_records;
use crate::importer::{build_report, prepare_batch, ImportOptions};
use crate::models::{FinancialRecord, ImportReport, RecordKind};
use crate::persistence::{InsertOutcome, RecordStore};

/// One lock per record kind guarding fetch-keys -> dedupe -> insert
#[derive(Default)]
struct ImportSections {
    transactions: Mutex<()>,
    dividends: Mutex<()>,
}

impl ImportSections {
    fn for_kind(&self, kind: RecordKind) -> &Mutex<()> {
        match kind {
            RecordKind::Transaction => &self.transactions,
            RecordKind::Dividend => &self.dividends,
        }
    }
}

/// Async importer sharing one store between many tasks
///
/// Parsing and normalization run on the blocking thread pool without any
/// lock, so they never stall the async executor. The key snapshot, the
/// duplicate scan and the insert for a kind run inside that kind's critical
/// section, so two imports of the same kind can never both pass their
/// duplicate check against a stale snapshot. Imports of different kinds only
/// contend on the short store read/write locks.
///
/// # Example
///
/// ```no_run
/// use portfolio_import::concurrent_importer::SharedImporter;
/// use portfolio_import::importer::ImportOptions;
/// use portfolio_import::models::RecordKind;
/// use portfolio_import::persistence::MemoryStore;
///
/// #[tokio::main]
/// async fn main() {
///     let importer = SharedImporter::new(MemoryStore::new(), ImportOptions::default());
///     let handle = importer.clone_handle();
///
///     tokio::spawn(async move {
///         let csv = "Transaction Type,Currency,Account,Symbol,Date,Amount\n\
///                    Dividends,USD,ACC001234,AAPL,2024-01-15,150.25\n";
///         handle.import(RecordKind::Dividend, csv).await.unwrap();
///     });
/// }
/// ```
pub struct SharedImporter<S: RecordStore> {
    store: Arc<RwLock<S>>,
    sections: Arc<ImportSections>,
    options: Arc<ImportOptions>,
}

impl<S: RecordStore> SharedImporter<S> {
    pub fn new(store: S, options: ImportOptions) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            sections: Arc::new(ImportSections::default()),
            options: Arc::new(options),
        }
    }

    /// Import one delimited-text input of `kind`
    pub async fn import(&self, kind: RecordKind, input: impl Into<Vec<u8>>) -> Result<ImportReport> {
        let input = input.into();
        let options = Arc::clone(&self.options);
        let batch = task::spawn_blocking(move || prepare_batch(kind, input.as_slice(), &options))
            .await
            .map_err(|e| ImportError::Task(e.to_string()))??;

        let _section = self.sections.for_kind(kind).lock().await;
        debug!(%kind, rows = batch.total_rows, "Entered import section");

        let existing = self.store.read().await.list_all(kind)?;
        let partition = reconcile(&existing, batch.records);

        let outcome = if partition.fresh.is_empty() {
            InsertOutcome::default()
        } else {
            self.store
                .write()
                .await
                .insert_many(kind, partition.fresh.clone())?
        };

        Ok(build_report(
            kind,
            batch.total_rows,
            batch.errors,
            &partition,
            outcome,
        ))
    }

    /// Run several imports concurrently; results follow input order
    pub async fn import_all<I>(&self, jobs: Vec<(RecordKind, I)>) -> Vec<Result<ImportReport>>
    where
        I: Into<Vec<u8>>,
    {
        let futures: Vec<_> = jobs
            .into_iter()
            .map(|(kind, input)| self.import(kind, input))
            .collect();

        futures::future::join_all(futures).await
    }

    pub async fn list_all(&self, kind: RecordKind) -> Result<Vec<FinancialRecord>> {
        Ok(self.store.read().await.list_all(kind)?)
    }

    /// Write every stored record of `kind` as CSV; returns the row count
    pub async fn export<W: Write>(&self, kind: RecordKind, writer: W) -> Result<usize> {
        let records = self.list_all(kind).await?;
        write_records(kind, &records, writer)
    }

    /// Another handle to the same store and locks
    pub fn clone_handle(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            sections: Arc::clone(&self.sections),
            options: Arc::clone(&self.options),
        }
    }
}
