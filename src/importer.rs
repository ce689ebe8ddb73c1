use std::io::{Read, Write};

use tracing::{info, warn};

use crate::dedup::{reconcile, Partition};
use crate::error::{ImportError, Result, RowError};
use crate::export::write_records;
use crate::models::{FinancialRecord, ImportReport, RecordKind};
use crate::normalizer::{Normalizer, DEFAULT_CURRENCY};
use crate::parser::RowParser;
use crate::persistence::{InsertOutcome, RecordStore};

/// Knobs for the parse and normalize stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Currency applied when the Currency column is blank
    pub default_currency: String,
    /// Batches with at least this many rows are normalized in parallel
    pub parallel_threshold: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            default_currency: DEFAULT_CURRENCY.to_string(),
            parallel_threshold: 10_000,
        }
    }
}

/// Parsed and validated input, not yet compared against the store
#[derive(Debug)]
pub struct PreparedBatch {
    pub kind: RecordKind,
    pub total_rows: usize,
    pub records: Vec<FinancialRecord>,
    pub errors: Vec<RowError>,
}

/// Parse and normalize an input without touching any store
///
/// Fails with `EmptyInput` when the input is not text or has no data rows,
/// and with `InvalidDefaultCurrency` before reading anything when the
/// configured currency is not a 3-letter code.
pub fn prepare_batch<R: Read>(
    kind: RecordKind,
    reader: R,
    options: &ImportOptions,
) -> Result<PreparedBatch> {
    let normalizer = Normalizer::with_default_currency(kind, &options.default_currency)?;

    let rows = RowParser::new(reader)?.collect::<Result<Vec<_>>>()?;
    if rows.is_empty() {
        return Err(ImportError::EmptyInput("no data rows".to_string()));
    }

    let total_rows = rows.len();
    let parallel = total_rows >= options.parallel_threshold;
    let batch = normalizer.normalize_batch(rows, parallel);

    Ok(PreparedBatch {
        kind,
        total_rows,
        records: batch.records,
        errors: batch.errors,
    })
}

/// Fold the stage outputs into the caller-facing summary
///
/// Records refused by the store's uniqueness constraint count as duplicates.
pub fn build_report(
    kind: RecordKind,
    total_rows: usize,
    errors: Vec<RowError>,
    partition: &Partition,
    outcome: InsertOutcome,
) -> ImportReport {
    let mut duplicate_rows = partition.duplicate_rows();
    duplicate_rows.extend(outcome.rejected.iter().filter_map(|r| r.id.row_index()));
    duplicate_rows.sort_unstable();

    if !outcome.rejected.is_empty() {
        warn!(
            %kind,
            rejected = outcome.rejected.len(),
            "Store refused records inserted concurrently by another import"
        );
    }

    let report = ImportReport {
        kind,
        total_processed: total_rows,
        new_count: outcome.inserted.len(),
        duplicate_count: partition.duplicates.len() + outcome.rejected.len(),
        rejected_count: errors.len(),
        errors,
        duplicate_rows,
        inserted: outcome.inserted,
    };

    info!(
        %kind,
        total = report.total_processed,
        new = report.new_count,
        duplicate = report.duplicate_count,
        rejected = report.rejected_count,
        "Import finished"
    );
    report
}

/// Run the full pipeline against a store
///
/// parse -> normalize -> fetch existing keys -> dedupe -> one batched insert
pub fn import_into<R: Read, S: RecordStore + ?Sized>(
    store: &mut S,
    kind: RecordKind,
    reader: R,
    options: &ImportOptions,
) -> Result<ImportReport> {
    let batch = prepare_batch(kind, reader, options)?;

    let existing = store.list_all(kind)?;
    let partition = reconcile(&existing, batch.records);

    let outcome = if partition.fresh.is_empty() {
        InsertOutcome::default()
    } else {
        store.insert_many(kind, partition.fresh.clone())?
    };

    Ok(build_report(
        kind,
        batch.total_rows,
        batch.errors,
        &partition,
        outcome,
    ))
}

/// Synchronous importer that owns its store
///
/// Not thread-safe by itself; use `SharedImporter` to run imports
/// concurrently against one store.
///
/// # Example
///
/// ```
/// use portfolio_import::importer::Importer;
/// use portfolio_import::models::RecordKind;
/// use portfolio_import::persistence::MemoryStore;
///
/// let csv = "Transaction Type,Currency,Account,Symbol,Date,Amount\n\
///            Dividends,USD,ACC001234,AAPL,2024-01-15,150.25\n";
///
/// let mut importer = Importer::new(MemoryStore::new());
/// let report = importer.import(RecordKind::Dividend, csv.as_bytes()).unwrap();
/// assert_eq!(report.new_count, 1);
/// ```
pub struct Importer<S: RecordStore> {
    store: S,
    options: ImportOptions,
}

impl<S: RecordStore> Importer<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, ImportOptions::default())
    }

    pub fn with_options(store: S, options: ImportOptions) -> Self {
        Self { store, options }
    }

    /// Import one delimited-text input of `kind`
    pub fn import<R: Read>(&mut self, kind: RecordKind, reader: R) -> Result<ImportReport> {
        import_into(&mut self.store, kind, reader, &self.options)
    }

    /// Write every stored record of `kind` as CSV; returns the row count
    pub fn export<W: Write>(&self, kind: RecordKind, writer: W) -> Result<usize> {
        let records = self.store.list_all(kind)?;
        write_records(kind, &records, writer)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
