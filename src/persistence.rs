use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::models::{FinancialRecord, NaturalKey, RecordId, RecordKind};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Destination store for imported records
///
/// The import pipeline only reads (`list_all`) and appends (`insert_many`);
/// `delete_many` and `update_one` exist for maintenance of stored data.
///
/// # Uniqueness
///
/// Implementations must enforce natural-key uniqueness per kind at insert
/// time. A record whose key is already stored is not inserted; it is handed
/// back in [`InsertOutcome::rejected`] instead of failing the call. This is
/// what keeps two imports racing on a stale key snapshot from storing the
/// same record twice.
///
/// # Atomicity
///
/// `insert_many` is all-or-nothing with respect to errors: if it returns
/// `Err`, no record from the call is visible afterwards.
///
/// # Example
///
/// ```
/// use portfolio_import::persistence::{MemoryStore, RecordStore};
/// use portfolio_import::models::RecordKind;
///
/// let store = MemoryStore::new();
/// assert!(store.list_all(RecordKind::Dividend).unwrap().is_empty());
/// ```
pub trait RecordStore: Send + Sync {
    /// Every stored record of `kind`, in insertion order
    fn list_all(&self, kind: RecordKind) -> StoreResult<Vec<FinancialRecord>>;

    /// Store `records`, assigning persisted ids
    fn insert_many(
        &mut self,
        kind: RecordKind,
        records: Vec<FinancialRecord>,
    ) -> StoreResult<InsertOutcome>;

    /// Remove records by persisted id; returns how many were removed
    fn delete_many(&mut self, kind: RecordKind, ids: &[u64]) -> StoreResult<usize>;

    /// Replace the stored record carrying the same persisted id
    fn update_one(&mut self, kind: RecordKind, record: FinancialRecord)
        -> StoreResult<FinancialRecord>;
}

/// Result of a batched insert
#[derive(Debug, Default, Clone)]
pub struct InsertOutcome {
    /// Stored records with their assigned ids, in input order
    pub inserted: Vec<FinancialRecord>,
    /// Records refused by the uniqueness constraint, unchanged
    pub rejected: Vec<FinancialRecord>,
}

/// Stored records of both kinds plus the id sequence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Ledger {
    next_id: u64,
    #[serde(default)]
    transactions: Vec<FinancialRecord>,
    #[serde(default)]
    dividends: Vec<FinancialRecord>,
}

impl Ledger {
    fn records(&self, kind: RecordKind) -> &Vec<FinancialRecord> {
        match kind {
            RecordKind::Transaction => &self.transactions,
            RecordKind::Dividend => &self.dividends,
        }
    }

    fn records_mut(&mut self, kind: RecordKind) -> &mut Vec<FinancialRecord> {
        match kind {
            RecordKind::Transaction => &mut self.transactions,
            RecordKind::Dividend => &mut self.dividends,
        }
    }

    fn len(&self, kind: RecordKind) -> usize {
        self.records(kind).len()
    }

    fn insert_many(
        &mut self,
        kind: RecordKind,
        records: Vec<FinancialRecord>,
    ) -> StoreResult<InsertOutcome> {
        // Validate the whole batch before touching anything
        if let Some(found) = records.iter().map(|r| r.kind()).find(|k| *k != kind) {
            return Err(StoreError::KindMismatch {
                expected: kind,
                found,
            });
        }

        let mut taken: HashMap<NaturalKey, u64> = self
            .records(kind)
            .iter()
            .filter_map(|r| r.id.persisted().map(|id| (r.natural_key(), id)))
            .collect();

        let mut outcome = InsertOutcome::default();
        for record in records {
            let key = record.natural_key();
            if let Some(existing) = taken.get(&key) {
                warn!(%kind, %key, existing, "Uniqueness constraint rejected insert");
                outcome.rejected.push(record);
                continue;
            }
            self.next_id += 1;
            let stored = record.with_id(RecordId::Persisted(self.next_id));
            taken.insert(key, self.next_id);
            self.records_mut(kind).push(stored.clone());
            outcome.inserted.push(stored);
        }
        Ok(outcome)
    }

    fn delete_many(&mut self, kind: RecordKind, ids: &[u64]) -> usize {
        let records = self.records_mut(kind);
        let before = records.len();
        records.retain(|r| !r.id.persisted().is_some_and(|id| ids.contains(&id)));
        before - records.len()
    }

    fn update_one(
        &mut self,
        kind: RecordKind,
        record: FinancialRecord,
    ) -> StoreResult<FinancialRecord> {
        if record.kind() != kind {
            return Err(StoreError::KindMismatch {
                expected: kind,
                found: record.kind(),
            });
        }
        let id = record
            .id
            .persisted()
            .ok_or_else(|| StoreError::NotPersisted(record.id.to_string()))?;

        let key = record.natural_key();
        let records = self.records_mut(kind);
        if let Some(other) = records
            .iter()
            .filter(|r| r.id != record.id)
            .find(|r| r.natural_key() == key)
        {
            return Err(StoreError::Conflict {
                existing: other.id.persisted().unwrap_or_default(),
                key: key.to_string(),
            });
        }

        let slot = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or(StoreError::NotFound(id))?;
        *slot = record.clone();
        Ok(record)
    }
}

/// In-process store
///
/// Useful for tests and for callers that manage durability themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ledger: Ledger,
    write_count: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `insert_many` calls that reached the store
    pub fn write_count(&self) -> usize {
        self.write_count
    }
}

impl RecordStore for MemoryStore {
    fn list_all(&self, kind: RecordKind) -> StoreResult<Vec<FinancialRecord>> {
        Ok(self.ledger.records(kind).clone())
    }

    fn insert_many(
        &mut self,
        kind: RecordKind,
        records: Vec<FinancialRecord>,
    ) -> StoreResult<InsertOutcome> {
        self.write_count += 1;
        self.ledger.insert_many(kind, records)
    }

    fn delete_many(&mut self, kind: RecordKind, ids: &[u64]) -> StoreResult<usize> {
        Ok(self.ledger.delete_many(kind, ids))
    }

    fn update_one(
        &mut self,
        kind: RecordKind,
        record: FinancialRecord,
    ) -> StoreResult<FinancialRecord> {
        self.ledger.update_one(kind, record)
    }
}

/// Store kept in a JSON file
///
/// Every mutation is applied to a copy of the ledger, written to a sibling
/// temp file and renamed over the original. Only then does the in-memory
/// copy change, so a failed write leaves both disk and memory untouched.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    ledger: Ledger,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let ledger = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                Ledger::default()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            Ledger::default()
        };
        debug!(
            path = %path.display(),
            transactions = ledger.len(RecordKind::Transaction),
            dividends = ledger.len(RecordKind::Dividend),
            "Opened record store"
        );
        Ok(Self { path, ledger })
    }

    fn commit(&mut self, next: Ledger) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(&next)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        self.ledger = next;
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn list_all(&self, kind: RecordKind) -> StoreResult<Vec<FinancialRecord>> {
        Ok(self.ledger.records(kind).clone())
    }

    fn insert_many(
        &mut self,
        kind: RecordKind,
        records: Vec<FinancialRecord>,
    ) -> StoreResult<InsertOutcome> {
        let mut next = self.ledger.clone();
        let outcome = next.insert_many(kind, records)?;
        if !outcome.inserted.is_empty() {
            self.commit(next)?;
        }
        Ok(outcome)
    }

    fn delete_many(&mut self, kind: RecordKind, ids: &[u64]) -> StoreResult<usize> {
        let mut next = self.ledger.clone();
        let removed = next.delete_many(kind, ids);
        if removed > 0 {
            self.commit(next)?;
        }
        Ok(removed)
    }

    fn update_one(
        &mut self,
        kind: RecordKind,
        record: FinancialRecord,
    ) -> StoreResult<FinancialRecord> {
        let mut next = self.ledger.clone();
        let updated = next.update_one(kind, record)?;
        self.commit(next)?;
        Ok(updated)
    }
}
