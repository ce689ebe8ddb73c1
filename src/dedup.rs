use std::collections::HashSet;

use tracing::debug;

use crate::models::{FinancialRecord, NaturalKey};

/// Incoming records split by whether their natural key is already taken
#[derive(Debug, Default)]
pub struct Partition {
    pub fresh: Vec<FinancialRecord>,
    pub duplicates: Vec<FinancialRecord>,
}

impl Partition {
    /// Source rows of the duplicates, ascending
    pub fn duplicate_rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self
            .duplicates
            .iter()
            .filter_map(|r| r.id.row_index())
            .collect();
        rows.sort_unstable();
        rows
    }
}

/// Working set of natural keys for one record kind
///
/// Seeded with the keys already in the store; every admitted record adds its
/// own key so later collisions in the same batch are caught too.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<NaturalKey>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_existing(keys: impl IntoIterator<Item = NaturalKey>) -> Self {
        Self {
            seen: keys.into_iter().collect(),
        }
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a FinancialRecord>) -> Self {
        Self::with_existing(records.into_iter().map(FinancialRecord::natural_key))
    }

    /// Returns true and records the key if it has not been seen yet
    pub fn admit(&mut self, record: &FinancialRecord) -> bool {
        self.seen.insert(record.natural_key())
    }

    /// Scan records in source-row order; the first occurrence of a key wins
    pub fn partition(&mut self, mut records: Vec<FinancialRecord>) -> Partition {
        records.sort_by_key(|r| r.id.row_index());

        let mut partition = Partition::default();
        for record in records {
            if self.admit(&record) {
                partition.fresh.push(record);
            } else {
                debug!(row = ?record.id.row_index(), key = %record.natural_key(), "Duplicate record");
                partition.duplicates.push(record);
            }
        }
        partition
    }
}

/// Partition `incoming` against the complete set of `existing` records
pub fn reconcile(existing: &[FinancialRecord], incoming: Vec<FinancialRecord>) -> Partition {
    Deduplicator::from_records(existing).partition(incoming)
}
