use std::fmt;

use serde::Serialize;

use super::kind::RecordKind;
use super::record::FinancialRecord;
use crate::error::RowError;

/// Outcome of one import run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub kind: RecordKind,
    /// Data rows read from the input, valid or not
    pub total_processed: usize,
    pub new_count: usize,
    /// Rows skipped because their natural key was already present
    pub duplicate_count: usize,
    pub rejected_count: usize,
    pub errors: Vec<RowError>,
    pub duplicate_rows: Vec<usize>,
    /// Records as stored, with their assigned ids
    #[serde(skip)]
    pub inserted: Vec<FinancialRecord>,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} import: {} processed, {} imported, {} duplicate, {} rejected",
            self.kind,
            self.total_processed,
            self.new_count,
            self.duplicate_count,
            self.rejected_count
        )?;
        if !self.duplicate_rows.is_empty() {
            let rows: Vec<String> = self.duplicate_rows.iter().map(|r| r.to_string()).collect();
            writeln!(f, "  duplicate rows: {}", rows.join(", "))?;
        }
        for error in &self.errors {
            writeln!(f, "  row {}: {}", error.row_index, error.message())?;
        }
        Ok(())
    }
}
