use std::io::Write;

use tracing::debug;

use crate::error::Result;
use crate::models::{FinancialRecord, RecordDetails, RecordKind};

/// Write `records` of `kind` as CSV using the import header vocabulary
///
/// Records of another kind are skipped. Returns the number of rows written.
pub fn write_records<'a, W: Write>(
    kind: RecordKind,
    records: impl IntoIterator<Item = &'a FinancialRecord>,
    writer: W,
) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(kind.headers())?;

    let mut written = 0;
    for record in records {
        if record.kind() != kind {
            debug!(id = %record.id, "Skipping {} record in {} export", record.kind(), kind);
            continue;
        }
        csv_writer.write_record(record_fields(record))?;
        written += 1;
    }

    csv_writer.flush()?;
    Ok(written)
}

/// Column values in the order of `RecordKind::headers`
fn record_fields(record: &FinancialRecord) -> Vec<String> {
    let mut fields = vec![
        record.type_tag().to_string(),
        record.currency.clone(),
        record.account.clone(),
        record.symbol.clone(),
        record.transaction_date.format("%Y-%m-%d").to_string(),
    ];
    match &record.details {
        RecordDetails::Trade {
            quantity,
            price,
            commission,
            ..
        } => {
            fields.push(quantity.to_string());
            fields.push(price.to_string());
            fields.push(commission.to_string());
            fields.push(record.exchange_rate.to_string());
        }
        RecordDetails::Dividend { amount } => fields.push(amount.to_string()),
    }
    fields
}
