use std::str::FromStr;

use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::warn;

use crate::dates::parse_date;
use crate::error::{ImportError, RowError, ValidationError};
use crate::models::headers::*;
use crate::models::{
    FinancialRecord, RawRow, RecordDetails, RecordId, RecordKind, Status, TradeSide, DIVIDEND_TAG,
};

pub const DEFAULT_CURRENCY: &str = "USD";

/// Normalized rows of one input, split into accepted records and rejections
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    /// Valid records, in file order
    pub records: Vec<FinancialRecord>,
    pub errors: Vec<RowError>,
}

/// Converts loosely-typed rows into validated records of one kind
#[derive(Debug, Clone)]
pub struct Normalizer {
    kind: RecordKind,
    default_currency: String,
}

impl Normalizer {
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Use `currency` for rows with a blank Currency column
    ///
    /// The code is held to the same 3-letter rule as explicit values, so every
    /// stored record can be exported and imported again.
    pub fn with_default_currency(kind: RecordKind, currency: &str) -> Result<Self, ImportError> {
        let default_currency = currency_code(currency)
            .ok_or_else(|| ImportError::InvalidDefaultCurrency(currency.to_string()))?;
        Ok(Self {
            kind,
            default_currency,
        })
    }

    /// Validate a single row
    ///
    /// Checks run in order: required headers, type tag, text fields, date,
    /// numeric fields. The first failure is returned.
    pub fn normalize(&self, row: &RawRow) -> Result<FinancialRecord, ValidationError> {
        let row_no = row.index();

        let missing: Vec<String> = self
            .kind
            .required_headers()
            .iter()
            .filter(|header| !row.contains(header))
            .map(|header| header.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingHeaders(missing));
        }

        let tag = value(row, TRANSACTION_TYPE);
        let side = match self.kind {
            RecordKind::Transaction => {
                Some(TradeSide::from_tag(tag).ok_or_else(|| self.invalid_tag(row_no, tag))?)
            }
            RecordKind::Dividend if tag == DIVIDEND_TAG => None,
            RecordKind::Dividend => return Err(self.invalid_tag(row_no, tag)),
        };

        let account = required_text(row, ACCOUNT, "account")?.to_string();
        let symbol = required_text(row, SYMBOL, "symbol")?.to_uppercase();
        let currency = self.currency(row)?;

        let raw_date = value(row, DATE);
        let transaction_date = parse_date(raw_date).ok_or_else(|| ValidationError::InvalidDate {
            row: row_no,
            value: raw_date.to_string(),
        })?;

        let (details, exchange_rate) = match side {
            Some(side) => {
                let details = RecordDetails::Trade {
                    side,
                    quantity: non_negative(row, QUANTITY, "quantity")?,
                    price: non_negative(row, TRADE_PRICE, "price")?,
                    commission: optional_non_negative(row, COMMISSION, "commission", Decimal::ZERO)?,
                };
                (details, exchange_rate(row)?)
            }
            None => (
                RecordDetails::Dividend {
                    amount: non_negative(row, AMOUNT, "amount")?,
                },
                Decimal::ONE,
            ),
        };

        Ok(FinancialRecord {
            id: RecordId::Temporary(row_no),
            account,
            symbol,
            currency,
            transaction_date,
            exchange_rate,
            status: Status::Active,
            details,
        })
    }

    /// Validate every row, skipping and reporting the bad ones
    ///
    /// With `parallel` set the rows are validated on the rayon pool; the
    /// indexed collect keeps results in input order either way.
    pub fn normalize_batch(&self, rows: Vec<RawRow>, parallel: bool) -> NormalizedBatch {
        let results: Vec<Result<FinancialRecord, RowError>> = if parallel {
            rows.par_iter().map(|row| self.normalize_row(row)).collect()
        } else {
            rows.iter().map(|row| self.normalize_row(row)).collect()
        };

        let mut batch = NormalizedBatch::default();
        for result in results {
            match result {
                Ok(record) => batch.records.push(record),
                Err(error) => {
                    warn!(kind = %self.kind, row = error.row_index, "Rejected row: {}", error.error);
                    batch.errors.push(error);
                }
            }
        }
        batch
    }

    fn normalize_row(&self, row: &RawRow) -> Result<FinancialRecord, RowError> {
        self.normalize(row)
            .map_err(|error| RowError::new(row.index(), error))
    }

    fn currency(&self, row: &RawRow) -> Result<String, ValidationError> {
        let raw = value(row, CURRENCY);
        if raw.is_empty() {
            return Ok(self.default_currency.clone());
        }
        currency_code(raw).ok_or_else(|| ValidationError::InvalidCurrency {
            row: row.index(),
            value: raw.to_string(),
        })
    }

    fn invalid_tag(&self, row: usize, found: &str) -> ValidationError {
        ValidationError::InvalidTypeTag {
            row,
            expected: self.kind.type_tags().join(" or "),
            found: found.to_string(),
        }
    }
}

/// Uppercased ISO-style currency code, if `raw` is exactly 3 ASCII letters
pub fn currency_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    (code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())).then_some(code)
}

fn value<'a>(row: &'a RawRow, header: &str) -> &'a str {
    row.get(header).map(str::trim).unwrap_or("")
}

fn required_text<'a>(
    row: &'a RawRow,
    header: &str,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    let text = value(row, header);
    if text.is_empty() {
        return Err(ValidationError::MissingValue {
            row: row.index(),
            field,
        });
    }
    Ok(text)
}

/// Plain or scientific decimal notation
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    Decimal::from_str(s)
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

fn non_negative(row: &RawRow, header: &str, field: &'static str) -> Result<Decimal, ValidationError> {
    let raw = value(row, header);
    match parse_decimal(raw) {
        Some(n) if n >= Decimal::ZERO => Ok(n),
        _ => Err(ValidationError::InvalidNumber {
            row: row.index(),
            field,
            value: raw.to_string(),
        }),
    }
}

fn optional_non_negative(
    row: &RawRow,
    header: &str,
    field: &'static str,
    default: Decimal,
) -> Result<Decimal, ValidationError> {
    if value(row, header).is_empty() {
        return Ok(default);
    }
    non_negative(row, header, field)
}

fn exchange_rate(row: &RawRow) -> Result<Decimal, ValidationError> {
    let rate = optional_non_negative(row, EXCHANGE_RATE, "exchange rate", Decimal::ONE)?;
    if rate.is_zero() {
        return Err(ValidationError::InvalidNumber {
            row: row.index(),
            field: "exchange rate",
            value: value(row, EXCHANGE_RATE).to_string(),
        });
    }
    Ok(rate)
}
