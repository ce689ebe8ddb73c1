#![allow(dead_code)]

use chrono::NaiveDate;
use portfolio_import::error::StoreError;
use portfolio_import::models::{
    FinancialRecord, RecordDetails, RecordId, RecordKind, Status, TradeSide,
};
use portfolio_import::persistence::{InsertOutcome, MemoryStore, RecordStore, StoreResult};
use rust_decimal::Decimal;

pub const DIVIDEND_HEADER: &str = "Transaction Type,Currency,Account,Symbol,Date,Amount";
pub const TRANSACTION_HEADER: &str =
    "Transaction Type,Currency,Account,Symbol,Date,Quantity,Trade Price,Commission,Exchange Rate";

/// Build a dividend CSV from `(currency, account, symbol, date, amount)` rows
pub fn dividend_csv(rows: &[(&str, &str, &str, &str, &str)]) -> String {
    let mut csv = format!("{DIVIDEND_HEADER}\n");
    for (currency, account, symbol, date, amount) in rows {
        csv.push_str(&format!(
            "Dividends,{currency},{account},{symbol},{date},{amount}\n"
        ));
    }
    csv
}

/// Build a transaction CSV from
/// `(type, currency, account, symbol, date, quantity, price, commission, rate)` rows
pub fn transaction_csv(rows: &[[&str; 9]]) -> String {
    let mut csv = format!("{TRANSACTION_HEADER}\n");
    for row in rows {
        csv.push_str(&row.join(","));
        csv.push('\n');
    }
    csv
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Helper to create a not-yet-stored dividend
pub fn make_dividend(row: usize, account: &str, symbol: &str, on: NaiveDate, amount: Decimal) -> FinancialRecord {
    FinancialRecord {
        id: RecordId::Temporary(row),
        account: account.to_string(),
        symbol: symbol.to_string(),
        currency: "USD".to_string(),
        transaction_date: on,
        exchange_rate: Decimal::ONE,
        status: Status::Active,
        details: RecordDetails::Dividend { amount },
    }
}

/// Helper to create a not-yet-stored trade
pub fn make_trade(
    row: usize,
    side: TradeSide,
    account: &str,
    symbol: &str,
    on: NaiveDate,
    quantity: Decimal,
    price: Decimal,
) -> FinancialRecord {
    FinancialRecord {
        id: RecordId::Temporary(row),
        account: account.to_string(),
        symbol: symbol.to_string(),
        currency: "USD".to_string(),
        transaction_date: on,
        exchange_rate: Decimal::ONE,
        status: Status::Active,
        details: RecordDetails::Trade {
            side,
            quantity,
            price,
            commission: Decimal::ZERO,
        },
    }
}

/// Store whose writes always fail
#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
}

impl RecordStore for FailingStore {
    fn list_all(&self, kind: RecordKind) -> StoreResult<Vec<FinancialRecord>> {
        self.inner.list_all(kind)
    }

    fn insert_many(&mut self, _kind: RecordKind, _records: Vec<FinancialRecord>) -> StoreResult<InsertOutcome> {
        Err(StoreError::Unavailable("connection reset".to_string()))
    }

    fn delete_many(&mut self, kind: RecordKind, ids: &[u64]) -> StoreResult<usize> {
        self.inner.delete_many(kind, ids)
    }

    fn update_one(&mut self, kind: RecordKind, record: FinancialRecord) -> StoreResult<FinancialRecord> {
        self.inner.update_one(kind, record)
    }
}

/// Store that ignores the importer's snapshot race by pretending another
/// import stored the given records between `list_all` and `insert_many`
pub struct RacingStore {
    pub inner: MemoryStore,
    pub sneak_in: Vec<FinancialRecord>,
}

impl RecordStore for RacingStore {
    fn list_all(&self, kind: RecordKind) -> StoreResult<Vec<FinancialRecord>> {
        self.inner.list_all(kind)
    }

    fn insert_many(&mut self, kind: RecordKind, records: Vec<FinancialRecord>) -> StoreResult<InsertOutcome> {
        let concurrent = std::mem::take(&mut self.sneak_in);
        self.inner.insert_many(kind, concurrent)?;
        self.inner.insert_many(kind, records)
    }

    fn delete_many(&mut self, kind: RecordKind, ids: &[u64]) -> StoreResult<usize> {
        self.inner.delete_many(kind, ids)
    }

    fn update_one(&mut self, kind: RecordKind, record: FinancialRecord) -> StoreResult<FinancialRecord> {
        self.inner.update_one(kind, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dividend_csv() {
        let csv = dividend_csv(&[("USD", "ACC1", "AAPL", "2024-01-15", "1.5")]);
        assert!(csv.starts_with("Transaction Type,Currency,Account,Symbol,Date,Amount\n"));
        assert!(csv.contains("Dividends,USD,ACC1,AAPL,2024-01-15,1.5\n"));
    }

    #[test]
    fn test_transaction_csv() {
        let csv = transaction_csv(&[[
            "Buy", "USD", "ACC1", "AAPL", "2024-01-15", "10", "185.5", "1", "1",
        ]]);
        assert!(csv.contains("Buy,USD,ACC1,AAPL,2024-01-15,10,185.5,1,1\n"));
    }
}
