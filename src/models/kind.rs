use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Column names shared by the import and export vocabularies
pub mod headers {
    pub const TRANSACTION_TYPE: &str = "Transaction Type";
    pub const CURRENCY: &str = "Currency";
    pub const ACCOUNT: &str = "Account";
    pub const SYMBOL: &str = "Symbol";
    pub const DATE: &str = "Date";
    pub const QUANTITY: &str = "Quantity";
    pub const TRADE_PRICE: &str = "Trade Price";
    pub const COMMISSION: &str = "Commission";
    pub const EXCHANGE_RATE: &str = "Exchange Rate";
    pub const AMOUNT: &str = "Amount";
}

use headers::*;

const TRANSACTION_HEADERS: &[&str] = &[
    TRANSACTION_TYPE,
    CURRENCY,
    ACCOUNT,
    SYMBOL,
    DATE,
    QUANTITY,
    TRADE_PRICE,
    COMMISSION,
    EXCHANGE_RATE,
];

const TRANSACTION_REQUIRED: &[&str] = &[
    TRANSACTION_TYPE,
    CURRENCY,
    ACCOUNT,
    SYMBOL,
    DATE,
    QUANTITY,
    TRADE_PRICE,
];

const DIVIDEND_HEADERS: &[&str] = &[TRANSACTION_TYPE, CURRENCY, ACCOUNT, SYMBOL, DATE, AMOUNT];

/// Discriminator selecting header vocabulary, validation rules and key fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Transaction,
    Dividend,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transaction => "transaction",
            Self::Dividend => "dividend",
        }
    }

    /// Full header vocabulary, in export column order
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Self::Transaction => TRANSACTION_HEADERS,
            Self::Dividend => DIVIDEND_HEADERS,
        }
    }

    /// Headers every input row must carry
    pub fn required_headers(&self) -> &'static [&'static str] {
        match self {
            Self::Transaction => TRANSACTION_REQUIRED,
            Self::Dividend => DIVIDEND_HEADERS,
        }
    }

    /// Accepted literals for the "Transaction Type" column
    pub fn type_tags(&self) -> &'static [&'static str] {
        match self {
            Self::Transaction => &["Buy", "Sell"],
            Self::Dividend => &["Dividends"],
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transaction" | "transactions" => Ok(Self::Transaction),
            "dividend" | "dividends" => Ok(Self::Dividend),
            other => Err(format!(
                "unknown record kind '{other}' (expected transaction or dividend)"
            )),
        }
    }
}
