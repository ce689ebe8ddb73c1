use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::kind::RecordKind;

/// Record identifier
/// Temporary ids come from the input row index, persisted ids from the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordId {
    Temporary(usize),
    Persisted(u64),
}

impl RecordId {
    pub fn persisted(&self) -> Option<u64> {
        match self {
            Self::Persisted(id) => Some(*id),
            Self::Temporary(_) => None,
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary(_))
    }

    /// Source row of a record that has not been stored yet
    pub fn row_index(&self) -> Option<usize> {
        match self {
            Self::Temporary(n) => Some(*n),
            Self::Persisted(_) => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temporary(n) => write!(f, "tmp-{n}"),
            Self::Persisted(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

/// Direction of a trade, carried in the "Transaction Type" column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
        }
    }

    /// Exact match only, no case folding
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Buy" => Some(Self::Buy),
            "Sell" => Some(Self::Sell),
            _ => None,
        }
    }
}

pub const DIVIDEND_TAG: &str = "Dividends";

/// Kind-specific numeric fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecordDetails {
    Trade {
        side: TradeSide,
        quantity: Decimal,
        price: Decimal,
        commission: Decimal,
    },
    Dividend {
        amount: Decimal,
    },
}

/// A validated transaction or dividend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub id: RecordId,
    pub account: String,
    pub symbol: String,
    pub currency: String,
    pub transaction_date: NaiveDate,
    pub exchange_rate: Decimal,
    #[serde(default)]
    pub status: Status,
    pub details: RecordDetails,
}

impl FinancialRecord {
    pub fn kind(&self) -> RecordKind {
        match self.details {
            RecordDetails::Trade { .. } => RecordKind::Transaction,
            RecordDetails::Dividend { .. } => RecordKind::Dividend,
        }
    }

    pub fn type_tag(&self) -> &'static str {
        match &self.details {
            RecordDetails::Trade { side, .. } => side.as_str(),
            RecordDetails::Dividend { .. } => DIVIDEND_TAG,
        }
    }

    /// Business identity used for de-duplication
    pub fn natural_key(&self) -> NaturalKey {
        let principal = match &self.details {
            RecordDetails::Trade {
                quantity, price, ..
            } => format!("{}|{}", quantity.normalize(), price.normalize()),
            RecordDetails::Dividend { amount } => amount.normalize().to_string(),
        };
        NaturalKey(format!(
            "{}|{}|{}|{}|{}",
            self.transaction_date.format("%Y-%m-%d"),
            self.account,
            self.type_tag(),
            self.symbol,
            principal
        ))
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = id;
        self
    }
}

/// Composite key: date|account|type tag|symbol|principal numeric fields
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NaturalKey(String);

impl NaturalKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
