pub mod kind;
pub mod raw_row;
pub mod record;
pub mod report;

pub use kind::{headers, RecordKind};
pub use raw_row::RawRow;
pub use record::{
    FinancialRecord, NaturalKey, RecordDetails, RecordId, Status, TradeSide, DIVIDEND_TAG,
};
pub use report::ImportReport;
