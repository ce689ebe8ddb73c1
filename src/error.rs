use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::models::RecordKind;

/// Errors that abort a whole import or export run
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid default currency: '{0}' (expected a 3-letter code)")]
    InvalidDefaultCurrency(String),

    #[error("Import task failed: {0}")]
    Task(String),
}

/// Per-row validation failures
/// These are collected on the report and never abort sibling rows
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing headers: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),

    #[error("Invalid transaction type in row {row}: expected {expected}, found '{found}'")]
    InvalidTypeTag {
        row: usize,
        expected: String,
        found: String,
    },

    #[error(
        "Invalid date format in row {row}: '{value}' (supported: YYYY-MM-DD, DD-MM-YYYY, D MonthName YYYY)"
    )]
    InvalidDate { row: usize, value: String },

    #[error("Invalid {field} in row {row}: {value}")]
    InvalidNumber {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("Missing {field} in row {row}")]
    MissingValue { row: usize, field: &'static str },

    #[error("Invalid currency in row {row}: {value}")]
    InvalidCurrency { row: usize, value: String },
}

/// Failures raised by a record store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record {0} not found")]
    NotFound(u64),

    #[error("Record has no persisted id: {0}")]
    NotPersisted(String),

    #[error("Natural key already taken by record {existing}: {key}")]
    Conflict { existing: u64, key: String },

    #[error("Record of kind {found} cannot be stored with {expected} records")]
    KindMismatch {
        expected: RecordKind,
        found: RecordKind,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Failures while resolving runtime settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read settings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid settings JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{name} must be a row count, got '{value}'")]
    InvalidThreshold { name: &'static str, value: String },

    #[error("{name} must be a 3-letter currency code, got '{value}'")]
    InvalidCurrency { name: &'static str, value: String },
}

/// A rejected input row, with enough context to fix the source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    pub row_index: usize,
    #[serde(rename = "message", serialize_with = "serialize_message")]
    pub error: ValidationError,
}

impl RowError {
    pub fn new(row_index: usize, error: ValidationError) -> Self {
        Self { row_index, error }
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

fn serialize_message<S>(error: &ValidationError, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&error.to_string())
}

pub type Result<T> = std::result::Result<T, ImportError>;
