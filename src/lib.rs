pub mod concurrent_importer;
pub mod config;
pub mod dates;
pub mod dedup;
pub mod error;
pub mod export;
pub mod importer;
pub mod models;
pub mod normalizer;
pub mod parser;
pub mod persistence;

use std::io::{Read, Write};

use error::Result;
use importer::ImportOptions;
use models::{ImportReport, RecordKind};
use persistence::RecordStore;

/// Import CSV records of `kind` from a reader into `store` with default options
pub fn import_csv<R: Read, S: RecordStore + ?Sized>(
    kind: RecordKind,
    reader: R,
    store: &mut S,
) -> Result<ImportReport> {
    importer::import_into(store, kind, reader, &ImportOptions::default())
}

/// Write all stored records of `kind` from `store` to a CSV writer
pub fn export_csv<W: Write, S: RecordStore + ?Sized>(
    kind: RecordKind,
    store: &S,
    writer: W,
) -> Result<usize> {
    let records = store.list_all(kind)?;
    export::write_records(kind, &records, writer)
}
