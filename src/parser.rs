use std::io::Read;

use crate::error::{ImportError, Result};
use crate::models::RawRow;

/// Lazy, single-pass reader turning delimited text into [`RawRow`]s
///
/// The first record is the header. Blank rows are skipped and do not consume
/// a row index. Short rows are kept as-is; the missing columns surface later
/// as a missing-header validation error for that row.
pub struct RowParser<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    headers: Vec<String>,
    next_index: usize,
}

impl<R: Read> RowParser<R> {
    /// Read the header line and prepare to stream data rows
    pub fn new(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(decode_error)?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::EmptyInput("missing header row".to_string()));
        }

        Ok(Self {
            records: csv_reader.into_records(),
            headers,
            next_index: 0,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl<R: Read> Iterator for RowParser<R> {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(decode_error(e))),
            };

            if record.iter().all(|field| field.is_empty()) {
                continue;
            }

            self.next_index += 1;
            let fields = self
                .headers
                .iter()
                .zip(record.iter())
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, value)| (header.as_str(), value));

            return Some(Ok(RawRow::new(self.next_index, fields)));
        }
    }
}

/// Parse `reader` as delimited text
pub fn parse<R: Read>(reader: R) -> Result<RowParser<R>> {
    RowParser::new(reader)
}

// Undecodable bytes mean there is no usable text at all
fn decode_error(err: csv::Error) -> ImportError {
    if matches!(err.kind(), csv::ErrorKind::Utf8 { .. }) {
        ImportError::EmptyInput("input is not valid UTF-8 text".to_string())
    } else {
        ImportError::Csv(err)
    }
}
