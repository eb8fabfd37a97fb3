//! Sell-signal log loading.
//!
//! Only the `Timestamp` column is read; the stages report how many signals
//! the strategy emitted next to how many trades it took.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;

use super::loader::{csv_reader, read_file, strip_bom, timestamp, LoadError};

const TIMESTAMP_COLUMN: &str = "Timestamp";

pub fn load_signals(path: &Path) -> Result<Vec<NaiveDateTime>, LoadError> {
    let bytes = read_file(path)?;
    load_signals_from_reader(strip_bom(&bytes))
}

pub fn load_signals_from_reader<R: Read>(reader: R) -> Result<Vec<NaiveDateTime>, LoadError> {
    let mut rdr = csv_reader(reader);
    let column = rdr
        .headers()?
        .iter()
        .position(|h| h.trim_start_matches('\u{FEFF}') == TIMESTAMP_COLUMN)
        .ok_or(LoadError::MissingColumn(TIMESTAMP_COLUMN))?;

    let mut signals = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let value = record.get(column).unwrap_or_default();
        signals.push(timestamp(value, i + 2, TIMESTAMP_COLUMN)?);
    }
    Ok(signals)
}
