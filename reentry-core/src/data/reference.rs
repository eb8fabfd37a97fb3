//! Reference trade list loading.
//!
//! Header: `Id,EntryTime,ExitTime,PnLPercent`. `PnLPercent` may be empty;
//! when present it follows the same `<number>%` rule as the trade table.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::loader::{csv_reader, parse_pnl_percent, read_file, strip_bom, timestamp, LoadError};
use crate::domain::ReferenceTrade;

#[derive(Debug, Deserialize)]
struct RawReferenceTrade {
    #[serde(rename = "Id")]
    id: u32,
    #[serde(rename = "EntryTime")]
    entry_time: String,
    #[serde(rename = "ExitTime")]
    exit_time: String,
    #[serde(rename = "PnLPercent", default)]
    pnl_percent: Option<String>,
}

pub fn load_reference_trades(path: &Path) -> Result<Vec<ReferenceTrade>, LoadError> {
    let bytes = read_file(path)?;
    load_reference_trades_from_reader(strip_bom(&bytes))
}

pub fn load_reference_trades_from_reader<R: Read>(
    reader: R,
) -> Result<Vec<ReferenceTrade>, LoadError> {
    let mut rdr = csv_reader(reader);
    let mut trades = Vec::new();

    for (i, row) in rdr.deserialize::<RawReferenceTrade>().enumerate() {
        let line = i + 2;
        let row = row?;
        let entry_time = timestamp(&row.entry_time, line, "EntryTime")?;
        let exit_time = timestamp(&row.exit_time, line, "ExitTime")?;
        if exit_time < entry_time {
            return Err(LoadError::ExitBeforeEntry { trade_id: row.id });
        }
        let pnl_percent = match row.pnl_percent.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(
                parse_pnl_percent(value).map_err(|source| LoadError::Percent { line, source })?,
            ),
        };
        trades.push(ReferenceTrade {
            id: row.id,
            entry_time,
            exit_time,
            pnl_percent,
        });
    }

    trades.sort_by_key(|t| t.entry_time);
    Ok(trades)
}
