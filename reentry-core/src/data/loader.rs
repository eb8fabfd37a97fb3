//! Trade table loading from the backtest's CSV export.
//!
//! Expected header:
//! `TradeId,EntryTime,EntryPrice,ExitTime,ExitPrice,ExitReason,HoldingBars,PnLPercent,PnLAmount,TotalFee`
//!
//! `PnLPercent` is a string with a trailing `%` (`"9.93%"`). Anything that
//! does not parse is a hard error; the caller aborts the stage.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::timestamp::parse_timestamp;
use crate::domain::{DatasetHash, ExitReason, TradeRecord};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Errors from the loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("line {line}: cannot parse {column} '{value}' as a timestamp")]
    Timestamp {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("line {line}: {source}")]
    Percent {
        line: usize,
        #[source]
        source: PercentError,
    },

    #[error("trade {trade_id} exits before it enters")]
    ExitBeforeEntry { trade_id: u32 },
}

/// A percentage string that is not `<number>%`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("'{value}' is not a percentage (expected a number followed by '%')")]
pub struct PercentError {
    pub value: String,
}

/// Parse `"9.93%"` into `9.93`.
///
/// The trailing `%` is required. A bare number is rejected rather than
/// guessed at, since exports that drop the suffix usually also switch to
/// fractions.
pub fn parse_pnl_percent(value: &str) -> Result<f64, PercentError> {
    let err = || PercentError {
        value: value.to_string(),
    };
    let number = value.trim().strip_suffix('%').ok_or_else(err)?;
    number.trim().parse::<f64>().map_err(|_| err())
}

/// Raw CSV row before timestamps and percentages are parsed.
#[derive(Debug, Deserialize)]
struct RawTrade {
    #[serde(rename = "TradeId")]
    trade_id: u32,
    #[serde(rename = "EntryTime")]
    entry_time: String,
    #[serde(rename = "EntryPrice")]
    entry_price: f64,
    #[serde(rename = "ExitTime")]
    exit_time: String,
    #[serde(rename = "ExitPrice")]
    exit_price: f64,
    #[serde(rename = "ExitReason")]
    exit_reason: String,
    #[serde(rename = "HoldingBars")]
    holding_bars: u32,
    #[serde(rename = "PnLPercent")]
    pnl_percent: String,
    #[serde(rename = "PnLAmount")]
    pnl_amount: f64,
    #[serde(rename = "TotalFee")]
    total_fee: f64,
}

impl RawTrade {
    fn into_record(self, line: usize) -> Result<TradeRecord, LoadError> {
        let entry_time = timestamp(&self.entry_time, line, "EntryTime")?;
        let exit_time = timestamp(&self.exit_time, line, "ExitTime")?;
        let pnl_percent = parse_pnl_percent(&self.pnl_percent)
            .map_err(|source| LoadError::Percent { line, source })?;

        if exit_time < entry_time {
            return Err(LoadError::ExitBeforeEntry {
                trade_id: self.trade_id,
            });
        }

        Ok(TradeRecord {
            trade_id: self.trade_id,
            entry_time,
            entry_price: self.entry_price,
            exit_time,
            exit_price: self.exit_price,
            exit_reason: ExitReason::parse(&self.exit_reason),
            holding_bars: self.holding_bars,
            pnl_percent,
            pnl_amount: self.pnl_amount,
            total_fee: self.total_fee,
        })
    }
}

pub(crate) fn timestamp(
    value: &str,
    line: usize,
    column: &'static str,
) -> Result<NaiveDateTime, LoadError> {
    parse_timestamp(value).ok_or_else(|| LoadError::Timestamp {
        line,
        column,
        value: value.to_string(),
    })
}

pub(crate) fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

pub(crate) fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// The backtest's trades, in entry order, plus the hash of the file they
/// came from.
#[derive(Debug, Clone)]
pub struct TradeTable {
    pub trades: Vec<TradeRecord>,
    pub dataset_hash: DatasetHash,
}

impl TradeTable {
    pub fn new(trades: Vec<TradeRecord>, dataset_hash: DatasetHash) -> Self {
        Self {
            trades,
            dataset_hash,
        }
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// First entry to latest exit, or `None` for an empty table.
    pub fn period(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.trades.first()?.entry_time;
        let last = self.trades.iter().map(|t| t.exit_time).max()?;
        Some((first, last))
    }
}

/// Load the trade table from a CSV file.
pub fn load_trades(path: &Path) -> Result<TradeTable, LoadError> {
    let bytes = read_file(path)?;
    let dataset_hash = DatasetHash::of_bytes(&bytes);
    let trades = parse_trades(strip_bom(&bytes))?;
    debug!(path = %path.display(), trades = trades.len(), hash = dataset_hash.short(), "loaded trade table");
    Ok(TradeTable::new(trades, dataset_hash))
}

/// Load the trade table from any reader (tests, stdin).
pub fn load_trades_from_reader<R: Read>(mut reader: R) -> Result<TradeTable, LoadError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| LoadError::Io {
            path: PathBuf::from("<reader>"),
            source,
        })?;
    let dataset_hash = DatasetHash::of_bytes(&bytes);
    let trades = parse_trades(strip_bom(&bytes))?;
    Ok(TradeTable::new(trades, dataset_hash))
}

fn parse_trades(bytes: &[u8]) -> Result<Vec<TradeRecord>, LoadError> {
    let mut rdr = csv_reader(bytes);
    let mut trades = Vec::new();

    for (i, row) in rdr.deserialize::<RawTrade>().enumerate() {
        // Line 1 is the header.
        let line = i + 2;
        trades.push(row?.into_record(line)?);
    }

    let ordered = trades
        .windows(2)
        .all(|pair| pair[0].entry_time <= pair[1].entry_time);
    if !ordered {
        warn!("trade table is not ordered by entry time; sorting it");
        trades.sort_by_key(|t| t.entry_time);
    }

    Ok(trades)
}
