//! Position overlap detection.
//!
//! A single-position strategy must close a trade before opening the next.
//! When trade `i + 1` enters strictly before trade `i` exits, both were open
//! at the same time. Entering at the exact exit timestamp is allowed.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::intervals::minutes_between;
use crate::domain::TradeSpan;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapViolation {
    pub trade_id: u32,
    pub trade_entry: NaiveDateTime,
    pub trade_exit: NaiveDateTime,
    pub next_trade_id: u32,
    pub next_entry: NaiveDateTime,
    /// How long both positions were open, in minutes (always > 0).
    pub overlap_minutes: f64,
}

/// Every consecutive pair whose next entry precedes the previous exit.
pub fn find_overlaps<T: TradeSpan>(trades: &[T]) -> Vec<OverlapViolation> {
    trades
        .windows(2)
        .filter(|pair| pair[1].entry_time() < pair[0].exit_time())
        .map(|pair| OverlapViolation {
            trade_id: pair[0].id(),
            trade_entry: pair[0].entry_time(),
            trade_exit: pair[0].exit_time(),
            next_trade_id: pair[1].id(),
            next_entry: pair[1].entry_time(),
            overlap_minutes: minutes_between(pair[1].entry_time(), pair[0].exit_time()),
        })
        .collect()
}
