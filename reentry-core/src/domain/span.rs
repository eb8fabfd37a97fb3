//! TradeSpan: the entry/exit window shared by backtest and reference trades.
//!
//! Interval derivation and overlap validation only look at when a position
//! opened and closed, so they are written once against this trait and run
//! unchanged over both trade lists.

use chrono::NaiveDateTime;

pub trait TradeSpan {
    /// Identifier shown in reports.
    fn id(&self) -> u32;
    fn entry_time(&self) -> NaiveDateTime;
    fn exit_time(&self) -> NaiveDateTime;
}
