//! Per-day trade activity and high-frequency days.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::intervals::minutes_between;
use super::stats::{mean, pct};
use crate::domain::TradeRecord;

/// A calendar day (by entry date) with at least the configured number of
/// entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighFrequencyDay {
    pub date: NaiveDate,
    pub trades: Vec<TradeRecord>,
    pub pnl_percent_sum: f64,
    pub pnl_amount_sum: f64,
    pub wins: usize,
    pub losses: usize,
    /// Gaps between consecutive trades of the day, in minutes.
    pub intervals: Vec<f64>,
}

impl HighFrequencyDay {
    fn new(date: NaiveDate, trades: Vec<TradeRecord>) -> Self {
        let intervals = trades
            .windows(2)
            .map(|pair| minutes_between(pair[0].exit_time, pair[1].entry_time))
            .collect();
        Self {
            date,
            pnl_percent_sum: trades.iter().map(|t| t.pnl_percent).sum(),
            pnl_amount_sum: trades.iter().map(|t| t.pnl_amount).sum(),
            wins: trades.iter().filter(|t| t.is_winner()).count(),
            losses: trades.iter().filter(|t| t.is_loser()).count(),
            intervals,
            trades,
        }
    }

    pub fn count(&self) -> usize {
        self.trades.len()
    }

    pub fn win_rate_pct(&self) -> f64 {
        pct(self.wins, self.count())
    }

    /// (min, mean, max) of the intra-day intervals, if there are any.
    pub fn interval_range(&self) -> Option<(f64, f64, f64)> {
        if self.intervals.is_empty() {
            return None;
        }
        let min = self.intervals.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.intervals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((min, mean(&self.intervals), max))
    }
}

/// Trades grouped by entry date, table order kept within a day.
pub fn trades_by_day(trades: &[TradeRecord]) -> BTreeMap<NaiveDate, Vec<&TradeRecord>> {
    let mut days: BTreeMap<NaiveDate, Vec<&TradeRecord>> = BTreeMap::new();
    for t in trades {
        days.entry(t.entry_time.date()).or_default().push(t);
    }
    days
}

/// Days with at least `min_trades` entries, busiest first, ties by date.
pub fn high_frequency_days(trades: &[TradeRecord], min_trades: usize) -> Vec<HighFrequencyDay> {
    let mut days: Vec<HighFrequencyDay> = trades_by_day(trades)
        .into_iter()
        .filter(|(_, day)| day.len() >= min_trades)
        .map(|(date, day)| HighFrequencyDay::new(date, day.into_iter().cloned().collect()))
        .collect();
    days.sort_by(|a, b| b.count().cmp(&a.count()).then(a.date.cmp(&b.date)));
    days
}
