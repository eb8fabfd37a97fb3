//! Side-by-side interval statistics for the backtest and reference systems.

use serde::{Deserialize, Serialize};

use super::intervals::{compute_intervals, minutes_of, BucketCounts, IntervalBucket};
use super::stats::IntervalStats;
use crate::domain::TradeSpan;

/// Interval profile of one system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemProfile {
    pub trade_count: usize,
    pub stats: Option<IntervalStats>,
    pub buckets: BucketCounts,
}

impl SystemProfile {
    pub fn of<T: TradeSpan>(trades: &[T]) -> Self {
        let minutes = minutes_of(&compute_intervals(trades));
        Self {
            trade_count: trades.len(),
            stats: IntervalStats::from_minutes(&minutes),
            buckets: BucketCounts::from_minutes(&minutes),
        }
    }

    /// Reentries within one bar, overlaps and same-bar included.
    pub fn quick_reentries(&self) -> usize {
        self.buckets.at_most(IntervalBucket::Adjacent)
    }

    /// Reentries within one hour.
    pub fn within_hour(&self) -> usize {
        self.buckets.at_most(IntervalBucket::WithinHour)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub backtest: SystemProfile,
    pub reference: SystemProfile,
}

fn ratio(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 {
        None
    } else {
        Some(num / den)
    }
}

impl Comparison {
    pub fn new<B: TradeSpan, R: TradeSpan>(backtest: &[B], reference: &[R]) -> Self {
        Self {
            backtest: SystemProfile::of(backtest),
            reference: SystemProfile::of(reference),
        }
    }

    /// Backtest trades per reference trade.
    pub fn trade_ratio(&self) -> Option<f64> {
        ratio(
            self.backtest.trade_count as f64,
            self.reference.trade_count as f64,
        )
    }

    /// Backtest mean interval over reference mean interval.
    pub fn mean_interval_ratio(&self) -> Option<f64> {
        let (b, r) = (self.backtest.stats?, self.reference.stats?);
        ratio(b.mean, r.mean)
    }

    /// Backtest minimum interval over reference minimum interval.
    pub fn min_interval_ratio(&self) -> Option<f64> {
        let (b, r) = (self.backtest.stats?, self.reference.stats?);
        ratio(b.min, r.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReferenceTrade;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn span(id: u32, entry: NaiveDateTime, exit: NaiveDateTime) -> ReferenceTrade {
        ReferenceTrade {
            id,
            entry_time: entry,
            exit_time: exit,
            pnl_percent: None,
        }
    }

    #[test]
    fn canonical_reference_profile() {
        let p = SystemProfile::of(&ReferenceTrade::canonical());
        assert_eq!(p.trade_count, 9);
        let stats = p.stats.unwrap();
        assert_eq!(stats.count, 8);
        // 2025-10-11 05:30 -> 05:44
        assert_eq!(stats.min, 14.0);
        assert_eq!(p.quick_reentries(), 1);
        assert_eq!(p.within_hour(), 1);
    }

    #[test]
    fn ratios() {
        let backtest = vec![
            span(1, at(9, 0), at(10, 0)),
            span(2, at(10, 10), at(11, 0)),
            span(3, at(11, 30), at(12, 0)),
            span(4, at(12, 10), at(13, 0)),
        ];
        let reference = vec![span(1, at(9, 0), at(10, 0)), span(2, at(11, 0), at(12, 0))];
        let c = Comparison::new(&backtest, &reference);
        assert_eq!(c.trade_ratio(), Some(2.0));
        // backtest intervals 10, 30, 10 -> mean 50/3, min 10; reference 60
        assert!((c.mean_interval_ratio().unwrap() - (50.0 / 3.0) / 60.0).abs() < 1e-9);
        assert!((c.min_interval_ratio().unwrap() - 10.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn ratios_absent_without_intervals() {
        let one = vec![span(1, at(9, 0), at(10, 0))];
        let c = Comparison::new(&one, &ReferenceTrade::canonical());
        assert!(c.mean_interval_ratio().is_none());
        assert_eq!(c.trade_ratio(), Some(1.0 / 9.0));
    }
}
