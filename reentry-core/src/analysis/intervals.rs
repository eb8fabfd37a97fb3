//! Reentry intervals: time from one trade's exit to the next trade's entry.
//!
//! Trade `i` is paired with trade `i + 1` in table order; the last trade has
//! no interval. Intervals are bucketed into six disjoint classes that cover
//! the whole real line, so bucket counts always add up to the number of
//! intervals.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::stats::pct;
use crate::domain::{TradeRecord, TradeSpan};

/// One bar on the 15-minute timeframe the backtests run on.
pub const BAR_MINUTES: f64 = 15.0;
pub const HOUR_MINUTES: f64 = 60.0;
pub const DAY_MINUTES: f64 = 1440.0;

/// Minutes from `from` to `to`; negative when `to` is earlier.
pub fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_seconds() as f64 / 60.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReentryInterval {
    /// Position of the exiting trade in the table.
    pub trade_index: usize,
    pub trade_id: u32,
    pub next_trade_id: u32,
    pub exit_time: NaiveDateTime,
    pub next_entry_time: NaiveDateTime,
    pub minutes: f64,
}

impl ReentryInterval {
    pub fn bucket(&self) -> IntervalBucket {
        IntervalBucket::classify(self.minutes)
    }

    /// Within one bar of the exit, same-bar reentries included.
    pub fn is_quick(&self) -> bool {
        self.minutes <= BAR_MINUTES
    }

    pub fn hours(&self) -> f64 {
        self.minutes / HOUR_MINUTES
    }

    pub fn days(&self) -> f64 {
        self.minutes / DAY_MINUTES
    }
}

/// Intervals between consecutive trades, in table order.
pub fn compute_intervals<T: TradeSpan>(trades: &[T]) -> Vec<ReentryInterval> {
    trades
        .windows(2)
        .enumerate()
        .map(|(i, pair)| ReentryInterval {
            trade_index: i,
            trade_id: pair[0].id(),
            next_trade_id: pair[1].id(),
            exit_time: pair[0].exit_time(),
            next_entry_time: pair[1].entry_time(),
            minutes: minutes_between(pair[0].exit_time(), pair[1].entry_time()),
        })
        .collect()
}

pub fn minutes_of(intervals: &[ReentryInterval]) -> Vec<f64> {
    intervals.iter().map(|iv| iv.minutes).collect()
}

/// Disjoint interval classes, ordered by length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntervalBucket {
    /// Next entry before the previous exit.
    Overlapping,
    SameBar,
    /// (0, 15] minutes.
    Adjacent,
    /// (15, 60] minutes.
    WithinHour,
    /// (60, 1440] minutes.
    WithinDay,
    MultiDay,
}

impl IntervalBucket {
    pub const ALL: [IntervalBucket; 6] = [
        IntervalBucket::Overlapping,
        IntervalBucket::SameBar,
        IntervalBucket::Adjacent,
        IntervalBucket::WithinHour,
        IntervalBucket::WithinDay,
        IntervalBucket::MultiDay,
    ];

    pub fn classify(minutes: f64) -> Self {
        if minutes < 0.0 {
            IntervalBucket::Overlapping
        } else if minutes == 0.0 {
            IntervalBucket::SameBar
        } else if minutes <= BAR_MINUTES {
            IntervalBucket::Adjacent
        } else if minutes <= HOUR_MINUTES {
            IntervalBucket::WithinHour
        } else if minutes <= DAY_MINUTES {
            IntervalBucket::WithinDay
        } else {
            IntervalBucket::MultiDay
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IntervalBucket::Overlapping => "Overlapping (<0 min)",
            IntervalBucket::SameBar => "Same bar (0 min)",
            IntervalBucket::Adjacent => "Next bar (0-15 min]",
            IntervalBucket::WithinHour => "Within 1 hour (15-60 min]",
            IntervalBucket::WithinDay => "Within 1 day (1-24 h]",
            IntervalBucket::MultiDay => "Over 1 day (>24 h)",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// How many intervals fall in each bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    counts: [usize; 6],
}

impl BucketCounts {
    pub fn from_minutes(minutes: &[f64]) -> Self {
        let mut counts = [0; 6];
        for &m in minutes {
            counts[IntervalBucket::classify(m).slot()] += 1;
        }
        Self { counts }
    }

    pub fn from_intervals(intervals: &[ReentryInterval]) -> Self {
        Self::from_minutes(&minutes_of(intervals))
    }

    pub fn get(&self, bucket: IntervalBucket) -> usize {
        self.counts[bucket.slot()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Percent of all intervals in `bucket`; 0 when there are none.
    pub fn share(&self, bucket: IntervalBucket) -> f64 {
        pct(self.get(bucket), self.total())
    }

    /// Intervals in `bucket` or any shorter one.
    pub fn at_most(&self, bucket: IntervalBucket) -> usize {
        self.counts[..=bucket.slot()].iter().sum()
    }

    /// (bucket, count, share %) rows for tables. Empty when there are no
    /// intervals.
    pub fn rows(&self) -> Vec<(IntervalBucket, usize, f64)> {
        if self.total() == 0 {
            return Vec::new();
        }
        IntervalBucket::ALL
            .iter()
            .map(|&b| (b, self.get(b), self.share(b)))
            .collect()
    }
}

/// Headline quick-reentry counts, shares relative to the total trade count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuickReentrySummary {
    pub total_trades: usize,
    /// Interval exactly 0.
    pub same_bar: usize,
    /// Interval in (0, 15].
    pub adjacent_bar: usize,
    /// Interval ≤ 15, overlaps and same-bar included.
    pub quick: usize,
}

impl QuickReentrySummary {
    pub fn new(total_trades: usize, intervals: &[ReentryInterval]) -> Self {
        let buckets = BucketCounts::from_intervals(intervals);
        Self {
            total_trades,
            same_bar: buckets.get(IntervalBucket::SameBar),
            adjacent_bar: buckets.get(IntervalBucket::Adjacent),
            quick: buckets.at_most(IntervalBucket::Adjacent),
        }
    }

    pub fn same_bar_pct(&self) -> f64 {
        pct(self.same_bar, self.total_trades)
    }

    pub fn adjacent_bar_pct(&self) -> f64 {
        pct(self.adjacent_bar, self.total_trades)
    }

    pub fn quick_pct(&self) -> f64 {
        pct(self.quick, self.total_trades)
    }
}

/// Trades that entered and exited inside one bar.
pub fn zero_holding_trades(trades: &[TradeRecord]) -> Vec<&TradeRecord> {
    trades.iter().filter(|t| t.is_zero_holding()).collect()
}
