//! Reentry analysis: intervals, buckets, overlaps and violation cases.
//!
//! Everything here is a pure function of the trade list:
//!
//! 1. Intervals: exit of trade `i` to entry of trade `i + 1`
//! 2. Buckets: six disjoint interval classes
//! 3. Overlaps: pairs where the next entry precedes the previous exit
//! 4. Cases: zero-holding trades, quick reentries, high-frequency days
//! 5. Cooldown: how many reentries a minimum wait would remove

pub mod cases;
pub mod comparison;
pub mod cooldown;
pub mod daily;
pub mod intervals;
pub mod overlap;
pub mod stats;
pub mod violations;

pub use cases::{
    fastest_first, quick_reentry_cases, zero_holding_cases, CaseNote, Neighbor, ReentryCase,
    ZeroHoldingCase, TOP_CASES,
};
pub use comparison::{Comparison, SystemProfile};
pub use cooldown::{cooldown_impact, cooldown_table, CooldownAdvice, CooldownImpact};
pub use daily::{high_frequency_days, trades_by_day, HighFrequencyDay};
pub use intervals::{
    compute_intervals, minutes_between, minutes_of, zero_holding_trades,
    BucketCounts, IntervalBucket, QuickReentrySummary, ReentryInterval, BAR_MINUTES,
    DAY_MINUTES, HOUR_MINUTES,
};
pub use overlap::{find_overlaps, OverlapViolation};
pub use stats::{mean, pct, percentile, sorted, IntervalStats};
pub use violations::{Severity, ViolationInputs, ViolationKind, ViolationRow, ViolationSummary};
