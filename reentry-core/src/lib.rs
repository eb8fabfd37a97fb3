//! Reentry Core: trade tables, reentry intervals, overlap checks, statistics.
//!
//! This crate holds everything the analysis stages compute, with no output
//! side effects:
//! - Domain types (backtest trades, reference trades, exit reasons)
//! - Trade table and signal log loading from CSV
//! - Reentry interval derivation and bucket classification
//! - Overlap validation ("no new position before the previous one closes")
//! - Violation cases, high-frequency days, cooldown impact
//! - Descriptive statistics (linear-interpolation percentiles)

pub mod analysis;
pub mod data;
pub mod domain;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the types handed between stages are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::TradeRecord>();
        require_sync::<domain::TradeRecord>();
        require_send::<domain::ReferenceTrade>();
        require_sync::<domain::ReferenceTrade>();
        require_send::<domain::DatasetHash>();
        require_sync::<domain::DatasetHash>();

        require_send::<data::TradeTable>();
        require_sync::<data::TradeTable>();
        require_send::<data::LoadError>();
        require_sync::<data::LoadError>();

        require_send::<analysis::ReentryInterval>();
        require_sync::<analysis::ReentryInterval>();
        require_send::<analysis::BucketCounts>();
        require_sync::<analysis::BucketCounts>();
        require_send::<analysis::IntervalStats>();
        require_sync::<analysis::IntervalStats>();
        require_send::<analysis::OverlapViolation>();
        require_sync::<analysis::OverlapViolation>();
        require_send::<analysis::HighFrequencyDay>();
        require_sync::<analysis::HighFrequencyDay>();
    }
}
