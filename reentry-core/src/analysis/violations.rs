//! Violation summary: one row per rule-violation type with a severity and
//! the recommended fix.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::intervals::{BucketCounts, IntervalBucket, ReentryInterval};
use super::stats::pct;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    ZeroHolding,
    SameBarReentry,
    QuickReentry,
    HighFrequencyDay,
}

impl ViolationKind {
    pub fn label(self) -> &'static str {
        match self {
            ViolationKind::ZeroHolding => "Zero-bar holding",
            ViolationKind::SameBarReentry => "Same-bar re-entry",
            ViolationKind::QuickReentry => "Re-entry within 15 minutes",
            ViolationKind::HighFrequencyDay => "Day with 3+ trades",
        }
    }

    pub fn action(self) -> &'static str {
        match self {
            ViolationKind::ZeroHolding => {
                "Review stop-loss/take-profit triggering; avoid repeated triggers within one bar"
            }
            ViolationKind::SameBarReentry => "Add a cooldown of at least one bar",
            ViolationKind::QuickReentry => "Consider a 15-60 minute cooldown",
            ViolationKind::HighFrequencyDay => "Cap the number of trades per day",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationRow {
    pub kind: ViolationKind,
    pub count: usize,
    /// Share of trades, or of trading days for [`ViolationKind::HighFrequencyDay`].
    pub share_pct: f64,
    pub severity: Severity,
}

/// Inputs the summary is computed from.
#[derive(Debug, Clone, Copy)]
pub struct ViolationInputs<'a> {
    pub total_trades: usize,
    pub zero_holding: usize,
    pub intervals: &'a [ReentryInterval],
    pub high_frequency_days: usize,
    pub trading_days: usize,
    /// More zero-holding cases than this is High severity.
    pub zero_holding_high_above: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationSummary {
    pub rows: Vec<ViolationRow>,
}

impl ViolationSummary {
    pub fn new(inputs: ViolationInputs<'_>) -> Self {
        let buckets = BucketCounts::from_intervals(inputs.intervals);
        let same_bar = buckets.get(IntervalBucket::SameBar);
        let quick = buckets.at_most(IntervalBucket::Adjacent);
        let total = inputs.total_trades;

        let zero_severity = if inputs.zero_holding > inputs.zero_holding_high_above {
            Severity::High
        } else {
            Severity::Medium
        };

        let rows = vec![
            ViolationRow {
                kind: ViolationKind::ZeroHolding,
                count: inputs.zero_holding,
                share_pct: pct(inputs.zero_holding, total),
                severity: zero_severity,
            },
            ViolationRow {
                kind: ViolationKind::SameBarReentry,
                count: same_bar,
                share_pct: pct(same_bar, total),
                severity: Severity::High,
            },
            ViolationRow {
                kind: ViolationKind::QuickReentry,
                count: quick,
                share_pct: pct(quick, total),
                severity: Severity::Medium,
            },
            ViolationRow {
                kind: ViolationKind::HighFrequencyDay,
                count: inputs.high_frequency_days,
                share_pct: pct(inputs.high_frequency_days, inputs.trading_days),
                severity: Severity::Low,
            },
        ];
        Self { rows }
    }

    pub fn get(&self, kind: ViolationKind) -> Option<&ViolationRow> {
        self.rows.iter().find(|r| r.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(zero_holding: usize, intervals: &[ReentryInterval]) -> ViolationInputs<'_> {
        ViolationInputs {
            total_trades: 20,
            zero_holding,
            intervals,
            high_frequency_days: 2,
            trading_days: 8,
            zero_holding_high_above: 10,
        }
    }

    #[test]
    fn zero_holding_severity_threshold() {
        let medium = ViolationSummary::new(inputs(10, &[]));
        assert_eq!(
            medium.get(ViolationKind::ZeroHolding).unwrap().severity,
            Severity::Medium
        );
        let high = ViolationSummary::new(inputs(11, &[]));
        assert_eq!(
            high.get(ViolationKind::ZeroHolding).unwrap().severity,
            Severity::High
        );
    }

    #[test]
    fn four_rows_with_fixed_severities() {
        let s = ViolationSummary::new(inputs(4, &[]));
        assert_eq!(s.rows.len(), 4);
        assert_eq!(s.rows[1].severity, Severity::High);
        assert_eq!(s.rows[2].severity, Severity::Medium);
        assert_eq!(s.rows[3].severity, Severity::Low);
        assert!((s.rows[0].share_pct - 20.0).abs() < 1e-12);
        assert!((s.rows[3].share_pct - 25.0).abs() < 1e-12);
    }

    #[test]
    fn empty_table_has_zero_shares() {
        let s = ViolationSummary::new(ViolationInputs {
            total_trades: 0,
            zero_holding: 0,
            intervals: &[],
            high_frequency_days: 0,
            trading_days: 0,
            zero_holding_high_above: 10,
        });
        assert!(s.rows.iter().all(|r| r.share_pct == 0.0));
    }
}
