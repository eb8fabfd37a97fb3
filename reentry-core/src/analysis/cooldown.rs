//! Cooldown simulation: how many reentries a minimum wait would suppress.

use serde::{Deserialize, Serialize};

use super::intervals::BAR_MINUTES;
use super::stats::{pct, IntervalStats};

/// Effect of one candidate cooldown on a set of intervals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CooldownImpact {
    pub cooldown_minutes: f64,
    /// Intervals no longer than the cooldown.
    pub suppressed: usize,
    pub total: usize,
}

impl CooldownImpact {
    pub fn suppressed_pct(&self) -> f64 {
        pct(self.suppressed, self.total)
    }
}

/// A reentry survives a cooldown only when its interval is longer than it,
/// so an interval of exactly one cooldown is suppressed.
pub fn cooldown_impact(minutes: &[f64], cooldown_minutes: f64) -> CooldownImpact {
    CooldownImpact {
        cooldown_minutes,
        suppressed: minutes.iter().filter(|&&m| m <= cooldown_minutes).count(),
        total: minutes.len(),
    }
}

/// Impact of each candidate, in the given order.
pub fn cooldown_table(minutes: &[f64], candidates: &[f64]) -> Vec<CooldownImpact> {
    candidates
        .iter()
        .map(|&c| cooldown_impact(minutes, c))
        .collect()
}

/// Three cooldown settings derived from the reference system's intervals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CooldownAdvice {
    /// The reference system's shortest observed interval.
    pub conservative: f64,
    /// The reference system's 25th percentile interval.
    pub moderate: f64,
    /// One bar.
    pub aggressive: f64,
}

impl CooldownAdvice {
    pub fn from_reference(reference: &IntervalStats) -> Self {
        Self {
            conservative: reference.min,
            moderate: reference.p25,
            aggressive: BAR_MINUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_equal_to_cooldown_is_suppressed() {
        let minutes = [0.0, 10.0, 15.0, 30.0, 90.0];
        let c = cooldown_impact(&minutes, 15.0);
        assert_eq!(c.suppressed, 3);
        assert!((c.suppressed_pct() - 60.0).abs() < 1e-12);
    }

    #[test]
    fn one_bar_cooldown_blocks_next_bar_reentries() {
        let c = cooldown_impact(&[0.0, 15.0, 15.0, 30.0], BAR_MINUTES);
        assert_eq!(c.suppressed, 3);
        assert_eq!(c.total, 4);
    }

    #[test]
    fn table_preserves_candidate_order() {
        let t = cooldown_table(&[5.0, 50.0, 500.0], &[240.0, 15.0, 60.0]);
        let suppressed: Vec<usize> = t.iter().map(|c| c.suppressed).collect();
        assert_eq!(suppressed, vec![2, 1, 2]);
    }

    #[test]
    fn no_intervals_suppresses_nothing() {
        let c = cooldown_impact(&[], 60.0);
        assert_eq!(c.suppressed, 0);
        assert_eq!(c.suppressed_pct(), 0.0);
    }

    #[test]
    fn advice_follows_reference_stats() {
        let stats = IntervalStats::from_minutes(&[14.0, 30.0, 45.0, 100.0, 2000.0]).unwrap();
        let a = CooldownAdvice::from_reference(&stats);
        assert_eq!(a.conservative, 14.0);
        assert_eq!(a.moderate, 30.0);
        assert_eq!(a.aggressive, 15.0);
    }
}
