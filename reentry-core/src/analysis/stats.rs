//! Descriptive statistics over interval sets.

use serde::{Deserialize, Serialize};

/// Compute the p-th percentile of a sorted slice using linear interpolation.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// `count / total` in percent; 0 when `total` is 0.
pub fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    v
}

/// Summary of a set of reentry intervals, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalStats {
    pub count: usize,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub mean: f64,
    pub max: f64,
}

impl IntervalStats {
    /// Returns `None` for an empty set.
    pub fn from_minutes(minutes: &[f64]) -> Option<Self> {
        if minutes.is_empty() {
            return None;
        }
        let s = sorted(minutes);
        Some(Self {
            count: s.len(),
            min: s[0],
            p25: percentile(&s, 25.0),
            median: percentile(&s, 50.0),
            p75: percentile(&s, 75.0),
            mean: mean(&s),
            max: s[s.len() - 1],
        })
    }

    pub fn mean_days(&self) -> f64 {
        self.mean / 1440.0
    }

    pub fn max_days(&self) -> f64 {
        self.max / 1440.0
    }
}
