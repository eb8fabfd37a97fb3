//! Binning and grouping behind the charts. Pure functions, no drawing.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use reentry_core::analysis::{BAR_MINUTES, DAY_MINUTES, HOUR_MINUTES};
use reentry_core::domain::TradeRecord;

/// Bucket edges for the full-range bar chart, before the open-ended last
/// edge: immediate, hour, 4 hours, day, week.
pub const DISTRIBUTION_EDGES: [f64; 6] = [0.0, BAR_MINUTES, HOUR_MINUTES, 240.0, DAY_MINUTES, 10080.0];

pub const DISTRIBUTION_LABELS: [&str; 6] = [
    "0-15 min (immediate)",
    "15 min-1 h",
    "1-4 h",
    "4 h-1 day",
    "1-7 days",
    "7 days+",
];

/// Edges of the short-interval histogram (≤ 1 hour).
pub const SHORT_EDGES: [f64; 8] = [0.0, 5.0, 10.0, 15.0, 20.0, 30.0, 45.0, 60.0];

/// Smallest value plotted on a log axis.
pub const LOG_EPSILON: f64 = 0.1;

/// Full-range edges, closed by the largest interval (or the last fixed
/// edge when nothing is longer than a week).
pub fn distribution_edges(max: f64) -> Vec<f64> {
    let mut edges = DISTRIBUTION_EDGES.to_vec();
    edges.push(max.max(DISTRIBUTION_EDGES[DISTRIBUTION_EDGES.len() - 1]));
    edges
}

/// Count `values` into the bins delimited by `edges`.
///
/// Bin `i` is `[edges[i], edges[i + 1])`; the last bin also includes its
/// right edge. Values outside `[edges[0], edges[last]]` are dropped.
pub fn histogram(values: &[f64], edges: &[f64]) -> Vec<usize> {
    if edges.len() < 2 {
        return Vec::new();
    }
    let bins = edges.len() - 1;
    let mut counts = vec![0; bins];
    let (lo, hi) = (edges[0], edges[bins]);
    for &v in values {
        if !(lo..=hi).contains(&v) {
            continue;
        }
        // Last bin whose left edge is <= v.
        let idx = edges[..bins]
            .iter()
            .rposition(|&e| e <= v)
            .unwrap_or(0);
        counts[idx] += 1;
    }
    counts
}

/// Clamp for log axes: non-positive values become [`LOG_EPSILON`].
pub fn clamp_for_log(value: f64) -> f64 {
    value.max(LOG_EPSILON)
}

/// The four interval periods of the box plot panel.
pub const PERIOD_LABELS: [&str; 4] = ["0-15 min", "15 min-1 h", "1 h-1 day", "over 1 day"];

/// Split intervals into ≤15 min, (15, 60], (60, 1440] and > 1440.
pub fn split_by_period(minutes: &[f64]) -> [Vec<f64>; 4] {
    let mut groups: [Vec<f64>; 4] = Default::default();
    for &m in minutes {
        let slot = if m <= BAR_MINUTES {
            0
        } else if m <= HOUR_MINUTES {
            1
        } else if m <= DAY_MINUTES {
            2
        } else {
            3
        };
        groups[slot].push(m);
    }
    groups
}

/// Entry counts per calendar month, keyed by the first day of the month.
pub fn monthly_counts(trades: &[TradeRecord]) -> Vec<(NaiveDate, usize)> {
    let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for t in trades {
        *months
            .entry((t.entry_time.year(), t.entry_time.month()))
            .or_default() += 1;
    }
    months
        .into_iter()
        .filter_map(|((y, m), n)| NaiveDate::from_ymd_opt(y, m, 1).map(|d| (d, n)))
        .collect()
}

/// Days since the Unix epoch, for the time axes.
pub fn to_days(t: NaiveDateTime) -> f64 {
    t.and_utc().timestamp() as f64 / 86_400.0
}

pub fn days_label(days: f64, format: &str) -> String {
    chrono::DateTime::from_timestamp((days * 86_400.0) as i64, 0)
        .map(|dt| dt.format(format).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reentry_core::domain::ExitReason;

    #[test]
    fn last_bin_is_closed() {
        let counts = histogram(&[0.0, 5.0, 9.99, 10.0, 15.0], &[0.0, 5.0, 10.0, 15.0]);
        assert_eq!(counts, vec![1, 2, 2]);
    }

    #[test]
    fn out_of_range_values_dropped() {
        let counts = histogram(&[-1.0, 0.0, 61.0], &SHORT_EDGES);
        assert_eq!(counts.iter().sum::<usize>(), 1);
        assert_eq!(counts[0], 1);
    }

    #[test]
    fn degenerate_edges() {
        assert!(histogram(&[1.0], &[0.0]).is_empty());
    }

    #[test]
    fn distribution_edges_close_at_max() {
        assert_eq!(distribution_edges(20000.0).last(), Some(&20000.0));
        assert_eq!(distribution_edges(30.0).last(), Some(&10080.0));
        let counts = histogram(&[0.0, 14.0, 15.0, 100.0, 20000.0], &distribution_edges(20000.0));
        assert_eq!(counts, vec![2, 1, 1, 0, 0, 1]);
    }

    #[test]
    fn periods_split_at_bucket_edges() {
        let g = split_by_period(&[-3.0, 0.0, 15.0, 15.5, 60.0, 61.0, 1440.0, 1441.0]);
        assert_eq!(g[0], vec![-3.0, 0.0, 15.0]);
        assert_eq!(g[1], vec![15.5, 60.0]);
        assert_eq!(g[2], vec![61.0, 1440.0]);
        assert_eq!(g[3], vec![1441.0]);
    }

    #[test]
    fn log_clamp() {
        assert_eq!(clamp_for_log(0.0), LOG_EPSILON);
        assert_eq!(clamp_for_log(-5.0), LOG_EPSILON);
        assert_eq!(clamp_for_log(30.0), 30.0);
    }

    #[test]
    fn months_grouped_in_order() {
        let t = |y: i32, m: u32, d: u32| {
            let at = NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(1, 0, 0)
                .unwrap();
            TradeRecord {
                trade_id: d,
                entry_time: at,
                entry_price: 1.0,
                exit_time: at,
                exit_price: 1.0,
                exit_reason: ExitReason::TakeProfit,
                holding_bars: 0,
                pnl_percent: 0.0,
                pnl_amount: 0.0,
                total_fee: 0.0,
            }
        };
        let trades = vec![t(2024, 1, 3), t(2023, 12, 30), t(2024, 1, 20), t(2024, 3, 1)];
        let months = monthly_counts(&trades);
        assert_eq!(months.len(), 3);
        assert_eq!(months[0], (NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(), 1));
        assert_eq!(months[1], (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 2));
    }

    #[test]
    fn day_axis_round_trips_to_month_label() {
        let at = NaiveDate::from_ymd_opt(2024, 4, 13)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert_eq!(days_label(to_days(at), "%Y-%m"), "2024-04");
    }
}
