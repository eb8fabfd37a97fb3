//! Property tests for interval invariants.
//!
//! Uses proptest to verify:
//! 1. Bucket partition: the six bucket counts sum to the interval count
//! 2. Interval identity: interval[i] = entry[i+1] - exit[i], n-1 of them
//! 3. Overlap predicate: flagged iff entry[i+1] < exit[i]
//! 4. Cooldown monotonicity: a longer cooldown never suppresses fewer

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use reentry_core::analysis::{
    compute_intervals, cooldown_impact, find_overlaps, minutes_of, BucketCounts, IntervalBucket,
};
use reentry_core::domain::ReferenceTrade;

// ── Strategies (proptest) ────────────────────────────────────────────

fn origin() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// (holding, gap) pairs in minutes; negative gaps produce overlaps.
fn arb_shape() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((0i64..600, -120i64..5000), 0..60)
}

fn build(shape: &[(i64, i64)]) -> Vec<ReferenceTrade> {
    let mut entry = origin();
    let mut trades = Vec::with_capacity(shape.len());
    for (i, &(hold, gap)) in shape.iter().enumerate() {
        let exit = entry + Duration::minutes(hold);
        trades.push(ReferenceTrade {
            id: i as u32 + 1,
            entry_time: entry,
            exit_time: exit,
            pnl_percent: None,
        });
        entry = exit + Duration::minutes(gap);
    }
    trades
}

// ── 1. Bucket partition ──────────────────────────────────────────────

proptest! {
    #[test]
    fn buckets_partition_intervals(minutes in prop::collection::vec(-1e4..1e5_f64, 0..200)) {
        let counts = BucketCounts::from_minutes(&minutes);
        let sum: usize = IntervalBucket::ALL.iter().map(|&b| counts.get(b)).sum();
        prop_assert_eq!(sum, minutes.len());
        prop_assert_eq!(counts.at_most(IntervalBucket::MultiDay), minutes.len());
    }

    #[test]
    fn shares_sum_to_hundred_or_nothing(minutes in prop::collection::vec(0.0..1e5_f64, 0..200)) {
        let counts = BucketCounts::from_minutes(&minutes);
        let total: f64 = IntervalBucket::ALL.iter().map(|&b| counts.share(b)).sum();
        if minutes.is_empty() {
            prop_assert_eq!(total, 0.0);
        } else {
            prop_assert!((total - 100.0).abs() < 1e-6);
        }
    }
}

// ── 2. Interval identity ─────────────────────────────────────────────

proptest! {
    #[test]
    fn one_interval_per_consecutive_pair(shape in arb_shape()) {
        let trades = build(&shape);
        let ivs = compute_intervals(&trades);
        prop_assert_eq!(ivs.len(), trades.len().saturating_sub(1));
        for (i, iv) in ivs.iter().enumerate() {
            let expected = (trades[i + 1].entry_time - trades[i].exit_time).num_minutes() as f64;
            prop_assert_eq!(iv.minutes, expected);
            prop_assert_eq!(iv.minutes, shape[i].1 as f64);
        }
    }
}

// ── 3. Overlap predicate ─────────────────────────────────────────────

proptest! {
    #[test]
    fn overlap_iff_entry_precedes_exit(shape in arb_shape()) {
        let trades = build(&shape);
        let flagged: Vec<u32> = find_overlaps(&trades).iter().map(|v| v.trade_id).collect();
        let expected: Vec<u32> = trades
            .windows(2)
            .filter(|p| p[1].entry_time < p[0].exit_time)
            .map(|p| p[0].id)
            .collect();
        prop_assert_eq!(&flagged, &expected);

        // Overlapping bucket and overlap scan agree.
        let counts = BucketCounts::from_intervals(&compute_intervals(&trades));
        prop_assert_eq!(counts.get(IntervalBucket::Overlapping), flagged.len());
    }
}

// ── 4. Cooldown monotonicity ─────────────────────────────────────────

proptest! {
    #[test]
    fn longer_cooldown_suppresses_at_least_as_many(
        shape in arb_shape(),
        a in 0.0..2000.0_f64,
        b in 0.0..2000.0_f64,
    ) {
        let minutes = minutes_of(&compute_intervals(&build(&shape)));
        let (short, long) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            cooldown_impact(&minutes, short).suppressed <= cooldown_impact(&minutes, long).suppressed
        );
    }
}
