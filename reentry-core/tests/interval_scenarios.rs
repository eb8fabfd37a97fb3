//! Scenario tests: load a trade table from CSV text and run the analysis
//! end to end, the way the pattern and violation stages do.

use reentry_core::analysis::{
    compute_intervals, find_overlaps, high_frequency_days, minutes_of, quick_reentry_cases,
    zero_holding_cases, zero_holding_trades, BucketCounts, IntervalBucket, IntervalStats,
    QuickReentrySummary,
};
use reentry_core::data::load_trades_from_reader;

const HEADER: &str =
    "TradeId,EntryTime,EntryPrice,ExitTime,ExitPrice,ExitReason,HoldingBars,PnLPercent,PnLAmount,TotalFee\n";

fn load(rows: &str) -> reentry_core::data::TradeTable {
    load_trades_from_reader(format!("{HEADER}{rows}").as_bytes()).unwrap()
}

#[test]
fn three_intervals_land_in_expected_buckets() {
    // GIVEN exits at 10:00, 10:15, 11:00 and next entries 10:00, 10:20, 13:00
    let table = load(
        "1,2024-01-01 09:00,1.0,2024-01-01 10:00,1.1,TP,4,10.00%,100,1\n\
         2,2024-01-01 10:00,1.0,2024-01-01 10:15,0.9,SL,1,-10.00%,-100,1\n\
         3,2024-01-01 10:20,1.0,2024-01-01 11:00,1.1,TP,2,10.00%,100,1\n\
         4,2024-01-01 13:00,1.0,2024-01-01 14:00,1.1,TP,4,10.00%,100,1\n",
    );

    // WHEN intervals are computed
    let ivs = compute_intervals(&table.trades);

    // THEN they are [0, 5, 120] in SameBar, Adjacent, WithinDay
    assert_eq!(minutes_of(&ivs), vec![0.0, 5.0, 120.0]);
    let buckets: Vec<IntervalBucket> = ivs.iter().map(|iv| iv.bucket()).collect();
    assert_eq!(
        buckets,
        vec![
            IntervalBucket::SameBar,
            IntervalBucket::Adjacent,
            IntervalBucket::WithinDay
        ]
    );
    assert!(find_overlaps(&table.trades).is_empty());
}

#[test]
fn zero_holding_is_independent_of_zero_interval() {
    // GIVEN one zero-holding trade followed by a gap, and one same-bar
    // reentry after a trade that held for several bars
    let table = load(
        "1,2024-02-01 09:00,1.0,2024-02-01 09:00,0.9,SL,0,-10.00%,-100,1\n\
         2,2024-02-01 10:00,1.0,2024-02-01 11:00,1.1,TP,4,10.00%,100,1\n\
         3,2024-02-01 11:00,1.0,2024-02-01 12:00,1.1,TP,4,10.00%,100,1\n\
         4,2024-02-01 12:00,1.0,2024-02-01 13:00,1.1,TP,4,10.00%,100,1\n",
    );

    // WHEN both flags are counted
    let zero_holding = zero_holding_trades(&table.trades).len();
    let buckets = BucketCounts::from_intervals(&compute_intervals(&table.trades));

    // THEN they differ
    assert_eq!(zero_holding, 1);
    assert_eq!(buckets.get(IntervalBucket::SameBar), 2);

    let cases = zero_holding_cases(&table.trades);
    assert_eq!(cases[0].trade.trade_id, 1);
    assert!(cases[0].previous.is_none());
    assert_eq!(cases[0].next.as_ref().map(|n| n.interval_minutes), Some(60.0));
}

#[test]
fn single_trade_table() {
    let table = load("1,2024-01-01 09:00,1.0,2024-01-01 10:00,1.1,TP,4,10.00%,100,1\n");
    let ivs = compute_intervals(&table.trades);
    assert!(ivs.is_empty());

    let buckets = BucketCounts::from_intervals(&ivs);
    assert!(buckets.rows().is_empty());
    for b in IntervalBucket::ALL {
        assert_eq!(buckets.share(b), 0.0);
    }
    assert!(IntervalStats::from_minutes(&minutes_of(&ivs)).is_none());

    let summary = QuickReentrySummary::new(table.len(), &ivs);
    assert_eq!(summary.quick, 0);
    assert!(quick_reentry_cases(&table.trades, &ivs).is_empty());
}

#[test]
fn overlapping_positions_are_all_reported() {
    // GIVEN two separate overlaps
    let table = load(
        "1,2024-03-01 09:00,1.0,2024-03-01 10:00,1.1,TP,4,10.00%,100,1\n\
         2,2024-03-01 09:30,1.0,2024-03-01 11:00,1.1,TP,6,10.00%,100,1\n\
         3,2024-03-01 12:00,1.0,2024-03-01 13:00,1.1,TP,4,10.00%,100,1\n\
         4,2024-03-01 12:45,1.0,2024-03-01 14:00,1.1,TP,5,10.00%,100,1\n",
    );

    // WHEN the overlap scan runs
    let v = find_overlaps(&table.trades);

    // THEN both are reported, not just the first
    assert_eq!(v.len(), 2);
    assert_eq!((v[0].trade_id, v[0].next_trade_id), (1, 2));
    assert_eq!((v[1].trade_id, v[1].next_trade_id), (3, 4));
    assert_eq!(v[0].overlap_minutes, 30.0);
    assert_eq!(v[1].overlap_minutes, 15.0);
}

#[test]
fn busy_day_detected_from_csv() {
    let table = load(
        "1,2024-04-01 01:00,1.0,2024-04-01 01:15,1.1,TP,1,10.00%,100,1\n\
         2,2024-04-01 01:15,1.0,2024-04-01 01:30,0.9,SL,1,-10.00%,-100,1\n\
         3,2024-04-01 02:00,1.0,2024-04-01 02:15,1.1,TP,1,10.00%,100,1\n\
         4,2024-04-02 02:00,1.0,2024-04-02 02:15,1.1,TP,1,10.00%,100,1\n",
    );
    let days = high_frequency_days(&table.trades, 3);
    assert_eq!(days.len(), 1);
    assert_eq!(days[0].count(), 3);
    assert_eq!(days[0].wins, 2);
    assert_eq!(days[0].losses, 1);
    assert!((days[0].pnl_percent_sum - 10.0).abs() < 1e-9);
}
