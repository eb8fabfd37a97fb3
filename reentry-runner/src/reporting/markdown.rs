//! Markdown report generator for the final quick-reentry report.
//!
//! Every figure in the report is computed from the inputs; nothing about the
//! analysed period or the reference system is hardcoded.

use chrono::NaiveDateTime;

use reentry_core::analysis::{
    cooldown_impact, find_overlaps, minutes_of, pct, BucketCounts, Comparison, CooldownAdvice,
    HighFrequencyDay, IntervalBucket, IntervalStats, ReentryInterval, BAR_MINUTES,
};
use reentry_core::domain::{DatasetHash, ReferenceTrade, TradeRecord};

use super::csv_export;

/// Everything the report is built from.
#[derive(Debug, Clone, Copy)]
pub struct ReportInputs<'a> {
    pub generated_at: NaiveDateTime,
    pub dataset_hash: &'a DatasetHash,
    pub reference_label: &'a str,
    pub trades: &'a [TradeRecord],
    pub intervals: &'a [ReentryInterval],
    pub reference: &'a [ReferenceTrade],
    pub reference_intervals: &'a [ReentryInterval],
    /// Sorted busiest first.
    pub high_frequency_days: &'a [HighFrequencyDay],
    pub high_frequency_min_trades: usize,
    pub max_daily_trades: usize,
    /// File names of the charts, in display order.
    pub chart_files: &'a [String],
}

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn stat_line(md: &mut String, label: &str, value: Option<f64>) {
    match value {
        Some(v) => md.push_str(&format!("- **{label}**: {v:.2} minutes\n")),
        None => md.push_str(&format!("- **{label}**: n/a\n")),
    }
}

fn fmt_opt(value: Option<f64>, digits: usize, suffix: &str) -> String {
    match value {
        Some(v) => format!("{v:.digits$}{suffix}"),
        None => "n/a".to_string(),
    }
}

fn win_rate(pnls: impl Iterator<Item = f64>) -> Option<f64> {
    let (mut wins, mut total) = (0usize, 0usize);
    for p in pnls {
        total += 1;
        if p > 0.0 {
            wins += 1;
        }
    }
    (total > 0).then(|| pct(wins, total))
}

/// Render the full report.
pub fn render_report(inp: &ReportInputs<'_>) -> String {
    let mut md = String::with_capacity(8192);
    let label = inp.reference_label;
    let n = inp.trades.len();
    let ref_n = inp.reference.len();

    let minutes = minutes_of(inp.intervals);
    let ref_minutes = minutes_of(inp.reference_intervals);
    let stats = IntervalStats::from_minutes(&minutes);
    let ref_stats = IntervalStats::from_minutes(&ref_minutes);
    let buckets = BucketCounts::from_minutes(&minutes);
    let ref_buckets = BucketCounts::from_minutes(&ref_minutes);

    let zero_holding: Vec<&TradeRecord> = inp.trades.iter().filter(|t| t.is_zero_holding()).collect();
    let same_bar = buckets.get(IntervalBucket::SameBar);
    let quick = buckets.at_most(IntervalBucket::Adjacent);
    let within_hour = buckets.at_most(IntervalBucket::WithinHour);
    let within_day = buckets.at_most(IntervalBucket::WithinDay);
    let valid = buckets.total();
    let comparison = Comparison::new(inp.trades, inp.reference);

    // ── Header ──
    md.push_str("# Quick Reentry Pattern Analysis Report\n\n");
    md.push_str(&format!(
        "**Generated**: {}\n",
        inp.generated_at.format(TIME_FORMAT)
    ));
    let period = inp
        .trades
        .first()
        .map(|t| t.entry_time)
        .zip(inp.trades.iter().map(|t| t.exit_time).max());
    match period {
        Some((start, end)) => md.push_str(&format!(
            "**Analysis period**: {} to {}\n",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        )),
        None => md.push_str("**Analysis period**: no trades\n"),
    }
    md.push_str(&format!("**Data sources**: backtest system vs {label}\n"));
    md.push_str(&format!("**Dataset hash**: `{}`\n\n", inp.dataset_hash.short()));
    md.push_str("---\n\n");

    // ── Executive summary ──
    md.push_str("## Executive Summary\n\n");
    md.push_str(&format!(
        "This report examines quick re-entries in the backtest system and compares its \
         trade timing with {label}.\n\n"
    ));
    md.push_str("### Key Findings\n\n");
    md.push_str(&format!(
        "1. **Quick re-entries**: {quick} trades re-entered within 15 minutes of the previous exit, \
         {:.2}% of all trades\n",
        pct(quick, n)
    ));
    md.push_str(&format!(
        "2. **Zero-bar holdings**: {} trades entered and exited within the same bar\n",
        zero_holding.len()
    ));
    md.push_str(&format!(
        "3. **{label} spacing**: shortest interval between trades is {}\n",
        fmt_opt(ref_stats.map(|s| s.min), 0, " minutes")
    ));
    md.push_str(&format!(
        "4. **Trade frequency**: backtest system {n} trades vs {label} {ref_n} trades\n\n"
    ));
    md.push_str("---\n\n");

    // ── Part 1 ──
    md.push_str("## Part 1: Quick Re-entry Statistics\n\n");
    md.push_str("### 1.1 Overview\n\n");
    md.push_str("| Metric | Value | Share |\n");
    md.push_str("|--------|-------|-------|\n");
    md.push_str(&format!("| Backtest trades | {n} | 100% |\n"));
    for (metric, count) in [
        ("Zero-bar holding", zero_holding.len()),
        ("Same-bar re-entry", same_bar),
        ("Re-entry within 15 minutes", quick),
        ("Re-entry within 1 hour", within_hour),
        ("Re-entry within 1 day", within_day),
    ] {
        md.push_str(&format!("| {metric} | {count} | {:.2}% |\n", pct(count, n)));
    }
    md.push('\n');

    md.push_str("### 1.2 Interval Distribution\n\n");
    md.push_str("**Backtest system intervals**:\n\n");
    stat_line(&mut md, "Minimum", stats.map(|s| s.min));
    stat_line(&mut md, "25th percentile", stats.map(|s| s.p25));
    stat_line(&mut md, "Median", stats.map(|s| s.median));
    stat_line(&mut md, "75th percentile", stats.map(|s| s.p75));
    if let Some(s) = stats {
        md.push_str(&format!(
            "- **Mean**: {:.2} minutes ({:.2} days)\n",
            s.mean,
            s.mean_days()
        ));
        md.push_str(&format!(
            "- **Maximum**: {:.2} minutes ({:.2} days)\n",
            s.max,
            s.max_days()
        ));
    }
    md.push_str(&format!("\n**{label} intervals**:\n\n"));
    stat_line(&mut md, "Minimum", ref_stats.map(|s| s.min));
    stat_line(&mut md, "Median", ref_stats.map(|s| s.median));
    if let Some(s) = ref_stats {
        md.push_str(&format!(
            "- **Mean**: {:.2} minutes ({:.2} days)\n",
            s.mean,
            s.mean_days()
        ));
        md.push_str(&format!(
            "- **Maximum**: {:.2} minutes ({:.2} days)\n",
            s.max,
            s.max_days()
        ));
    }
    md.push('\n');

    md.push_str("### 1.3 Interval Groups\n\n");
    md.push_str(&format!(
        "| Interval | Backtest count | Backtest share | {label} count |\n"
    ));
    md.push_str("|----------|----------------|----------------|---------------|\n");
    let groups = [
        ("≤15 minutes (immediate)", quick, ref_buckets.at_most(IntervalBucket::Adjacent)),
        (
            "15 minutes - 1 hour",
            buckets.get(IntervalBucket::WithinHour),
            ref_buckets.get(IntervalBucket::WithinHour),
        ),
        (
            "1 hour - 1 day",
            buckets.get(IntervalBucket::WithinDay),
            ref_buckets.get(IntervalBucket::WithinDay),
        ),
        (
            ">1 day",
            buckets.get(IntervalBucket::MultiDay),
            ref_buckets.get(IntervalBucket::MultiDay),
        ),
    ];
    for (name, count, ref_count) in groups {
        md.push_str(&format!(
            "| {name} | {count} | {:.2}% | {ref_count} |\n",
            pct(count, valid)
        ));
    }
    md.push_str("\n---\n\n");

    // ── Part 2 ──
    md.push_str("## Part 2: Rule Violation Cases\n\n");
    md.push_str("### 2.1 Zero-bar Holdings\n\n");
    md.push_str(&format!(
        "Found **{}** trades that entered and exited within the same bar.\n",
        zero_holding.len()
    ));
    if !zero_holding.is_empty() {
        md.push_str("\n**Typical cases**:\n");
        for (i, t) in zero_holding.iter().take(5).enumerate() {
            md.push_str(&format!("\n#### Case {}: trade #{}\n\n", i + 1, t.trade_id));
            md.push_str(&format!("- **Time**: {}\n", t.entry_time.format(TIME_FORMAT)));
            md.push_str(&format!("- **Entry price**: {:.10} USDT\n", t.entry_price));
            md.push_str(&format!("- **Exit price**: {:.10} USDT\n", t.exit_price));
            md.push_str(&format!("- **Exit reason**: {}\n", t.exit_reason));
            md.push_str(&format!("- **PnL**: {:.2}%\n", t.pnl_percent));
            md.push_str(&format!("- **Price change**: {:+.2}%\n", t.price_change_pct()));
        }
        md.push_str(
            "\n**Conclusions**:\n\
             - Price moved far enough within a single bar to trigger the stop or target\n\
             - Likely flash moves rather than regular volatility\n\
             - A confirmation step would avoid repeated triggers inside one bar\n",
        );
    }

    md.push_str("\n### 2.2 Same-bar Re-entries\n\n");
    md.push_str(&format!(
        "Found **{same_bar}** trades re-entered within the same bar as the previous exit.\n\n"
    ));
    md.push_str(&format!(
        "**Impact**:\n\
         - Frequent trading adds fee drag\n\
         - Points to a missing minimum cooldown in the strategy logic\n\
         - Contrasts with the conservative behaviour of {label}\n\n"
    ));

    md.push_str("### 2.3 High-frequency Days\n\n");
    md.push_str(&format!(
        "Found **{}** days with {} or more trades.\n",
        inp.high_frequency_days.len(),
        inp.high_frequency_min_trades
    ));
    if !inp.high_frequency_days.is_empty() {
        md.push_str("\n**Busiest days**:\n\n");
        for (i, day) in inp.high_frequency_days.iter().take(5).enumerate() {
            md.push_str(&format!(
                "{}. **{}**: {} trades, total PnL {:+.2}%\n",
                i + 1,
                day.date,
                day.count(),
                day.pnl_percent_sum
            ));
        }
    }
    md.push_str("\n---\n\n");

    // ── Part 3 ──
    md.push_str(&format!("## Part 3: {label} vs Backtest System\n\n"));
    md.push_str("### 3.1 Trade Frequency\n\n");
    md.push_str(&format!("| Metric | {label} | Backtest system | Ratio |\n"));
    md.push_str("|--------|-------------|-----------------|-------|\n");
    let trade_ratio = comparison.trade_ratio();
    md.push_str(&format!(
        "| Total trades | {ref_n} | {n} | {} |\n",
        fmt_opt(trade_ratio, 1, "x")
    ));
    md.push_str(&format!(
        "| Mean interval | {} | {} | {} |\n",
        fmt_opt(ref_stats.map(|s| s.mean), 0, " min"),
        fmt_opt(stats.map(|s| s.mean), 0, " min"),
        fmt_opt(comparison.mean_interval_ratio(), 1, "x")
    ));
    md.push_str(&format!(
        "| Minimum interval | {} | {} | {} |\n",
        fmt_opt(ref_stats.map(|s| s.min), 0, " min"),
        fmt_opt(stats.map(|s| s.min), 0, " min"),
        fmt_opt(comparison.min_interval_ratio(), 2, "x")
    ));
    md.push_str(&format!(
        "| Re-entries within 15 minutes | {} | {quick} | - |\n\n",
        ref_buckets.at_most(IntervalBucket::Adjacent)
    ));

    md.push_str("### 3.2 Rule Adherence\n\n");
    let ref_overlaps = find_overlaps(inp.reference).len();
    let overlaps = find_overlaps(inp.trades).len();
    let ref_win = win_rate(inp.reference.iter().filter_map(|t| t.pnl_percent));
    let win = win_rate(inp.trades.iter().map(|t| t.pnl_percent));
    md.push_str(&format!("**{label}**:\n"));
    md.push_str(&format!(
        "- {} \"no new position before the previous one closes\" ({ref_overlaps} overlaps)\n",
        if ref_overlaps == 0 { "OK" } else { "FAIL" }
    ));
    md.push_str(&format!(
        "- Minimum spacing between trades: {}\n",
        fmt_opt(ref_stats.map(|s| s.min), 0, " minutes")
    ));
    md.push_str(&format!("- Win rate: {}\n\n", fmt_opt(ref_win, 1, "%")));
    md.push_str("**Backtest system**:\n");
    md.push_str(&format!(
        "- {} \"no new position before the previous one closes\" ({overlaps} overlaps)\n",
        if overlaps == 0 { "OK" } else { "FAIL" }
    ));
    md.push_str(&format!(
        "- {} quick re-entries ({quick} within 15 minutes)\n",
        if quick == 0 { "OK" } else { "FAIL" }
    ));
    md.push_str(&format!("- Win rate: {}\n\n", fmt_opt(win, 1, "%")));
    md.push_str("---\n\n");

    // ── Part 4 ──
    md.push_str("## Part 4: Suggested Cooldown Parameters\n\n");
    md.push_str(&format!(
        "Based on the {label} intervals and the backtest system's behaviour:\n\n"
    ));
    md.push_str("### 4.1 Parameters\n\n");
    md.push_str("| Profile | Cooldown | Rationale | Expected impact |\n");
    md.push_str("|---------|----------|-----------|-----------------|\n");
    match ref_stats.map(|s| CooldownAdvice::from_reference(&s)) {
        Some(advice) => {
            for (profile, cooldown, why) in [
                (
                    "Conservative",
                    advice.conservative,
                    format!("Matches the {label} minimum interval"),
                ),
                (
                    "Moderate",
                    advice.moderate,
                    format!("{label} 25th percentile interval"),
                ),
                (
                    "Aggressive",
                    advice.aggressive,
                    "Only blocks same-bar and next-bar re-entries".to_string(),
                ),
            ] {
                let impact = cooldown_impact(&minutes, cooldown);
                md.push_str(&format!(
                    "| **{profile}** | {cooldown:.0} minutes | {why} | removes {} trades ({:.1}%) |\n",
                    impact.suppressed,
                    impact.suppressed_pct()
                ));
            }
        }
        None => {
            let impact = cooldown_impact(&minutes, BAR_MINUTES);
            md.push_str(&format!(
                "| **Aggressive** | {BAR_MINUTES:.0} minutes | Only blocks same-bar and next-bar re-entries | removes {} trades ({:.1}%) |\n",
                impact.suppressed,
                impact.suppressed_pct()
            ));
        }
    }
    md.push_str("\n### 4.2 Further Recommendations\n\n");
    md.push_str(
        "1. **Intrabar trading limit**:\n\
         \x20  - Avoid entering and exiting within the same bar\n\
         \x20  - Hold for at least one bar (15 minutes)\n\n",
    );
    md.push_str(&format!(
        "2. **Daily trade limit**:\n\
         \x20  - The busiest day had {} trades\n\
         \x20  - Cap the strategy at 3-5 trades per day\n\n",
        inp.max_daily_trades
    ));
    md.push_str(
        "3. **Price confirmation**:\n\
         \x20  - Wait for the next bar to confirm a signal\n\
         \x20  - Avoid false signals from intrabar swings\n\n",
    );
    md.push_str("---\n\n");

    // ── Part 5 ──
    let abnormal = quick + zero_holding.len();
    md.push_str("## Part 5: Implementation Roadmap\n\n");
    md.push_str("### Phase 1: Immediate fixes\n\n");
    md.push_str(
        "- [ ] Add a minimum 15-minute cooldown\n\
         - [ ] Forbid entry and exit within the same bar\n\
         - [ ] Add a daily trade limit (5 trades suggested)\n\n",
    );
    md.push_str(&format!(
        "**Expected effect**: removes {abnormal} abnormal trades\n\n"
    ));
    md.push_str("### Phase 2: Parameter tuning\n\n");
    md.push_str(
        "- [ ] Test cooldowns of 15/30/60 minutes\n\
         - [ ] Improve signal confirmation\n\
         - [ ] Re-run the backtest to confirm the effect\n\n\
         **Expected effect**: more stable strategy, lower trade frequency\n\n",
    );
    md.push_str("### Phase 3: Full alignment\n\n");
    md.push_str(&format!(
        "- [ ] Align the trading logic of {label} and the backtest system\n\
         - [ ] Verify both systems produce the same signals\n\
         - [ ] Run walk-forward tests\n\n\
         **Expected effect**: comparable trade counts, win rates and returns\n\n"
    ));
    md.push_str("---\n\n");

    // ── Appendix ──
    md.push_str("## Appendix: Output Files\n\n");
    md.push_str("### CSV data files\n");
    for (i, (file, what)) in [
        (csv_export::QUICK_REENTRY_CASES, "every quick re-entry with context"),
        (csv_export::TRADE_INTERVALS, "interval after each trade"),
        (csv_export::QUICK_REENTRY_SUMMARY, "summary statistics"),
        (csv_export::VIOLATION_SUMMARY, "violation types with severity"),
        (csv_export::ZERO_HOLDING_CASES, "zero-bar holding trades"),
        (csv_export::QUICK_REENTRY_TRADES, "quick re-entry trades by interval"),
    ]
    .iter()
    .enumerate()
    {
        md.push_str(&format!("{}. `{file}` - {what}\n", i + 1));
    }
    md.push_str("\n### Charts\n");
    for (i, file) in inp.chart_files.iter().enumerate() {
        md.push_str(&format!("{}. `{file}`\n", i + 1));
    }
    md.push_str("\n---\n\n");

    // ── Conclusion ──
    md.push_str("## Conclusion\n\n");
    md.push_str(&format!(
        "The backtest system differs markedly from {label} in quick re-entries:\n\n\
         1. No cooldown, which leads to overtrading\n\
         2. {} zero-bar holding trades\n\
         3. Trade frequency is {} that of {label}\n\n",
        zero_holding.len(),
        fmt_opt(trade_ratio, 1, "x")
    ));
    md.push_str(&format!(
        "**Key recommendation**: add a cooldown of at least 15 minutes, forbid same-bar \
         re-trading and cap daily trades. This removes about {abnormal} ({:.1}%) abnormal trades.\n\n",
        pct(abnormal, n)
    ));
    md.push_str("---\n\n");
    md.push_str(&format!(
        "*Report generated: {}*\n",
        inp.generated_at.format(TIME_FORMAT)
    ));
    md.push_str(&format!(
        "*Data sources: backtest CSV export + {label} trade list*\n"
    ));

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use reentry_core::analysis::{compute_intervals, high_frequency_days};
    use reentry_core::domain::ExitReason;

    fn trade(id: u32, eh: u32, em: u32, xh: u32, xm: u32, bars: u32, pnl: f64) -> TradeRecord {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        TradeRecord {
            trade_id: id,
            entry_time: day.and_hms_opt(eh, em, 0).unwrap(),
            entry_price: 1.0,
            exit_time: day.and_hms_opt(xh, xm, 0).unwrap(),
            exit_price: 1.0 + pnl / 100.0,
            exit_reason: if pnl > 0.0 {
                ExitReason::TakeProfit
            } else {
                ExitReason::StopLoss
            },
            holding_bars: bars,
            pnl_percent: pnl,
            pnl_amount: pnl * 10.0,
            total_fee: 1.0,
        }
    }

    fn render(trades: &[TradeRecord]) -> String {
        let hash = DatasetHash::of_bytes(b"fixture");
        let reference = ReferenceTrade::canonical();
        let intervals = compute_intervals(trades);
        let ref_intervals = compute_intervals(&reference);
        let days = high_frequency_days(trades, 3);
        let charts = vec!["interval_distribution.svg".to_string()];
        render_report(&ReportInputs {
            generated_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            dataset_hash: &hash,
            reference_label: "RefPlatform",
            trades,
            intervals: &intervals,
            reference: &reference,
            reference_intervals: &ref_intervals,
            high_frequency_days: &days,
            high_frequency_min_trades: 3,
            max_daily_trades: 3,
            chart_files: &charts,
        })
    }

    #[test]
    fn period_comes_from_data() {
        let md = render(&[
            trade(1, 9, 0, 10, 0, 4, 10.0),
            trade(2, 10, 0, 10, 0, 0, -10.0),
            trade(3, 10, 10, 11, 0, 3, 10.0),
        ]);
        assert!(md.contains("**Analysis period**: 2024-05-01 to 2024-05-01"));
        assert!(md.contains("RefPlatform"));
        assert!(md.contains("| Zero-bar holding | 1 | 33.33% |"));
        assert!(md.contains("| Re-entry within 15 minutes | 2 | 66.67% |"));
        assert!(md.contains("`interval_distribution.svg`"));
    }

    #[test]
    fn reference_minimum_is_computed_not_hardcoded() {
        let md = render(&[trade(1, 9, 0, 10, 0, 4, 10.0), trade(2, 12, 0, 13, 0, 4, 10.0)]);
        // 2025-10-11 05:30 -> 05:44 in the canonical list
        assert!(md.contains("shortest interval between trades is 14 minutes"));
        assert!(md.contains("| **Conservative** | 14 minutes |"));
    }

    #[test]
    fn aggressive_cooldown_counts_next_bar_reentries() {
        // intervals 0, 15, 15, 30
        let md = render(&[
            trade(1, 9, 0, 10, 0, 4, 10.0),
            trade(2, 10, 0, 10, 30, 2, -5.0),
            trade(3, 10, 45, 11, 0, 1, 5.0),
            trade(4, 11, 15, 12, 0, 3, 5.0),
            trade(5, 12, 30, 13, 0, 2, -5.0),
        ]);
        assert!(md.contains(
            "| **Aggressive** | 15 minutes | Only blocks same-bar and next-bar re-entries \
             | removes 3 trades (75.0%) |"
        ));
    }

    #[test]
    fn comparison_ratios_are_backtest_over_reference() {
        let trades = [
            trade(1, 9, 0, 10, 0, 4, 10.0),
            trade(2, 10, 14, 11, 0, 4, 10.0),
            trade(3, 12, 0, 13, 0, 4, 10.0),
        ];
        let md = render(&trades);
        let c = Comparison::new(&trades, &ReferenceTrade::canonical());
        // backtest minimum 14 equals the canonical reference minimum
        assert_eq!(c.min_interval_ratio(), Some(1.0));
        assert!(md.contains("| Minimum interval | 14 min | 14 min | 1.00x |"));
        let mean = c.mean_interval_ratio().unwrap();
        assert!(mean < 1.0);
        assert!(md.contains(&format!("{mean:.1}x |")));
        assert!(md.contains(&format!("| Total trades | 9 | 3 | {:.1}x |", 3.0 / 9.0)));
    }

    #[test]
    fn empty_table_renders_without_panicking() {
        let md = render(&[]);
        assert!(md.contains("**Analysis period**: no trades"));
        assert!(md.contains("- **Minimum**: n/a"));
    }
}
