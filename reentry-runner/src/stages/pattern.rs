//! `pattern` stage: quick-reentry statistics, interval distribution, the
//! reference comparison, overlap checks and cooldown advice.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use tracing::{info, warn};

use reentry_core::analysis::{
    cooldown_table, find_overlaps, pct, quick_reentry_cases, zero_holding_trades, BucketCounts,
    Comparison, CooldownAdvice, IntervalBucket, IntervalStats, OverlapViolation,
    QuickReentrySummary, TOP_CASES,
};
use reentry_core::data::load_signals;

use crate::config::AnalysisConfig;
use crate::context::AnalysisContext;
use crate::reporting::console::{
    align_numbers, count_share, minutes_days_label, minutes_label, print_banner, table,
};
use crate::reporting::csv_export::{
    self, export_intervals_csv, export_reentry_cases_csv, export_summary_csv, SummaryRow,
};
use crate::reporting::{write_csv, write_summary, AnalysisSummary, ANALYSIS_SUMMARY};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn run(config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    let ctx = AnalysisContext::load(config)?;
    run_with(config, &ctx)
}

/// Run the stage on an already loaded context. Returns the files written.
pub fn run_with(config: &AnalysisConfig, ctx: &AnalysisContext) -> Result<Vec<PathBuf>> {
    print_banner("Quick reentry pattern analysis");
    let trades = ctx.trades();
    let label = ctx.reference_label.as_str();
    println!("\nBacktest trades: {}", trades.len());

    let signal_count = match load_signals(&config.paths.signals_csv) {
        Ok(signals) => {
            println!("Sell signals: {}", signals.len());
            Some(signals.len())
        }
        Err(e) => {
            warn!(
                path = %config.paths.signals_csv.display(),
                error = %e,
                "sell signal log unavailable, continuing without it"
            );
            None
        }
    };

    // ── 1. Quick reentries ──
    print_banner("1. Quick reentry counts");
    let quick = QuickReentrySummary::new(trades.len(), &ctx.intervals);
    let zero_holding = zero_holding_trades(trades);
    let mut t = table(["Pattern", "Trades (share of all trades)"]);
    t.add_row(vec![
        "Same bar (interval = 0 min)".to_string(),
        count_share(quick.same_bar, quick.same_bar_pct()),
    ]);
    t.add_row(vec![
        "Next bar (0 < interval <= 15 min)".to_string(),
        count_share(quick.adjacent_bar, quick.adjacent_bar_pct()),
    ]);
    t.add_row(vec![
        "Quick total (interval <= 15 min)".to_string(),
        count_share(quick.quick, quick.quick_pct()),
    ]);
    t.add_row(vec![
        "Zero holding bars".to_string(),
        count_share(zero_holding.len(), pct(zero_holding.len(), trades.len())),
    ]);
    align_numbers(&mut t);
    println!("{t}");

    // ── 2. Distribution ──
    print_banner("2. Interval distribution");
    let minutes = ctx.minutes();
    let stats = IntervalStats::from_minutes(&minutes);
    let buckets = BucketCounts::from_minutes(&minutes);
    match &stats {
        Some(s) => {
            let mut t = table(["Statistic", "Minutes"]);
            t.add_row(vec!["Minimum".to_string(), minutes_label(s.min)]);
            t.add_row(vec!["25th percentile".to_string(), minutes_label(s.p25)]);
            t.add_row(vec!["Median".to_string(), minutes_label(s.median)]);
            t.add_row(vec!["75th percentile".to_string(), minutes_label(s.p75)]);
            t.add_row(vec!["Maximum".to_string(), minutes_days_label(s.max)]);
            align_numbers(&mut t);
            println!("{t}");

            let mut t = table(["Bucket", "Intervals (share of intervals)"]);
            for (bucket, count, share) in buckets.rows() {
                t.add_row(vec![bucket.label().to_string(), count_share(count, share)]);
            }
            align_numbers(&mut t);
            println!("{t}");
        }
        None => println!("\nFewer than two trades: no reentry intervals."),
    }

    // ── 3. Same-bar cases ──
    print_banner("3. Same-bar reentry cases");
    let same_bar: Vec<_> = ctx
        .intervals
        .iter()
        .filter(|iv| iv.bucket() == IntervalBucket::SameBar)
        .collect();
    if same_bar.is_empty() {
        println!("\nNo same-bar reentries found.");
    } else {
        println!("\n{} same-bar reentries:", same_bar.len());
        for iv in same_bar {
            let exit = &trades[iv.trade_index];
            let next = &trades[iv.trade_index + 1];
            println!("\nTrade #{}:", exit.trade_id);
            println!("  exit:   {} @ {:.10}", exit.exit_time.format(TIME_FORMAT), exit.exit_price);
            println!("  reason: {}", exit.exit_reason);
            println!("  PnL:    {:.2}%", exit.pnl_percent);
            println!("  -> next #{}:", next.trade_id);
            println!("     entry: {} @ {:.10}", next.entry_time.format(TIME_FORMAT), next.entry_price);
            println!("     interval: {:.2} min (same bar)", iv.minutes);
        }
    }

    if !zero_holding.is_empty() {
        print_banner("Zero-holding trades");
        for t in &zero_holding {
            println!("\nTrade #{}:", t.trade_id);
            println!("  entry: {} @ {:.10}", t.entry_time.format(TIME_FORMAT), t.entry_price);
            println!("  exit:  {} @ {:.10}", t.exit_time.format(TIME_FORMAT), t.exit_price);
            println!("  reason: {}  PnL: {:.2}%  bars: {}", t.exit_reason, t.pnl_percent, t.holding_bars);
        }
    }

    // ── 4. Reference intervals ──
    print_banner(&format!("4. {label} reentry intervals"));
    let ref_minutes = ctx.reference_minutes();
    let ref_stats = IntervalStats::from_minutes(&ref_minutes);
    let mut t = table(["Pair", "Interval"]);
    for iv in &ctx.reference_intervals {
        t.add_row(vec![
            format!("#{} -> #{}", iv.trade_id, iv.next_trade_id),
            minutes_days_label(iv.minutes),
        ]);
    }
    align_numbers(&mut t);
    println!("{t}");
    if let Some(s) = &ref_stats {
        println!("minimum {}", minutes_label(s.min));
        println!("maximum {}", minutes_days_label(s.max));
        println!("mean    {}", minutes_days_label(s.mean));
    }

    // ── 5. Overlaps ──
    print_banner("5. Single-position rule (no entry before the previous exit)");
    let backtest_overlaps = find_overlaps(trades);
    print_overlaps("Backtest", &backtest_overlaps);
    let reference_overlaps = find_overlaps(&ctx.reference);
    print_overlaps(label, &reference_overlaps);

    // ── 6. Cooldown ──
    print_banner(&format!("6. Cooldown derived from {label} intervals"));
    let advice = ref_stats.as_ref().map(CooldownAdvice::from_reference);
    let mut candidates = config.thresholds.cooldown_candidates.clone();
    if let Some(a) = &advice {
        println!(
            "\n{label} minimum interval: {} ({:.2} h)",
            minutes_label(a.conservative),
            a.conservative / 60.0
        );
        println!("\nSuggested cooldowns:");
        println!("- conservative: {:.0} min ({label} minimum)", a.conservative);
        println!("- moderate:     {:.0} min ({label} 25th percentile)", a.moderate);
        println!("- aggressive:   {:.0} min (blocks same-bar and next-bar reentries)", a.aggressive);
        candidates.push(a.conservative);
    } else {
        println!("\nNot enough {label} trades to derive a cooldown.");
    }
    let impacts = cooldown_table(&minutes, &candidates);
    let mut t = table(["Cooldown", "Reentries suppressed"]);
    for c in &impacts {
        t.add_row(vec![
            format!("{:.0} min", c.cooldown_minutes),
            count_share(c.suppressed, c.suppressed_pct()),
        ]);
    }
    align_numbers(&mut t);
    println!("{t}");

    // ── Summary ──
    print_banner("Summary");
    let comparison = Comparison::new(trades, &ctx.reference);
    let rows = summary_rows(ctx, &quick, zero_holding.len(), &comparison);
    let mut t = table(vec![
        "Metric".to_string(),
        "Backtest".to_string(),
        "Share".to_string(),
        format!("{label} reference"),
    ]);
    for r in &rows {
        t.add_row(vec![
            r.metric.clone(),
            r.backtest.clone(),
            r.backtest_share.clone(),
            r.reference.clone(),
        ]);
    }
    align_numbers(&mut t);
    println!("{t}");

    // ── Save ──
    print_banner("Saving results");
    let out = &config.paths.output_dir;
    let cases = quick_reentry_cases(trades, &ctx.intervals);
    let mut written = Vec::new();

    let path = out.join(csv_export::QUICK_REENTRY_CASES);
    write_csv(&path, &export_reentry_cases_csv(&cases)?)?;
    written.push(path);

    let path = out.join(csv_export::TRADE_INTERVALS);
    write_csv(&path, &export_intervals_csv(&ctx.intervals)?)?;
    written.push(path);

    let path = out.join(csv_export::QUICK_REENTRY_SUMMARY);
    write_csv(&path, &export_summary_csv(&rows, label)?)?;
    written.push(path);

    let summary = AnalysisSummary {
        generated_at: Local::now().naive_local(),
        dataset_hash: ctx.table.dataset_hash.to_string(),
        reference_label: label.to_string(),
        quick,
        comparison,
        backtest_overlaps: backtest_overlaps.len(),
        reference_overlaps: reference_overlaps.len(),
        cooldown_advice: advice,
        cooldown_impacts: impacts,
        signal_count,
    };
    let path = out.join(ANALYSIS_SUMMARY);
    write_summary(&path, &summary)?;
    written.push(path);

    for p in &written {
        println!("saved {}", p.display());
    }
    info!(files = written.len(), "pattern analysis complete");
    Ok(written)
}

fn print_overlaps(system: &str, overlaps: &[OverlapViolation]) {
    if overlaps.is_empty() {
        println!("\n{system}: no overlapping positions, rule respected.");
        return;
    }
    println!("\n{system}: {} overlapping pairs (rule violated):", overlaps.len());
    for o in overlaps.iter().take(TOP_CASES) {
        println!("\n  #{} and #{} overlap:", o.trade_id, o.next_trade_id);
        println!(
            "    #{}: {} -> {}",
            o.trade_id,
            o.trade_entry.format(TIME_FORMAT),
            o.trade_exit.format(TIME_FORMAT)
        );
        println!("    #{} entered {}", o.next_trade_id, o.next_entry.format(TIME_FORMAT));
        println!("    overlap: {:.2} min", o.overlap_minutes);
    }
}

fn stat_label(stats: Option<&IntervalStats>, pick: impl Fn(&IntervalStats) -> f64) -> String {
    stats
        .map(|s| minutes_label(pick(s)))
        .unwrap_or_else(|| "-".to_string())
}

/// Rows of the summary table and `quick_reentry_summary.csv`.
pub fn summary_rows(
    ctx: &AnalysisContext,
    quick: &QuickReentrySummary,
    zero_holding: usize,
    comparison: &Comparison,
) -> Vec<SummaryRow> {
    let bt = &comparison.backtest;
    let rf = &comparison.reference;
    let valid = bt.buckets.total();
    let row = |metric: &str, backtest: String, share: String, reference: String| SummaryRow {
        metric: metric.to_string(),
        backtest,
        backtest_share: share,
        reference,
    };

    vec![
        row(
            "Total trades",
            quick.total_trades.to_string(),
            "100%".to_string(),
            rf.trade_count.to_string(),
        ),
        row(
            "Same-bar reentry",
            quick.same_bar.to_string(),
            format!("{:.2}%", quick.same_bar_pct()),
            rf.buckets.get(IntervalBucket::SameBar).to_string(),
        ),
        row(
            "Next-bar reentry (<=15 min)",
            quick.adjacent_bar.to_string(),
            format!("{:.2}%", quick.adjacent_bar_pct()),
            rf.buckets.get(IntervalBucket::Adjacent).to_string(),
        ),
        row(
            "Reentry within 1 hour",
            bt.within_hour().to_string(),
            format!("{:.2}%", pct(bt.within_hour(), valid)),
            rf.within_hour().to_string(),
        ),
        row(
            "Reentry within 1 day",
            bt.buckets.at_most(IntervalBucket::WithinDay).to_string(),
            format!(
                "{:.2}%",
                pct(bt.buckets.at_most(IntervalBucket::WithinDay), valid)
            ),
            rf.buckets.at_most(IntervalBucket::WithinDay).to_string(),
        ),
        row(
            "Zero-holding trades",
            zero_holding.to_string(),
            format!("{:.2}%", pct(zero_holding, ctx.trades().len())),
            "-".to_string(),
        ),
        row(
            "Minimum reentry interval",
            stat_label(bt.stats.as_ref(), |s| s.min),
            "-".to_string(),
            stat_label(rf.stats.as_ref(), |s| s.min),
        ),
        row(
            "Median reentry interval",
            stat_label(bt.stats.as_ref(), |s| s.median),
            "-".to_string(),
            stat_label(rf.stats.as_ref(), |s| s.median),
        ),
    ]
}
