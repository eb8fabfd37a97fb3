//! `violations` stage: zero-holding cases, fastest reentries, high-frequency
//! days, reference validation and the violation summary.

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use reentry_core::analysis::{
    fastest_first, high_frequency_days, pct, quick_reentry_cases, trades_by_day,
    zero_holding_cases, HighFrequencyDay, IntervalStats, ReentryCase, ViolationInputs,
    ViolationSummary, ZeroHoldingCase, HOUR_MINUTES, TOP_CASES,
};
use reentry_core::domain::TradeRecord;

use crate::config::AnalysisConfig;
use crate::context::AnalysisContext;
use crate::reporting::console::{
    align_numbers, minutes_days_label, minutes_label, print_banner, print_divider, table,
};
use crate::reporting::csv_export::{
    self, export_trades_csv, export_trades_with_interval_csv, export_violation_summary_csv,
};
use crate::reporting::write_csv;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn run(config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    let ctx = AnalysisContext::load(config)?;
    run_with(config, &ctx)
}

pub fn run_with(config: &AnalysisConfig, ctx: &AnalysisContext) -> Result<Vec<PathBuf>> {
    print_banner("Rule violation case analysis");
    let trades = ctx.trades();
    let total = trades.len();

    // ── Type 1: zero holding ──
    print_banner("Case type 1: zero-holding trades (entry and exit in one bar)");
    let zero = zero_holding_cases(trades);
    println!(
        "\n{} zero-holding trades, {:.2}% of all trades",
        zero.len(),
        pct(zero.len(), total)
    );
    for case in &zero {
        print_zero_holding_case(case);
    }

    // ── Type 2: quick reentries ──
    print_banner("Case type 2: quick reentries (interval <= 15 min)");
    let mut quick = quick_reentry_cases(trades, &ctx.intervals);
    fastest_first(&mut quick);
    println!(
        "\n{} quick reentries, {:.2}% of all trades",
        quick.len(),
        pct(quick.len(), total)
    );
    if !quick.is_empty() {
        println!("\nThe {} fastest:", quick.len().min(TOP_CASES));
    }
    for (i, case) in quick.iter().take(TOP_CASES).enumerate() {
        print_reentry_case(i + 1, case);
    }

    // ── Type 3: high-frequency days ──
    let min_trades = config.thresholds.high_frequency_day_min_trades;
    print_banner(&format!(
        "Case type 3: high-frequency days ({min_trades}+ entries)"
    ));
    let days = high_frequency_days(trades, min_trades);
    let trading_days = trades_by_day(trades).len();
    println!("\n{} days with {min_trades} or more trades", days.len());
    for (i, day) in days.iter().take(TOP_CASES).enumerate() {
        print_day(i + 1, day);
    }

    // ── Type 4: reference validation ──
    let label = ctx.reference_label.as_str();
    print_banner(&format!("Case type 4: {label} rule validation"));
    for iv in &ctx.reference_intervals {
        println!("\nTrade #{} -> #{}:", iv.trade_id, iv.next_trade_id);
        println!("  exit:       {}", iv.exit_time.format(TIME_FORMAT));
        println!("  next entry: {}", iv.next_entry_time.format(TIME_FORMAT));
        println!("  interval:   {}", minutes_days_label(iv.minutes));
    }
    if let Some(s) = IntervalStats::from_minutes(&ctx.reference_minutes()) {
        println!("\n{label} validation:");
        println!("  minimum interval: {}", minutes_label(s.min));
        println!("  mean interval:    {}", minutes_days_label(s.mean));
        println!("  maximum interval: {}", minutes_days_label(s.max));
    }
    let within_hour: Vec<_> = ctx
        .reference_intervals
        .iter()
        .filter(|iv| iv.minutes <= HOUR_MINUTES)
        .collect();
    println!("\nReentries within 1 hour: {}", within_hour.len());
    for iv in within_hour {
        println!("  #{} -> #{}: {}", iv.trade_id, iv.next_trade_id, minutes_label(iv.minutes));
    }

    // ── Summary ──
    print_banner("Violation summary");
    let summary = ViolationSummary::new(ViolationInputs {
        total_trades: total,
        zero_holding: zero.len(),
        intervals: &ctx.intervals,
        high_frequency_days: days.len(),
        trading_days,
        zero_holding_high_above: config.thresholds.zero_holding_high_severity_above,
    });
    let mut t = table(["Violation", "Cases", "Share", "Severity", "Recommended action"]);
    for row in &summary.rows {
        t.add_row(vec![
            row.kind.label().to_string(),
            row.count.to_string(),
            format!("{:.2}%", row.share_pct),
            row.severity.to_string(),
            row.kind.action().to_string(),
        ]);
    }
    align_numbers(&mut t);
    println!("{t}");

    // ── Save ──
    let out = &config.paths.output_dir;
    let mut written = Vec::new();

    let path = out.join(csv_export::VIOLATION_SUMMARY);
    write_csv(&path, &export_violation_summary_csv(&summary)?)?;
    written.push(path);

    if !zero.is_empty() {
        let path = out.join(csv_export::ZERO_HOLDING_CASES);
        write_csv(&path, &export_trades_csv(zero.iter().map(|c| &c.trade))?)?;
        written.push(path);
    }
    if !quick.is_empty() {
        let path = out.join(csv_export::QUICK_REENTRY_TRADES);
        write_csv(&path, &export_trades_with_interval_csv(&quick)?)?;
        written.push(path);
    }

    for p in &written {
        println!("saved {}", p.display());
    }
    info!(files = written.len(), "violation case analysis complete");
    Ok(written)
}

fn print_zero_holding_case(case: &ZeroHoldingCase) {
    let t = &case.trade;
    print_divider();
    println!("\n[Case {}] trade #{}", case.index + 1, t.trade_id);
    print_trade_basics(t);
    println!("  price change: {:+.2}%", case.price_change_pct);

    if let Some(prev) = &case.previous {
        println!("\nPrevious trade:");
        println!("  #{} exited {} ({})", prev.trade_id, prev.time.format(TIME_FORMAT), prev.exit_reason);
        println!("  interval: {:.2} min", prev.interval_minutes);
    }
    if let Some(next) = &case.next {
        println!("\nNext trade:");
        println!("  #{} entered {}", next.trade_id, next.time.format(TIME_FORMAT));
        println!("  interval: {:.2} min", next.interval_minutes);
    }
    if !case.notes.is_empty() {
        println!("\nLikely cause:");
        for note in &case.notes {
            println!("  - {}", note.describe());
        }
    }
}

fn print_trade_basics(t: &TradeRecord) {
    println!("  entry:  {} @ {:.10}", t.entry_time.format(TIME_FORMAT), t.entry_price);
    println!("  exit:   {} @ {:.10}", t.exit_time.format(TIME_FORMAT), t.exit_price);
    println!("  reason: {}", t.exit_reason);
    println!("  PnL:    {:.2}% ({:.2})", t.pnl_percent, t.pnl_amount);
    println!("  fee:    {:.2}", t.total_fee);
    println!(
        "  holding: {} bars ({:.0} min)",
        t.holding_bars,
        t.holding_minutes()
    );
}

fn print_reentry_case(rank: usize, case: &ReentryCase) {
    let exit = &case.exit_trade;
    let next = &case.reentry_trade;
    print_divider();
    println!("\n[Case {rank}] trade #{} -> #{}", exit.trade_id, next.trade_id);
    println!("\nExit:");
    println!("  time:   {}", exit.exit_time.format(TIME_FORMAT));
    println!("  price:  {:.10}", exit.exit_price);
    println!("  reason: {}", exit.exit_reason);
    println!("  PnL:    {:+.2}%", exit.pnl_percent);
    println!("\nReentry:");
    println!("  time:     {}", next.entry_time.format(TIME_FORMAT));
    println!("  price:    {:.10}", next.entry_price);
    println!("  interval: {:.2} min", case.interval_minutes);
    println!("  price change: {:+.2}%", case.price_change_pct);
    if !case.notes.is_empty() {
        println!("\nPattern:");
        for note in &case.notes {
            println!("  - {}", note.describe());
        }
    }
}

fn print_day(rank: usize, day: &HighFrequencyDay) {
    print_divider();
    println!("\n[Busy day {rank}] {}: {} trades", day.date, day.count());
    for (j, t) in day.trades.iter().enumerate() {
        println!("\n  trade {} (#{}):", j + 1, t.trade_id);
        println!("    entry: {} @ {:.10}", t.entry_time.format("%H:%M"), t.entry_price);
        println!("    exit:  {} @ {:.10}", t.exit_time.format("%H:%M"), t.exit_price);
        println!("    reason: {}  PnL: {:+.2}%  bars: {}", t.exit_reason, t.pnl_percent, t.holding_bars);
    }
    println!("\n  day total: {:+.2}% ({:+.2})", day.pnl_percent_sum, day.pnl_amount_sum);
    println!("  wins {}  losses {}  win rate {:.1}%", day.wins, day.losses, day.win_rate_pct());
    if let Some((min, mean, max)) = day.interval_range() {
        println!("  intervals: min {min:.1} / mean {mean:.1} / max {max:.1} min");
    }
}
