//! CSV export of every table the stages persist.
//!
//! Files are UTF-8 with a byte-order mark so spreadsheet tools pick the
//! right encoding. Builders return the CSV text; [`write_csv`] adds the BOM
//! and writes it.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use reentry_core::analysis::{ReentryCase, ReentryInterval, ViolationSummary};
use reentry_core::domain::TradeRecord;

const UTF8_BOM: &str = "\u{FEFF}";

pub const QUICK_REENTRY_CASES: &str = "quick_reentry_cases.csv";
pub const TRADE_INTERVALS: &str = "trade_intervals.csv";
pub const QUICK_REENTRY_SUMMARY: &str = "quick_reentry_summary.csv";
pub const VIOLATION_SUMMARY: &str = "violation_summary.csv";
pub const ZERO_HOLDING_CASES: &str = "zero_holding_cases.csv";
pub const QUICK_REENTRY_TRADES: &str = "quick_reentry_trades.csv";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write `content` with a UTF-8 BOM, creating parent directories.
pub fn write_csv(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut bytes = String::with_capacity(content.len() + UTF8_BOM.len());
    bytes.push_str(UTF8_BOM);
    bytes.push_str(content);
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "saved");
    Ok(())
}

/// Exit trade and reentry trade side by side, one row per quick reentry.
pub fn export_reentry_cases_csv(cases: &[ReentryCase]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "ExitTradeId",
        "ExitTime",
        "ExitPrice",
        "ExitReason",
        "ExitPnL",
        "ReentryTradeId",
        "ReentryTime",
        "ReentryPrice",
        "IntervalMinutes",
        "HoldingBarsBeforeExit",
    ])?;
    for c in cases {
        let exit = &c.exit_trade;
        let next = &c.reentry_trade;
        wtr.write_record([
            exit.trade_id.to_string(),
            exit.exit_time.format(TIME_FORMAT).to_string(),
            format!("{:.10}", exit.exit_price),
            exit.exit_reason.to_string(),
            format!("{:.2}", exit.pnl_percent),
            next.trade_id.to_string(),
            next.entry_time.format(TIME_FORMAT).to_string(),
            format!("{:.10}", next.entry_price),
            format!("{:.2}", c.interval_minutes),
            exit.holding_bars.to_string(),
        ])?;
    }
    finish(wtr)
}

/// `TradeId, ExitTime, ReentryInterval` for every trade that has a successor.
pub fn export_intervals_csv(intervals: &[ReentryInterval]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["TradeId", "ExitTime", "ReentryInterval"])?;
    for iv in intervals {
        wtr.write_record([
            iv.trade_id.to_string(),
            iv.exit_time.format(TIME_FORMAT).to_string(),
            format!("{:.2}", iv.minutes),
        ])?;
    }
    finish(wtr)
}

/// One row of the quick-reentry summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub metric: String,
    pub backtest: String,
    pub backtest_share: String,
    pub reference: String,
}

pub fn export_summary_csv(rows: &[SummaryRow], reference_label: &str) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "Metric",
        "Backtest",
        "BacktestShare",
        format!("{reference_label}Reference").as_str(),
    ])?;
    for r in rows {
        wtr.write_record([&r.metric, &r.backtest, &r.backtest_share, &r.reference])?;
    }
    finish(wtr)
}

pub fn export_violation_summary_csv(summary: &ViolationSummary) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["ViolationType", "Cases", "Share", "Severity", "RecommendedAction"])?;
    for row in &summary.rows {
        wtr.write_record([
            row.kind.label().to_string(),
            row.count.to_string(),
            format!("{:.2}%", row.share_pct),
            row.severity.to_string(),
            row.kind.action().to_string(),
        ])?;
    }
    finish(wtr)
}

const TRADE_HEADER: [&str; 10] = [
    "TradeId",
    "EntryTime",
    "EntryPrice",
    "ExitTime",
    "ExitPrice",
    "ExitReason",
    "HoldingBars",
    "PnLPercent",
    "PnLAmount",
    "TotalFee",
];

fn trade_fields(t: &TradeRecord) -> Vec<String> {
    vec![
        t.trade_id.to_string(),
        t.entry_time.format(TIME_FORMAT).to_string(),
        format!("{:.10}", t.entry_price),
        t.exit_time.format(TIME_FORMAT).to_string(),
        format!("{:.10}", t.exit_price),
        t.exit_reason.to_string(),
        t.holding_bars.to_string(),
        format!("{:.2}%", t.pnl_percent),
        format!("{:.2}", t.pnl_amount),
        format!("{:.2}", t.total_fee),
    ]
}

/// Full trade rows in the same layout as the input export.
pub fn export_trades_csv<'a>(trades: impl IntoIterator<Item = &'a TradeRecord>) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(TRADE_HEADER)?;
    for t in trades {
        wtr.write_record(trade_fields(t))?;
    }
    finish(wtr)
}

/// Full trade rows plus the interval to the next entry.
pub fn export_trades_with_interval_csv(cases: &[ReentryCase]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let mut header: Vec<&str> = TRADE_HEADER.to_vec();
    header.push("ReentryInterval");
    wtr.write_record(&header)?;
    for c in cases {
        let mut fields = trade_fields(&c.exit_trade);
        fields.push(format!("{:.2}", c.interval_minutes));
        wtr.write_record(&fields)?;
    }
    finish(wtr)
}
