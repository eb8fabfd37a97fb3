//! `report` stage: the Markdown report and its plain-text copy.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use reentry_core::analysis::{high_frequency_days, trades_by_day};

use crate::charts::{chart_file_name, ChartFormat, CHART_STEMS};
use crate::config::AnalysisConfig;
use crate::context::AnalysisContext;
use crate::reporting::console::print_banner;
use crate::reporting::{render_report, ReportInputs};

pub const REPORT_MD: &str = "quick_reentry_report.md";
pub const REPORT_TXT: &str = "quick_reentry_report.txt";

pub fn run(config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    let ctx = AnalysisContext::load(config)?;
    run_with(config, &ctx)
}

pub fn run_with(config: &AnalysisConfig, ctx: &AnalysisContext) -> Result<Vec<PathBuf>> {
    let trades = ctx.trades();
    let min_trades = config.thresholds.high_frequency_day_min_trades;
    let days = high_frequency_days(trades, min_trades);
    let max_daily_trades = trades_by_day(trades)
        .values()
        .map(Vec::len)
        .max()
        .unwrap_or(0);
    let format = ChartFormat::for_build();
    let chart_files: Vec<String> = CHART_STEMS
        .iter()
        .map(|stem| chart_file_name(stem, format))
        .collect();

    let report = render_report(&ReportInputs {
        generated_at: Local::now().naive_local(),
        dataset_hash: &ctx.table.dataset_hash,
        reference_label: &ctx.reference_label,
        trades,
        intervals: &ctx.intervals,
        reference: &ctx.reference,
        reference_intervals: &ctx.reference_intervals,
        high_frequency_days: &days,
        high_frequency_min_trades: min_trades,
        max_daily_trades,
        chart_files: &chart_files,
    });

    let dir = &config.paths.reports_dir;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let mut written = Vec::new();
    for name in [REPORT_MD, REPORT_TXT] {
        let path = dir.join(name);
        std::fs::write(&path, &report)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "saved");
        written.push(path);
    }

    print_banner("Final report generated");
    println!("\nfile: {}", written[0].display());
    println!("size: {} characters", report.chars().count());
    println!("\nSections:");
    for section in [
        "Executive summary",
        "Quick reentry statistics",
        "Violation cases",
        "Reference comparison",
        "Cooldown recommendations",
        "Implementation roadmap",
    ] {
        println!("- {section}");
    }
    println!("\nSaved as Markdown and plain text.");
    Ok(written)
}
