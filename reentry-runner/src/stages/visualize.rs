//! `visualize` stage: the three interval charts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::charts::{
    self, chart_path, ChartFormat, INTERVAL_DISTRIBUTION, REFERENCE_VS_BACKTEST, TRADE_TIMELINE,
};
use crate::config::AnalysisConfig;
use crate::context::AnalysisContext;
use crate::reporting::console::print_banner;

pub fn run(config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    let ctx = AnalysisContext::load(config)?;
    run_with(config, &ctx, ChartFormat::for_build())
}

pub fn run_with(
    config: &AnalysisConfig,
    ctx: &AnalysisContext,
    format: ChartFormat,
) -> Result<Vec<PathBuf>> {
    print_banner("Reentry interval charts");
    let out = &config.paths.output_dir;
    let minutes = ctx.minutes();
    let mut written = Vec::new();

    let path = chart_path(out, INTERVAL_DISTRIBUTION, format);
    charts::distribution::render(&path, format, &minutes)
        .with_context(|| format!("failed to render {}", path.display()))?;
    println!("saved {}", path.display());
    written.push(path);

    let path = chart_path(out, TRADE_TIMELINE, format);
    charts::timeline::render(&path, format, ctx.trades(), &ctx.intervals)
        .with_context(|| format!("failed to render {}", path.display()))?;
    println!("saved {}", path.display());
    written.push(path);

    let path = chart_path(out, REFERENCE_VS_BACKTEST, format);
    charts::comparison::render(
        &path,
        format,
        &ctx.reference_label,
        &ctx.reference_minutes(),
        &minutes,
    )
    .with_context(|| format!("failed to render {}", path.display()))?;
    println!("saved {}", path.display());
    written.push(path);

    info!(charts = written.len(), format = format.extension(), "charts rendered");
    Ok(written)
}
