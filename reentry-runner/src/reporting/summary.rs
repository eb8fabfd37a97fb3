//! Machine-readable run summary (JSON) written by the pattern stage.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use reentry_core::analysis::{
    Comparison, CooldownAdvice, CooldownImpact, QuickReentrySummary,
};

pub const ANALYSIS_SUMMARY: &str = "analysis_summary.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub generated_at: NaiveDateTime,
    pub dataset_hash: String,
    pub reference_label: String,
    pub quick: QuickReentrySummary,
    pub comparison: Comparison,
    pub backtest_overlaps: usize,
    pub reference_overlaps: usize,
    pub cooldown_advice: Option<CooldownAdvice>,
    pub cooldown_impacts: Vec<CooldownImpact>,
    /// `None` when the signal log was missing.
    pub signal_count: Option<usize>,
}

pub fn write_summary(path: &Path, summary: &AnalysisSummary) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json =
        serde_json::to_string_pretty(summary).context("failed to serialize analysis summary")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write summary to {}", path.display()))?;
    info!(path = %path.display(), "saved");
    Ok(())
}
