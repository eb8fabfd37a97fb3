//! Inputs every analysis stage starts from: the backtest trade table, the
//! reference trade list, and the intervals of both.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use reentry_core::analysis::{compute_intervals, minutes_of, ReentryInterval};
use reentry_core::data::{load_reference_trades, load_trades, TradeTable};
use reentry_core::domain::{ReferenceTrade, TradeRecord};

use crate::config::AnalysisConfig;

/// Where the reference trades came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceSource {
    Embedded,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub table: TradeTable,
    pub intervals: Vec<ReentryInterval>,
    pub reference: Vec<ReferenceTrade>,
    pub reference_intervals: Vec<ReentryInterval>,
    pub reference_source: ReferenceSource,
    pub reference_label: String,
}

impl AnalysisContext {
    /// Load the trade table and reference list named by `config`.
    pub fn load(config: &AnalysisConfig) -> Result<Self> {
        let table = load_trades(&config.paths.trades_csv).with_context(|| {
            format!(
                "failed to load trade table {}",
                config.paths.trades_csv.display()
            )
        })?;
        info!(
            path = %config.paths.trades_csv.display(),
            trades = table.len(),
            "trade table loaded"
        );

        let (reference, source) = match &config.paths.reference_trades {
            Some(path) => {
                let trades = load_reference_trades(path).with_context(|| {
                    format!("failed to load reference trades {}", path.display())
                })?;
                (trades, ReferenceSource::File(path.clone()))
            }
            None => (ReferenceTrade::canonical(), ReferenceSource::Embedded),
        };

        let mut ctx = Self::from_parts(table, reference, &config.reference.label);
        ctx.reference_source = source;
        Ok(ctx)
    }

    pub fn from_parts(table: TradeTable, reference: Vec<ReferenceTrade>, label: &str) -> Self {
        let intervals = compute_intervals(&table.trades);
        let reference_intervals = compute_intervals(&reference);
        Self {
            table,
            intervals,
            reference,
            reference_intervals,
            reference_source: ReferenceSource::Embedded,
            reference_label: label.to_string(),
        }
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.table.trades
    }

    pub fn minutes(&self) -> Vec<f64> {
        minutes_of(&self.intervals)
    }

    pub fn reference_minutes(&self) -> Vec<f64> {
        minutes_of(&self.reference_intervals)
    }
}
