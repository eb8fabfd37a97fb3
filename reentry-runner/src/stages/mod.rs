//! Analysis stages. Each one loads its inputs from the config, prints its
//! findings to stdout and writes its output files.

pub mod inspect_export;
pub mod pattern;
pub mod report;
pub mod violations;
pub mod visualize;

use std::path::PathBuf;

use anyhow::Result;

use crate::config::AnalysisConfig;

/// Stages in the order the full pipeline runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pattern,
    Violations,
    Visualize,
    Report,
}

impl Stage {
    pub const PIPELINE: [Stage; 4] = [
        Stage::Pattern,
        Stage::Violations,
        Stage::Visualize,
        Stage::Report,
    ];

    /// CLI subcommand that runs this stage.
    pub fn command(self) -> &'static str {
        match self {
            Stage::Pattern => "pattern",
            Stage::Violations => "violations",
            Stage::Visualize => "visualize",
            Stage::Report => "report",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Stage::Pattern => "quick reentry statistics",
            Stage::Violations => "violation case analysis",
            Stage::Visualize => "interval charts",
            Stage::Report => "final report",
        }
    }

    pub fn run(self, config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
        match self {
            Stage::Pattern => pattern::run(config),
            Stage::Violations => violations::run(config),
            Stage::Visualize => visualize::run(config),
            Stage::Report => report::run(config),
        }
    }
}
