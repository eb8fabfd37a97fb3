//! Reentry Runner: analysis stages, reporting, charts and run orchestration.
//!
//! This crate builds on `reentry-core` to provide:
//! - TOML configuration with defaults for every path and threshold
//! - The analysis stages (pattern, violations, visualize, report,
//!   inspect-export), each printing to stdout and writing its files
//! - CSV, JSON and Markdown output
//! - SVG/PNG charts
//! - The full-pipeline orchestrator that runs stages as child processes

pub mod charts;
pub mod config;
pub mod context;
pub mod orchestrator;
pub mod reporting;
pub mod stages;

pub use charts::ChartFormat;
pub use config::{AnalysisConfig, ConfigError};
pub use context::{AnalysisContext, ReferenceSource};
pub use orchestrator::{
    check_outputs, expected_outputs, run_pipeline, run_step, OutputCheck, PipelineReport,
    PipelineStep, StepOutcome, StepResult,
};
pub use reporting::{AnalysisSummary, ReportInputs};
pub use stages::Stage;

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_is_send_sync() {
        assert_send::<AnalysisConfig>();
        assert_sync::<AnalysisConfig>();
        assert_send::<ConfigError>();
        assert_sync::<ConfigError>();
    }

    #[test]
    fn context_is_send_sync() {
        assert_send::<AnalysisContext>();
        assert_sync::<AnalysisContext>();
    }

    #[test]
    fn pipeline_types_are_send_sync() {
        assert_send::<PipelineStep>();
        assert_sync::<PipelineStep>();
        assert_send::<PipelineReport>();
        assert_sync::<PipelineReport>();
    }

    #[test]
    fn summary_is_send_sync() {
        assert_send::<AnalysisSummary>();
        assert_sync::<AnalysisSummary>();
    }
}
