//! Reentry CLI: quick-reentry analysis of a backtest trade export.
//!
//! Commands:
//! - `pattern`: quick-reentry statistics, reference comparison, cooldown advice
//! - `violations`: zero-holding cases, fastest reentries, busy days
//! - `visualize`: interval distribution, timeline and comparison charts
//! - `report`: Markdown report plus a plain-text copy
//! - `inspect-export`: read the reference platform's spreadsheet export
//! - `full`: run the four analysis stages as child processes and check outputs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use reentry_runner::orchestrator::{
    check_outputs, expected_outputs, print_output_checks, print_pipeline_summary, run_pipeline,
    PipelineStep,
};
use reentry_runner::reporting::console::print_banner;
use reentry_runner::stages::{inspect_export, Stage};
use reentry_runner::{AnalysisConfig, ChartFormat};

#[derive(Parser)]
#[command(
    name = "reentry",
    version,
    about = "Quick reentry analysis of backtest trades against a reference system"
)]
struct Cli {
    /// TOML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error). Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quick reentry statistics and interval distribution.
    Pattern,
    /// Rule violation case analysis.
    Violations,
    /// Render the interval charts as SVG (PNG when built with the `png` feature).
    Visualize,
    /// Generate the final Markdown report.
    Report,
    /// Inspect the reference platform's spreadsheet export.
    InspectExport,
    /// Run pattern, violations, visualize and report, then check outputs.
    Full,
}

fn init_logging(level: Option<&str>) {
    let filter = level
        .and_then(|l| EnvFilter::try_new(l).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let config = AnalysisConfig::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(p) => format!("failed to load config {}", p.display()),
        None => "invalid default config".to_string(),
    })?;

    match cli.command {
        Commands::Pattern => run_stage(Stage::Pattern, &config),
        Commands::Violations => run_stage(Stage::Violations, &config),
        Commands::Visualize => run_stage(Stage::Visualize, &config),
        Commands::Report => run_stage(Stage::Report, &config),
        Commands::InspectExport => {
            inspect_export::run(&config)?;
            Ok(())
        }
        Commands::Full => {
            run_full(
                &config,
                cli.config.as_deref(),
                cli.log_level.as_deref(),
            );
            Ok(())
        }
    }
}

fn run_stage(stage: Stage, config: &AnalysisConfig) -> Result<()> {
    let written = stage.run(config)?;
    info!(stage = stage.command(), files = written.len(), "stage complete");
    Ok(())
}

/// Run every analysis stage in its own process. Step failures are reported,
/// never returned.
fn run_full(config: &AnalysisConfig, config_path: Option<&Path>, log_level: Option<&str>) {
    print_banner("Full quick reentry analysis");

    let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("reentry"));
    let steps: Vec<PipelineStep> = Stage::PIPELINE
        .iter()
        .map(|&stage| PipelineStep::for_stage(&exe, stage, config_path, log_level))
        .collect();

    let report = run_pipeline(&steps, config.orchestrator.timeout());
    print_pipeline_summary(&report);

    let checks = check_outputs(&expected_outputs(config, ChartFormat::for_build()));
    print_output_checks(&checks);

    print_banner("Full analysis finished");
    println!("\nNext steps:");
    println!(
        "1. Read {} for the overall picture",
        config
            .paths
            .output_dir
            .join(reentry_runner::reporting::csv_export::QUICK_REENTRY_SUMMARY)
            .display()
    );
    println!(
        "2. Read {} for the individual problems",
        config
            .paths
            .output_dir
            .join(reentry_runner::reporting::csv_export::VIOLATION_SUMMARY)
            .display()
    );
    println!("3. Open the charts to see the trading pattern");
    println!("4. Tune the strategy (cooldown, daily trade cap) from the findings");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "reentry",
            "pattern",
            "--config",
            "a.toml",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Pattern));
        assert_eq!(cli.config, Some(PathBuf::from("a.toml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn visualize_help_names_chart_format() {
        let cmd = Cli::command();
        let about = cmd
            .find_subcommand("visualize")
            .and_then(|c| c.get_about())
            .map(|a| a.to_string())
            .unwrap();
        assert!(about.contains("SVG"));
        assert!(about.contains("png"));
    }

    #[test]
    fn inspect_export_is_kebab_case() {
        let cli = Cli::try_parse_from(["reentry", "inspect-export"]).unwrap();
        assert!(matches!(cli.command, Commands::InspectExport));
    }
}
