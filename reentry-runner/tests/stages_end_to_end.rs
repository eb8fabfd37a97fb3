//! Integration tests for the analysis stages: a small trade export in a
//! temp directory, every stage run against it, and the outputs checked.

use std::path::Path;

use tempfile::TempDir;

use reentry_runner::charts::ChartFormat;
use reentry_runner::orchestrator::{check_outputs, expected_outputs};
use reentry_runner::reporting::csv_export::{
    QUICK_REENTRY_SUMMARY, TRADE_INTERVALS, VIOLATION_SUMMARY, ZERO_HOLDING_CASES,
};
use reentry_runner::reporting::ANALYSIS_SUMMARY;
use reentry_runner::{AnalysisConfig, AnalysisSummary, Stage};

const TRADES: &str = "\
TradeId,EntryTime,EntryPrice,ExitTime,ExitPrice,ExitReason,HoldingBars,PnLPercent,PnLAmount,TotalFee
1,2024-01-02 09:00,100.0,2024-01-02 10:00,101.0,TP,4,1.00%,10,0.5
2,2024-01-02 10:05,101.0,2024-01-02 11:00,100.0,SL,4,-0.99%,-10,0.5
3,2024-01-02 11:00,100.0,2024-01-02 11:00,100.5,SL,0,0.50%,5,0.5
4,2024-01-02 11:10,100.5,2024-01-02 14:00,102.0,TP,12,1.49%,15,0.5
5,2024-01-03 09:00,102.0,2024-01-03 12:00,101.0,SL,12,-0.98%,-10,0.5
6,2024-01-05 09:00,101.0,2024-01-05 15:00,104.0,TP,24,2.97%,30,0.5
7,2024-02-01 09:00,104.0,2024-02-01 09:30,103.0,SL,2,-0.96%,-10,0.5
8,2024-02-01 09:40,103.0,2024-02-02 09:00,106.0,TP,90,2.91%,30,0.5
";

fn workspace() -> (TempDir, AnalysisConfig) {
    let dir = TempDir::new().unwrap();
    let trades = dir.path().join("trades.csv");
    std::fs::write(&trades, TRADES).unwrap();

    let mut config = AnalysisConfig::default();
    config.paths.trades_csv = trades;
    config.paths.signals_csv = dir.path().join("signals.csv");
    config.paths.output_dir = dir.path().join("outputs");
    config.paths.reports_dir = dir.path().join("reports");
    config.paths.reference_export = dir.path().join("missing.xlsx");
    config.paths.reference_export_csv = dir.path().join("reference.csv");
    (dir, config)
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn pattern_writes_csvs_and_summary_without_signals() {
    let (_dir, config) = workspace();
    let written = Stage::Pattern.run(&config).unwrap();
    assert!(written.iter().all(|p| p.exists()));

    let out = &config.paths.output_dir;
    let intervals = read(&out.join(TRADE_INTERVALS));
    // 8 trades give 7 intervals plus the header.
    assert_eq!(intervals.trim_start_matches('\u{FEFF}').lines().count(), 8);
    assert!(out.join(QUICK_REENTRY_SUMMARY).exists());

    let summary: AnalysisSummary =
        serde_json::from_str(&read(&out.join(ANALYSIS_SUMMARY))).unwrap();
    assert_eq!(summary.signal_count, None);
    assert_eq!(summary.reference_label, "TradingView");
    assert_eq!(summary.comparison.backtest.trade_count, 8);
}

#[test]
fn pattern_counts_signals_when_present() {
    let (_dir, config) = workspace();
    std::fs::write(
        &config.paths.signals_csv,
        "Timestamp,Price\n2024-01-02 10:00,101\n2024-01-02 11:00,100\n",
    )
    .unwrap();
    Stage::Pattern.run(&config).unwrap();

    let summary: AnalysisSummary =
        serde_json::from_str(&read(&config.paths.output_dir.join(ANALYSIS_SUMMARY))).unwrap();
    assert_eq!(summary.signal_count, Some(2));
}

#[test]
fn violations_writes_zero_holding_cases() {
    let (_dir, config) = workspace();
    Stage::Violations.run(&config).unwrap();

    let out = &config.paths.output_dir;
    let zero = read(&out.join(ZERO_HOLDING_CASES));
    assert_eq!(zero.trim_start_matches('\u{FEFF}').lines().count(), 2);
    assert!(out.join(VIOLATION_SUMMARY).exists());
}

#[test]
fn full_sequence_leaves_every_expected_output() {
    let (_dir, config) = workspace();
    for stage in Stage::PIPELINE {
        stage.run(&config).unwrap();
    }

    let checks = check_outputs(&expected_outputs(&config, ChartFormat::for_build()));
    let missing: Vec<_> = checks.iter().filter(|c| !c.exists()).collect();
    assert!(missing.is_empty(), "missing outputs: {missing:?}");

    let report = read(&config.paths.reports_dir.join("quick_reentry_report.md"));
    assert!(report.contains("TradingView"));
    assert_eq!(
        report,
        read(&config.paths.reports_dir.join("quick_reentry_report.txt"))
    );
}

#[test]
fn missing_trade_file_fails_the_stage() {
    let (_dir, mut config) = workspace();
    config.paths.trades_csv = config.paths.output_dir.join("nope.csv");
    let err = Stage::Pattern.run(&config).unwrap_err();
    assert!(format!("{err:#}").contains("nope.csv"));
}

#[test]
fn inspect_export_fails_on_missing_workbook() {
    let (_dir, config) = workspace();
    assert!(reentry_runner::stages::inspect_export::run(&config).is_err());
    assert!(!config.paths.reference_export_csv.exists());
}
