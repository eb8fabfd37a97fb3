//! End-to-end runs of the `reentry` binary against a temp workspace.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

const TRADES: &str = "\
TradeId,EntryTime,EntryPrice,ExitTime,ExitPrice,ExitReason,HoldingBars,PnLPercent,PnLAmount,TotalFee
1,2024-03-04 09:00,50.0,2024-03-04 10:00,51.0,TP,4,2.00%,20,0.3
2,2024-03-04 10:10,51.0,2024-03-04 10:10,50.5,SL,0,-0.98%,-10,0.3
3,2024-03-04 10:20,50.5,2024-03-05 10:00,52.0,TP,90,2.97%,30,0.3
4,2024-03-08 09:00,52.0,2024-03-08 15:00,51.0,SL,24,-1.92%,-20,0.3
";

fn reentry() -> Command {
    Command::new(env!("CARGO_BIN_EXE_reentry"))
}

fn write_config(dir: &Path) -> std::path::PathBuf {
    std::fs::write(dir.join("trades.csv"), TRADES).unwrap();
    let config = format!(
        r#"
[paths]
trades_csv = "{root}/trades.csv"
signals_csv = "{root}/signals.csv"
output_dir = "{root}/outputs"
reports_dir = "{root}/reports"
reference_export = "{root}/export.xlsx"
reference_export_csv = "{root}/export.csv"

[orchestrator]
timeout_secs = 120
"#,
        root = dir.display().to_string().replace('\\', "/")
    );
    let path = dir.join("reentry.toml");
    std::fs::write(&path, config).unwrap();
    path
}

#[test]
fn full_runs_every_stage() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    let output = reentry()
        .args(["--config", config.to_str().unwrap(), "full"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("4/4 steps succeeded"), "{stdout}");
    assert!(dir.path().join("reports/quick_reentry_report.md").exists());
    assert!(dir.path().join("outputs/trade_intervals.csv").exists());
}

#[test]
fn full_reports_failures_but_exits_zero() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    std::fs::remove_file(dir.path().join("trades.csv")).unwrap();

    let output = reentry()
        .args(["--config", config.to_str().unwrap(), "full"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0/4 steps succeeded"), "{stdout}");
}

#[test]
fn stage_failure_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    let output = reentry()
        .args(["--config", config.to_str().unwrap(), "inspect-export"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[orchestrator]\ntimeout_secs = 0\n").unwrap();

    let output = reentry()
        .args(["--config", path.to_str().unwrap(), "pattern"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("timeout_secs"), "{stderr}");
}
