//! Full-pipeline orchestration.
//!
//! Each stage runs as a child process (normally the `reentry` binary itself
//! with a stage subcommand), one at a time. Output is captured, a timeout is
//! enforced, and a failed step never stops the steps after it.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::charts::{chart_path, ChartFormat, CHART_STEMS};
use crate::config::AnalysisConfig;
use crate::reporting::console::{print_banner, rule};
use crate::reporting::csv_export;
use crate::stages::report::{REPORT_MD, REPORT_TXT};
use crate::stages::Stage;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One program invocation in the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStep {
    pub name: String,
    pub description: String,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl PipelineStep {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        program: impl Into<PathBuf>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `exe [--config <path>] [--log-level <level>] <stage>`.
    pub fn for_stage(
        exe: &Path,
        stage: Stage,
        config: Option<&Path>,
        log_level: Option<&str>,
    ) -> Self {
        let mut args = Vec::new();
        if let Some(path) = config {
            args.push("--config".to_string());
            args.push(path.display().to_string());
        }
        if let Some(level) = log_level {
            args.push("--log-level".to_string());
            args.push(level.to_string());
        }
        args.push(stage.command().to_string());
        Self::new(stage.command(), stage.description(), exe, args)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded,
    /// Non-zero exit; `None` when the process was ended by a signal.
    Failed { code: Option<i32> },
    TimedOut,
    LaunchFailed { error: String },
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }
}

impl std::fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepOutcome::Succeeded => write!(f, "succeeded"),
            StepOutcome::Failed { code: Some(c) } => write!(f, "failed (exit code {c})"),
            StepOutcome::Failed { code: None } => write!(f, "failed (terminated by signal)"),
            StepOutcome::TimedOut => write!(f, "timed out"),
            StepOutcome::LaunchFailed { error } => write!(f, "could not start: {error}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepResult {
    pub name: String,
    pub description: String,
    pub outcome: StepOutcome,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub steps: Vec<StepResult>,
}

impl PipelineReport {
    pub fn total(&self) -> usize {
        self.steps.len()
    }

    pub fn succeeded(&self) -> usize {
        self.steps.iter().filter(|s| s.outcome.is_success()).count()
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| !s.outcome.is_success())
            .map(|s| s.name.as_str())
            .collect()
    }

    /// `k/n steps succeeded`, plus the failing step names if any.
    pub fn tally(&self) -> String {
        let mut line = format!("{}/{} steps succeeded", self.succeeded(), self.total());
        let failed = self.failed_names();
        if !failed.is_empty() {
            line.push_str(&format!(" (failed: {})", failed.join(", ")));
        }
        line
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut p| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = p.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Wait for `child`, killing it once `timeout` has passed.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> StepOutcome {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => return StepOutcome::Succeeded,
            Ok(Some(status)) => return StepOutcome::Failed { code: status.code() },
            Ok(None) if start.elapsed() >= timeout => {
                if let Err(e) = child.kill() {
                    warn!(error = %e, "failed to kill timed out step");
                }
                let _ = child.wait();
                return StepOutcome::TimedOut;
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                warn!(error = %e, "failed to poll step");
                let _ = child.kill();
                let _ = child.wait();
                return StepOutcome::Failed { code: None };
            }
        }
    }
}

/// Run one step to completion, capturing its output.
pub fn run_step(step: &PipelineStep, timeout: Duration) -> StepResult {
    let start = Instant::now();
    debug!(program = %step.program.display(), args = ?step.args, "starting step");

    let spawned = Command::new(&step.program)
        .args(&step.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let (outcome, stdout, stderr) = match spawned {
        Ok(mut child) => {
            let out = drain(child.stdout.take());
            let err = drain(child.stderr.take());
            let outcome = wait_with_timeout(&mut child, timeout);
            (outcome, collect(out), collect(err))
        }
        Err(e) => (
            StepOutcome::LaunchFailed {
                error: e.to_string(),
            },
            String::new(),
            String::new(),
        ),
    };

    let elapsed = start.elapsed();
    info!(
        step = %step.name,
        outcome = %outcome,
        elapsed_ms = elapsed.as_millis() as u64,
        "step finished"
    );
    StepResult {
        name: step.name.clone(),
        description: step.description.clone(),
        outcome,
        stdout,
        stderr,
        elapsed,
    }
}

/// Run every step in order and print each one's output as it finishes.
pub fn run_pipeline(steps: &[PipelineStep], timeout: Duration) -> PipelineReport {
    let mut report = PipelineReport::default();
    for step in steps {
        println!("\n{}", rule());
        println!("Running: {}", step.description);
        println!("Step:    {}", step.name);
        println!("{}\n", rule());

        let result = run_step(step, timeout);
        print!("{}", result.stdout);
        if !result.stderr.trim().is_empty() {
            println!("\nWarnings/errors:\n{}", result.stderr);
        }
        match &result.outcome {
            StepOutcome::Succeeded => println!("\n[OK] {} completed", step.description),
            other => println!("\n[FAIL] {} {other}", step.description),
        }
        report.steps.push(result);
    }
    report
}

pub fn print_pipeline_summary(report: &PipelineReport) {
    print_banner("Run summary");
    println!("\n{}\n", report.tally());
    for s in &report.steps {
        let status = if s.outcome.is_success() { "[OK]" } else { "[FAIL]" };
        println!("{status} {} ({:.1}s)", s.name, s.elapsed.as_secs_f64());
    }
}

/// Existence and size of one expected output file.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputCheck {
    pub path: PathBuf,
    /// `None` when the file is missing.
    pub size_kb: Option<f64>,
}

impl OutputCheck {
    pub fn exists(&self) -> bool {
        self.size_kb.is_some()
    }
}

pub fn check_outputs(paths: &[PathBuf]) -> Vec<OutputCheck> {
    paths
        .iter()
        .map(|p| OutputCheck {
            path: p.clone(),
            size_kb: std::fs::metadata(p)
                .ok()
                .filter(|m| m.is_file())
                .map(|m| m.len() as f64 / 1024.0),
        })
        .collect()
}

/// Every file a complete run should leave behind, CSVs first.
pub fn expected_outputs(config: &AnalysisConfig, format: ChartFormat) -> Vec<PathBuf> {
    let out = &config.paths.output_dir;
    let mut paths: Vec<PathBuf> = [
        csv_export::QUICK_REENTRY_CASES,
        csv_export::TRADE_INTERVALS,
        csv_export::QUICK_REENTRY_SUMMARY,
        csv_export::VIOLATION_SUMMARY,
        csv_export::ZERO_HOLDING_CASES,
    ]
    .iter()
    .map(|name| out.join(name))
    .collect();
    paths.extend(CHART_STEMS.iter().map(|stem| chart_path(out, stem, format)));
    paths.extend(
        [REPORT_MD, REPORT_TXT]
            .iter()
            .map(|name| config.paths.reports_dir.join(name)),
    );
    paths
}

pub fn print_output_checks(checks: &[OutputCheck]) {
    print_banner("Generated files");
    let groups: [(&str, fn(&Path) -> bool); 3] = [
        ("CSV data files", |p| has_extension(p, &["csv"])),
        ("Charts", |p| has_extension(p, &["svg", "png"])),
        ("Reports", |p| has_extension(p, &["md", "txt"])),
    ];
    for (title, matches) in groups {
        println!("\n{title}:");
        for c in checks.iter().filter(|c| matches(&c.path)) {
            match c.size_kb {
                Some(kb) => println!("  [OK] {} ({kb:.1} KB)", c.path.display()),
                None => println!("  [MISSING] {} (not found)", c.path.display()),
            }
        }
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_step_arguments() {
        let step = PipelineStep::for_stage(
            Path::new("/bin/reentry"),
            Stage::Violations,
            Some(Path::new("analysis.toml")),
            Some("debug"),
        );
        assert_eq!(step.name, "violations");
        assert_eq!(
            step.args,
            vec!["--config", "analysis.toml", "--log-level", "debug", "violations"]
        );
    }

    #[test]
    fn tally_names_failures() {
        let result = |name: &str, outcome| StepResult {
            name: name.to_string(),
            description: String::new(),
            outcome,
            stdout: String::new(),
            stderr: String::new(),
            elapsed: Duration::ZERO,
        };
        let report = PipelineReport {
            steps: vec![
                result("pattern", StepOutcome::Succeeded),
                result("violations", StepOutcome::Failed { code: Some(2) }),
                result("visualize", StepOutcome::TimedOut),
                result("report", StepOutcome::Succeeded),
            ],
        };
        assert_eq!(
            report.tally(),
            "2/4 steps succeeded (failed: violations, visualize)"
        );
    }

    #[test]
    fn launch_failure_is_recorded() {
        let step = PipelineStep::new(
            "missing",
            "missing program",
            "/nonexistent/reentry-test-binary",
            Vec::<String>::new(),
        );
        let result = run_step(&step, Duration::from_secs(5));
        assert!(matches!(result.outcome, StepOutcome::LaunchFailed { .. }));
    }

    #[test]
    fn output_checks_report_size() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("a.csv");
        std::fs::write(&present, vec![b'x'; 2048]).unwrap();
        let missing = dir.path().join("b.csv");
        let checks = check_outputs(&[present, missing]);
        assert_eq!(checks[0].size_kb, Some(2.0));
        assert!(!checks[1].exists());
    }

    #[test]
    fn expected_outputs_cover_every_stage() {
        let config = AnalysisConfig::default();
        let paths = expected_outputs(&config, ChartFormat::Svg);
        assert_eq!(paths.len(), 10);
        assert!(paths.contains(&PathBuf::from("outputs/trade_timeline.svg")));
        assert!(paths.contains(&PathBuf::from("docs/reports/quick_reentry_report.md")));
    }
}
