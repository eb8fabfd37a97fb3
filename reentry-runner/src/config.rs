//! Analysis configuration.
//!
//! Every field has a default, so an absent config file (or an empty one)
//! reproduces the standard layout:
//!
//! ```toml
//! [paths]
//! trades_csv = "outputs/trades_tradingview_aligned.csv"
//! signals_csv = "outputs/sell_signals_detail.csv"
//! output_dir = "outputs"
//! reports_dir = "docs/reports"
//! reference_export = "data/reference_export.xlsx"
//! reference_export_csv = "data/tradingview_results.csv"
//! # reference_trades = "data/reference_trades.csv"
//!
//! [thresholds]
//! high_frequency_day_min_trades = 3
//! zero_holding_high_severity_above = 10
//! cooldown_candidates = [15.0, 60.0, 240.0]
//!
//! [orchestrator]
//! timeout_secs = 300
//!
//! [reference]
//! label = "TradingView"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub paths: PathsConfig,
    pub thresholds: ThresholdsConfig,
    pub orchestrator: OrchestratorConfig,
    pub reference: ReferenceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Backtest trade export.
    pub trades_csv: PathBuf,
    /// Sell signal log.
    pub signals_csv: PathBuf,
    /// CSVs, charts and the JSON summary go here.
    pub output_dir: PathBuf,
    pub reports_dir: PathBuf,
    /// Reference platform's spreadsheet export.
    pub reference_export: PathBuf,
    /// Where `inspect-export` saves the first sheet as CSV.
    pub reference_export_csv: PathBuf,
    /// Replaces the embedded reference trade list when set.
    pub reference_trades: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            trades_csv: PathBuf::from("outputs/trades_tradingview_aligned.csv"),
            signals_csv: PathBuf::from("outputs/sell_signals_detail.csv"),
            output_dir: PathBuf::from("outputs"),
            reports_dir: PathBuf::from("docs/reports"),
            reference_export: PathBuf::from("data/reference_export.xlsx"),
            reference_export_csv: PathBuf::from("data/tradingview_results.csv"),
            reference_trades: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    /// A day with at least this many entries is a high-frequency day.
    pub high_frequency_day_min_trades: usize,
    /// More zero-holding trades than this is rated High severity.
    pub zero_holding_high_severity_above: usize,
    /// Cooldowns to simulate, in minutes. The reference minimum is appended.
    pub cooldown_candidates: Vec<f64>,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            high_frequency_day_min_trades: 3,
            zero_holding_high_severity_above: 10,
            cooldown_candidates: vec![15.0, 60.0, 240.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Per-step timeout.
    pub timeout_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { timeout_secs: 300 }
    }
}

impl OrchestratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Display name of the reference platform in tables and reports.
    pub label: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            label: "TradingView".into(),
        }
    }
}

impl AnalysisConfig {
    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// `from_file` when a path is given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.orchestrator.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "orchestrator.timeout_secs must be positive".into(),
            ));
        }
        if self.thresholds.cooldown_candidates.is_empty() {
            return Err(ConfigError::Invalid(
                "thresholds.cooldown_candidates must not be empty".into(),
            ));
        }
        if self
            .thresholds
            .cooldown_candidates
            .iter()
            .any(|c| !c.is_finite() || *c < 0.0)
        {
            return Err(ConfigError::Invalid(
                "thresholds.cooldown_candidates must be finite and non-negative".into(),
            ));
        }
        if self.thresholds.high_frequency_day_min_trades == 0 {
            return Err(ConfigError::Invalid(
                "thresholds.high_frequency_day_min_trades must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let c = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(c, AnalysisConfig::default());
        assert_eq!(c.orchestrator.timeout(), Duration::from_secs(300));
        assert_eq!(c.reference.label, "TradingView");
        assert!(c.paths.reference_trades.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let c = AnalysisConfig::from_toml(
            r#"
            [paths]
            output_dir = "out"

            [thresholds]
            cooldown_candidates = [30.0]
            "#,
        )
        .unwrap();
        assert_eq!(c.paths.output_dir, PathBuf::from("out"));
        assert_eq!(c.paths.reports_dir, PathBuf::from("docs/reports"));
        assert_eq!(c.thresholds.cooldown_candidates, vec![30.0]);
        assert_eq!(c.thresholds.high_frequency_day_min_trades, 3);
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = AnalysisConfig::from_toml("[orchestrator]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn empty_cooldowns_rejected() {
        let err =
            AnalysisConfig::from_toml("[thresholds]\ncooldown_candidates = []\n").unwrap_err();
        assert!(err.to_string().contains("cooldown_candidates"));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = AnalysisConfig::from_toml("[paths\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = AnalysisConfig::from_file(Path::new("no/such/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
