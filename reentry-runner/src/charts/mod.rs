//! Chart rendering with `plotters`.
//!
//! Charts render as SVG, or as PNG when the crate is built with the `png`
//! feature. Drawing code is generic over the backend; `render_chart!`
//! picks the backend for the configured format.

pub mod comparison;
pub mod distribution;
pub mod histogram;
pub mod timeline;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use plotters::prelude::*;

pub use histogram::{
    clamp_for_log, distribution_edges, histogram, monthly_counts, split_by_period, LOG_EPSILON,
};

pub const INTERVAL_DISTRIBUTION: &str = "interval_distribution";
pub const TRADE_TIMELINE: &str = "trade_timeline";
pub const REFERENCE_VS_BACKTEST: &str = "reference_vs_backtest_intervals";

/// Every chart stem, in the order the visualize stage renders them.
pub const CHART_STEMS: [&str; 3] = [INTERVAL_DISTRIBUTION, TRADE_TIMELINE, REFERENCE_VS_BACKTEST];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartFormat {
    Svg,
    #[cfg(feature = "png")]
    Png,
}

impl ChartFormat {
    /// PNG when built with the `png` feature, SVG otherwise.
    pub fn for_build() -> Self {
        #[cfg(feature = "png")]
        {
            ChartFormat::Png
        }
        #[cfg(not(feature = "png"))]
        {
            ChartFormat::Svg
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ChartFormat::Svg => "svg",
            #[cfg(feature = "png")]
            ChartFormat::Png => "png",
        }
    }
}

pub fn chart_file_name(stem: &str, format: ChartFormat) -> String {
    format!("{stem}.{}", format.extension())
}

pub fn chart_path(dir: &Path, stem: &str, format: ChartFormat) -> PathBuf {
    dir.join(chart_file_name(stem, format))
}

pub(crate) fn render_error<E: std::fmt::Debug>(e: E) -> anyhow::Error {
    anyhow!("chart rendering failed: {e:?}")
}

pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

/// Open a drawing area named `$root` on the backend for `$format`, evaluate
/// `$draw` (an `anyhow::Result<()>`) and flush the file.
macro_rules! render_chart {
    ($path:expr, $size:expr, $format:expr, $root:ident => $draw:expr) => {{
        $crate::charts::ensure_parent($path)?;
        match $format {
            $crate::charts::ChartFormat::Svg => {
                let $root = plotters::prelude::SVGBackend::new($path, $size).into_drawing_area();
                $draw?;
                $root.present().map_err($crate::charts::render_error)?;
            }
            #[cfg(feature = "png")]
            $crate::charts::ChartFormat::Png => {
                let $root = plotters::prelude::BitMapBackend::new($path, $size).into_drawing_area();
                $draw?;
                $root.present().map_err($crate::charts::render_error)?;
            }
        }
    }};
}
pub(crate) use render_chart;

// ── Shared styling ──

pub(crate) const FONT: &str = "sans-serif";
pub(crate) const QUICK_RED: RGBColor = RGBColor(0xff, 0x44, 0x44);
pub(crate) const CALM_BLUE: RGBColor = RGBColor(0x44, 0x44, 0xff);
pub(crate) const ORANGE: RGBColor = RGBColor(0xff, 0x8c, 0x00);
pub(crate) const DARK_GREEN: RGBColor = RGBColor(0x2c, 0xa0, 0x2c);
pub(crate) const LOSS_RED: RGBColor = RGBColor(0xd6, 0x27, 0x28);
pub(crate) const STEEL_BLUE: RGBColor = RGBColor(0x46, 0x82, 0xb4);

/// Axis label for a segmented category axis.
pub(crate) fn segment_label(value: &SegmentValue<u32>, labels: &[&str]) -> String {
    match value {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
            labels.get(*i as usize).copied().unwrap_or_default().to_string()
        }
        SegmentValue::Last => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_follow_format() {
        assert_eq!(
            chart_file_name(INTERVAL_DISTRIBUTION, ChartFormat::Svg),
            "interval_distribution.svg"
        );
        assert_eq!(
            chart_path(Path::new("out"), TRADE_TIMELINE, ChartFormat::Svg),
            PathBuf::from("out/trade_timeline.svg")
        );
    }

    #[test]
    fn segment_labels() {
        let labels = ["a", "b"];
        assert_eq!(segment_label(&SegmentValue::CenterOf(1), &labels), "b");
        assert_eq!(segment_label(&SegmentValue::CenterOf(5), &labels), "");
        assert_eq!(segment_label(&SegmentValue::Last, &labels), "");
    }
}
