//! Reference vs backtest interval box plots.

use std::path::Path;

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;

use reentry_core::analysis::{IntervalStats, DAY_MINUTES};

use super::histogram::{clamp_for_log, LOG_EPSILON};
use super::{render_chart, render_error, segment_label, ChartFormat, FONT, ORANGE, STEEL_BLUE};

const SIZE: (u32, u32) = (1400, 900);

pub fn render(
    path: &Path,
    format: ChartFormat,
    reference_label: &str,
    reference: &[f64],
    backtest: &[f64],
) -> Result<()> {
    render_chart!(path, SIZE, format, root => draw(&root, reference_label, reference, backtest));
    Ok(())
}

pub fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    reference_label: &str,
    reference: &[f64],
    backtest: &[f64],
) -> Result<()> {
    root.fill(&WHITE).map_err(render_error)?;
    let (plot, notes) = root.split_horizontally(1000);

    let labels = [reference_label, "Backtest"];
    let groups: [Vec<f64>; 2] = [
        reference.iter().copied().map(clamp_for_log).collect(),
        backtest.iter().copied().map(clamp_for_log).collect(),
    ];
    let y_max = groups
        .iter()
        .flatten()
        .copied()
        .fold(DAY_MINUTES, f64::max)
        * 2.0;

    let mut chart = ChartBuilder::on(&plot)
        .caption(
            format!("Reentry intervals: {reference_label} vs backtest"),
            (FONT, 24),
        )
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (0u32..2u32).into_segmented(),
            (LOG_EPSILON as f32..y_max as f32).log_scale(),
        )
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|v| segment_label(v, &labels))
        .y_desc("Interval (minutes, log)")
        .draw()
        .map_err(render_error)?;

    for (i, (values, color)) in groups.iter().zip([STEEL_BLUE, ORANGE]).enumerate() {
        if values.is_empty() {
            continue;
        }
        let quartiles = Quartiles::new(values.as_slice());
        chart
            .draw_series(std::iter::once(
                Boxplot::new_vertical(SegmentValue::CenterOf(i as u32), &quartiles)
                    .width(80)
                    .style(color.stroke_width(2)),
            ))
            .map_err(render_error)?;
    }

    let text = stats_lines(reference_label, reference, backtest);
    for (row, line) in text.iter().enumerate() {
        notes
            .draw(&Text::new(
                line.as_str(),
                (10, 80 + row as i32 * 24),
                (FONT, 16).into_font(),
            ))
            .map_err(render_error)?;
    }
    Ok(())
}

/// The statistics block printed beside the plot.
pub fn stats_lines(reference_label: &str, reference: &[f64], backtest: &[f64]) -> Vec<String> {
    let mut lines = Vec::new();
    for (label, values) in [(reference_label, reference), ("Backtest", backtest)] {
        lines.push(format!("{label}:"));
        match IntervalStats::from_minutes(values) {
            Some(s) => {
                lines.push(format!("  count  {}", s.count));
                lines.push(format!("  min    {:.1} min", s.min));
                lines.push(format!("  median {:.1} min", s.median));
                lines.push(format!("  mean   {:.1} min", s.mean));
                lines.push(format!("  max    {:.1} min", s.max));
            }
            None => lines.push("  no intervals".to_string()),
        }
        lines.push(String::new());
    }
    lines
}
