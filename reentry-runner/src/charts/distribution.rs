//! Interval distribution chart: bucket bars, short-interval histogram, CDF
//! and per-period box plots in a 2x2 grid.

use std::path::Path;

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;

use reentry_core::analysis::{mean, percentile, sorted, BAR_MINUTES, DAY_MINUTES};

use super::histogram::{
    clamp_for_log, distribution_edges, histogram, split_by_period, DISTRIBUTION_LABELS,
    LOG_EPSILON, PERIOD_LABELS, SHORT_EDGES,
};
use super::{
    render_chart, render_error, segment_label, ChartFormat, CALM_BLUE, FONT, ORANGE, QUICK_RED,
    STEEL_BLUE,
};

const SIZE: (u32, u32) = (1600, 1200);
const CDF_MARKERS: [f64; 5] = [25.0, 50.0, 75.0, 90.0, 95.0];

/// Render the distribution chart for `minutes` to `path`.
pub fn render(path: &Path, format: ChartFormat, minutes: &[f64]) -> Result<()> {
    render_chart!(path, SIZE, format, root => draw(&root, minutes));
    Ok(())
}

pub fn draw<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, minutes: &[f64]) -> Result<()> {
    root.fill(&WHITE).map_err(render_error)?;
    if minutes.is_empty() {
        root.draw(&Text::new(
            "No reentry intervals to plot",
            (40, 40),
            (FONT, 28).into_font(),
        ))
        .map_err(render_error)?;
        return Ok(());
    }

    let panels = root.split_evenly((2, 2));
    draw_buckets(&panels[0], minutes)?;
    draw_short_histogram(&panels[1], minutes)?;
    draw_cdf(&panels[2], minutes)?;
    draw_period_boxes(&panels[3], minutes)?;
    Ok(())
}

fn draw_buckets<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, minutes: &[f64]) -> Result<()> {
    let max = minutes.iter().copied().fold(f64::MIN, f64::max);
    let counts = histogram(minutes, &distribution_edges(max));
    let total = minutes.len();
    let y_max = counts.iter().copied().max().unwrap_or(0) as f64 * 1.15 + 1.0;

    let mut chart = ChartBuilder::on(area)
        .caption("Reentry interval distribution", (FONT, 22))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0u32..counts.len() as u32).into_segmented(), 0.0..y_max)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|v| segment_label(v, &DISTRIBUTION_LABELS))
        .y_desc("Trades")
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, &n)| {
            let i = i as u32;
            let color = if i == 0 { QUICK_RED } else { CALM_BLUE };
            Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), n as f64)],
                color.mix(0.7).filled(),
            )
        }))
        .map_err(render_error)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, &n)| {
            let share = n as f64 / total as f64 * 100.0;
            Text::new(
                format!("{n} ({share:.1}%)"),
                (SegmentValue::CenterOf(i as u32), n as f64 + y_max * 0.02),
                (FONT, 14).into_font(),
            )
        }))
        .map_err(render_error)?;
    Ok(())
}

fn draw_short_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    minutes: &[f64],
) -> Result<()> {
    let counts = histogram(minutes, &SHORT_EDGES);
    let y_max = counts.iter().copied().max().unwrap_or(0) as f64 * 1.15 + 1.0;
    let x_max = SHORT_EDGES[SHORT_EDGES.len() - 1];

    let mut chart = ChartBuilder::on(area)
        .caption("Short intervals (up to 1 hour)", (FONT, 22))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .x_desc("Interval (minutes)")
        .y_desc("Trades")
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(SHORT_EDGES.windows(2).zip(&counts).map(|(edge, &n)| {
            Rectangle::new([(edge[0], 0.0), (edge[1], n as f64)], ORANGE.mix(0.7).filled())
        }))
        .map_err(render_error)?;

    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(BAR_MINUTES, 0.0), (BAR_MINUTES, y_max)],
            QUICK_RED.stroke_width(2),
        )))
        .map_err(render_error)?
        .label("15 min (one bar)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], QUICK_RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_error)?;
    Ok(())
}

fn draw_cdf<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, minutes: &[f64]) -> Result<()> {
    let values = sorted(minutes);
    let n = values.len() as f64;
    let clamped: Vec<f64> = values.iter().copied().map(clamp_for_log).collect();
    let x_max = clamped.last().copied().unwrap_or(DAY_MINUTES).max(DAY_MINUTES) * 1.5;

    let mut chart = ChartBuilder::on(area)
        .caption("Cumulative distribution", (FONT, 22))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((LOG_EPSILON..x_max).log_scale(), 0.0..100.0)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .x_desc("Interval (minutes, log)")
        .y_desc("Cumulative share (%)")
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(LineSeries::new(
            clamped
                .iter()
                .enumerate()
                .map(|(i, &v)| (v, (i + 1) as f64 / n * 100.0)),
            STEEL_BLUE.stroke_width(2),
        ))
        .map_err(render_error)?;

    let guides = [
        vec![(LOG_EPSILON, 50.0), (x_max, 50.0)],
        vec![(BAR_MINUTES, 0.0), (BAR_MINUTES, 100.0)],
        vec![(DAY_MINUTES, 0.0), (DAY_MINUTES, 100.0)],
    ];
    chart
        .draw_series(
            guides
                .into_iter()
                .map(|points| PathElement::new(points, BLACK.mix(0.4).stroke_width(1))),
        )
        .map_err(render_error)?;

    for p in CDF_MARKERS {
        let x = clamp_for_log(percentile(&values, p));
        chart
            .draw_series(std::iter::once(Circle::new((x, p), 4, QUICK_RED.filled())))
            .map_err(render_error)?;
        chart
            .draw_series(std::iter::once(Text::new(
                format!("P{p:.0}: {x:.1}"),
                (x, p + 3.0),
                (FONT, 13).into_font(),
            )))
            .map_err(render_error)?;
    }
    Ok(())
}

fn draw_period_boxes<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    minutes: &[f64],
) -> Result<()> {
    let groups = split_by_period(minutes);
    let clamped: Vec<Vec<f64>> = groups
        .iter()
        .map(|g| g.iter().copied().map(clamp_for_log).collect())
        .collect();
    let y_max = clamped
        .iter()
        .flatten()
        .copied()
        .fold(LOG_EPSILON, f64::max)
        * 2.0;

    let mut chart = ChartBuilder::on(area)
        .caption("Intervals by period", (FONT, 22))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (0u32..PERIOD_LABELS.len() as u32).into_segmented(),
            (LOG_EPSILON as f32..y_max as f32).log_scale(),
        )
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|v| segment_label(v, &PERIOD_LABELS))
        .y_desc("Interval (minutes, log)")
        .draw()
        .map_err(render_error)?;

    for (i, values) in clamped.iter().enumerate() {
        // Empty periods have no quartiles.
        if values.is_empty() {
            continue;
        }
        let quartiles = Quartiles::new(values.as_slice());
        chart
            .draw_series(std::iter::once(
                Boxplot::new_vertical(SegmentValue::CenterOf(i as u32), &quartiles)
                    .width(40)
                    .style(STEEL_BLUE),
            ))
            .map_err(render_error)?;
        chart
            .draw_series(std::iter::once(Circle::new(
                (SegmentValue::CenterOf(i as u32), mean(values) as f32),
                5,
                QUICK_RED.filled(),
            )))
            .map_err(render_error)?;
    }
    Ok(())
}
