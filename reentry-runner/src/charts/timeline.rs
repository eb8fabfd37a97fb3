//! Trade timeline chart: holding periods, monthly trade counts and the
//! reentry interval scatter, stacked over a shared time axis.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;

use reentry_core::analysis::{ReentryInterval, BAR_MINUTES, DAY_MINUTES};
use reentry_core::domain::TradeRecord;

use super::histogram::{clamp_for_log, days_label, monthly_counts, to_days, LOG_EPSILON};
use super::{
    render_chart, render_error, ChartFormat, CALM_BLUE, DARK_GREEN, FONT, LOSS_RED, ORANGE,
    QUICK_RED, STEEL_BLUE,
};

const SIZE: (u32, u32) = (1800, 1400);
const MONTH_BAR_DAYS: f64 = 25.0;
/// Months above this share of the busiest month are drawn in red.
const BUSY_MONTH_RATIO: f64 = 0.7;
const AXIS_DATE: &str = "%Y-%m";

pub fn render(
    path: &Path,
    format: ChartFormat,
    trades: &[TradeRecord],
    intervals: &[ReentryInterval],
) -> Result<()> {
    render_chart!(path, SIZE, format, root => draw(&root, trades, intervals));
    Ok(())
}

pub fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    trades: &[TradeRecord],
    intervals: &[ReentryInterval],
) -> Result<()> {
    root.fill(&WHITE).map_err(render_error)?;
    let Some(span) = time_span(trades) else {
        root.draw(&Text::new("No trades to plot", (40, 40), (FONT, 28).into_font()))
            .map_err(render_error)?;
        return Ok(());
    };

    let panels = root.split_evenly((3, 1));
    draw_holding_periods(&panels[0], span, trades, intervals)?;
    draw_monthly_counts(&panels[1], span, trades)?;
    draw_interval_scatter(&panels[2], span, intervals)?;
    Ok(())
}

/// First entry to last exit in days, padded by a day on each side.
fn time_span(trades: &[TradeRecord]) -> Option<(f64, f64)> {
    let start = trades.iter().map(|t| to_days(t.entry_time)).reduce(f64::min)?;
    let end = trades.iter().map(|t| to_days(t.exit_time)).reduce(f64::max)?;
    Some((start - 1.0, end.max(start) + 1.0))
}

fn draw_holding_periods<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    (start, end): (f64, f64),
    trades: &[TradeRecord],
    intervals: &[ReentryInterval],
) -> Result<()> {
    // Index of every trade entered within one bar of the previous exit.
    let quick: HashSet<usize> = intervals
        .iter()
        .filter(|iv| iv.is_quick())
        .map(|iv| iv.trade_index + 1)
        .collect();

    let mut chart = ChartBuilder::on(area)
        .caption("Holding periods (green win, red loss, orange quick reentry)", (FONT, 22))
        .margin(12)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(start..end, -1.0..trades.len() as f64)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .x_label_formatter(&|v| days_label(*v, AXIS_DATE))
        .y_desc("Trade #")
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(trades.iter().enumerate().map(|(i, t)| {
            let color = if t.pnl_percent > 0.0 { DARK_GREEN } else { LOSS_RED };
            PathElement::new(
                vec![(to_days(t.entry_time), i as f64), (to_days(t.exit_time), i as f64)],
                color.stroke_width(2),
            )
        }))
        .map_err(render_error)?;

    chart
        .draw_series(trades.iter().enumerate().map(|(i, t)| {
            Circle::new((to_days(t.entry_time), i as f64), 3, STEEL_BLUE.filled())
        }))
        .map_err(render_error)?;
    chart
        .draw_series(trades.iter().enumerate().map(|(i, t)| {
            Cross::new((to_days(t.exit_time), i as f64), 3, BLACK.stroke_width(1))
        }))
        .map_err(render_error)?;

    chart
        .draw_series(
            trades
                .iter()
                .enumerate()
                .filter(|(i, _)| quick.contains(i))
                .map(|(i, t)| Circle::new((to_days(t.entry_time), i as f64), 6, ORANGE.filled())),
        )
        .map_err(render_error)?;
    Ok(())
}

fn draw_monthly_counts<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    (start, end): (f64, f64),
    trades: &[TradeRecord],
) -> Result<()> {
    let months = monthly_counts(trades);
    let busiest = months.iter().map(|(_, n)| *n).max().unwrap_or(0) as f64;
    let mean = months.iter().map(|(_, n)| *n as f64).sum::<f64>() / months.len().max(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption("Trades per month", (FONT, 22))
        .margin(12)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(start.min(month_start(&months))..end, 0.0..busiest * 1.2 + 1.0)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .x_label_formatter(&|v| days_label(*v, AXIS_DATE))
        .y_desc("Trades")
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(months.iter().map(|(month, n)| {
            let x = to_days(month.and_time(chrono::NaiveTime::MIN));
            let color = if *n as f64 > busiest * BUSY_MONTH_RATIO { QUICK_RED } else { CALM_BLUE };
            Rectangle::new([(x, 0.0), (x + MONTH_BAR_DAYS, *n as f64)], color.mix(0.7).filled())
        }))
        .map_err(render_error)?;

    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(start, mean), (end, mean)],
            BLACK.mix(0.6).stroke_width(2),
        )))
        .map_err(render_error)?
        .label(format!("mean {mean:.1} trades/month"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_error)?;
    Ok(())
}

fn month_start(months: &[(chrono::NaiveDate, usize)]) -> f64 {
    months
        .first()
        .map(|(d, _)| to_days(d.and_time(chrono::NaiveTime::MIN)))
        .unwrap_or(f64::MAX)
}

fn draw_interval_scatter<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    (start, end): (f64, f64),
    intervals: &[ReentryInterval],
) -> Result<()> {
    let y_max = intervals
        .iter()
        .map(|iv| clamp_for_log(iv.minutes))
        .fold(DAY_MINUTES, f64::max)
        * 2.0;

    let mut chart = ChartBuilder::on(area)
        .caption("Reentry interval by exit time", (FONT, 22))
        .margin(12)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(start..end, (LOG_EPSILON..y_max).log_scale())
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .x_label_formatter(&|v| days_label(*v, AXIS_DATE))
        .y_desc("Interval (minutes, log)")
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(intervals.iter().map(|iv| {
            let color = if iv.is_quick() { QUICK_RED } else { CALM_BLUE };
            Circle::new(
                (to_days(iv.exit_time), clamp_for_log(iv.minutes)),
                4,
                color.mix(0.7).filled(),
            )
        }))
        .map_err(render_error)?;

    for (level, label) in [(BAR_MINUTES, "15 min"), (DAY_MINUTES, "1 day")] {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(start, level), (end, level)],
                QUICK_RED.mix(0.6).stroke_width(1),
            )))
            .map_err(render_error)?
            .label(label)
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], QUICK_RED.stroke_width(1)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_error)?;
    Ok(())
}
