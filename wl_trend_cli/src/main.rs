//! Weight-loss and daily-step trend reporter: computes the trend report from
//! the literal inputs below and renders the two annotated charts as PNGs.

use std::io;
use std::panic;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wl_trend::{compute_report, DailyRecord, Direction, TrackerInput, TrackerReport, Verdict};

// Edit the literals below before each run; there is no CLI or config file.
// Weight samples are chronological, one per day starting at START_DATE.
const REAL_WEIGHT: &[f64] = &[
    200.0, 199.4, 199.7, 198.9, 198.6, 198.8, 198.1, 197.6, 197.9, 197.2, 196.8, 196.3, 196.6,
    195.9,
];

// Daily step counts, one per day starting at START_DATE.
const DAILY_STEPS: &[u32] = &[
    8200, 10450, 6800, 9100, 12020, 7600, 8900, 9800, 11200, 7300, 8500, 10100,
];

const START_WEIGHT: f64 = 200.0;
const GOAL_WEIGHT: f64 = 170.0;
const START_DATE: &str = "2025-01-01";
const END_DATE: &str = "2025-06-30";

const WEIGHT_PLOT: &str = "weight_trend.png";
const STEPS_PLOT: &str = "daily_steps.png";

fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let input = tracker_input()?;
    let report = compute_report(&input)?;

    let measured = report.days.iter().filter(|d| d.weight.is_some()).count();
    info!(
        "Trend fitted over {} of {} days: {:+.2} lbs/week against {:.2} lbs/week needed",
        measured,
        report.days.len(),
        report.actual_weekly_rate,
        report.goal_weekly_rate
    );
    info!("{}", outcome_line(&report));
    info!(
        "Average daily steps: {:.0} +/- {:.0}",
        report.steps.mean, report.steps.mean_error
    );

    if let Err(err) = render_chart_guard(&report, Path::new(WEIGHT_PLOT), Pane::Weight) {
        warn!("Skipping weight plot ({}): {}", WEIGHT_PLOT, err);
    } else {
        info!("Wrote plot: {}", WEIGHT_PLOT);
    }
    if let Err(err) = render_chart_guard(&report, Path::new(STEPS_PLOT), Pane::Steps) {
        warn!("Skipping steps plot ({}): {}", STEPS_PLOT, err);
    } else {
        info!("Wrote plot: {}", STEPS_PLOT);
    }

    Ok(())
}

fn tracker_input() -> Result<TrackerInput> {
    let start_date = NaiveDate::parse_from_str(START_DATE, "%Y-%m-%d")
        .context("START_DATE is not a valid YYYY-MM-DD date")?;
    let end_date = NaiveDate::parse_from_str(END_DATE, "%Y-%m-%d")
        .context("END_DATE is not a valid YYYY-MM-DD date")?;
    Ok(TrackerInput {
        start_weight: START_WEIGHT,
        goal_weight: GOAL_WEIGHT,
        start_date,
        end_date,
        weights: REAL_WEIGHT.to_vec(),
        steps: DAILY_STEPS.to_vec(),
    })
}

fn outcome_line(report: &TrackerReport) -> String {
    match report.verdict {
        Verdict::Miss { by } => format!(
            "Projected {:.2} lbs on {}: missing the goal by {:.2} lbs",
            report.projected_end_weight, report.end_date, by
        ),
        Verdict::Beat { by } => format!(
            "Projected {:.2} lbs on {}: beating the goal by {:.2} lbs",
            report.projected_end_weight, report.end_date, by
        ),
        Verdict::Nail => format!(
            "Projected {:.2} lbs on {}: nailing the goal",
            report.projected_end_weight, report.end_date
        ),
        Verdict::Flat => "Weight trend is flat; the goal is never reached at this pace".into(),
    }
}

fn annotation_lines(report: &TrackerReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Weekly loss needed to hit goal: {:.2} lbs/week",
        report.goal_weekly_rate
    )];
    lines.push(match report.direction {
        Direction::Losing => format!(
            "Currently LOSING {:.2} lbs/week",
            report.actual_weekly_rate.abs()
        ),
        Direction::Gaining => format!(
            "Currently GAINING {:.2} lbs/week",
            report.actual_weekly_rate.abs()
        ),
        Direction::Flat => "Current weight trend is FLAT".to_string(),
    });
    lines.push(format!(
        "Weight at goal date on current trajectory: {:.2} lbs",
        report.projected_end_weight
    ));
    lines.push(match report.verdict {
        Verdict::Miss { by } => format!("You will miss your goal by {:.2} lbs", by),
        Verdict::Beat { by } => format!("You will beat your goal by {:.2} lbs", by),
        Verdict::Nail => "You will nail your goal!".to_string(),
        Verdict::Flat => "The goal stays out of reach at a flat trend".to_string(),
    });
    lines
}

#[derive(Clone, Copy)]
enum Pane {
    Weight,
    Steps,
}

fn render_chart_guard(report: &TrackerReport, path: &Path, pane: Pane) -> Result<(), String> {
    let render = || -> Result<(), String> {
        let backend = BitMapBackend::new(path, (1280, 760));
        let root = backend.into_drawing_area();
        match pane {
            Pane::Weight => draw_weight_chart(root, report),
            Pane::Steps => draw_steps_chart(root, report),
        }
        .map_err(|e| format!("plotting error: {}", e))
    };

    panic::catch_unwind(panic::AssertUnwindSafe(render))
        .map_err(|_| "plotting backend panicked".to_string())?
}

fn draw_weight_chart<DB>(
    root: DrawingArea<DB, plotters::coord::Shift>,
    report: &TrackerReport,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let first_ordinal = report
        .days
        .first()
        .map(|d| d.ordinal)
        .context("empty day table")? as f64;
    let last_ordinal = report
        .days
        .last()
        .map(|d| d.ordinal)
        .context("empty day table")? as f64;
    let x_lo = first_ordinal - 1.0;
    let x_hi = last_ordinal + 1.0;
    let y_lo = report.goal_weight - 3.0;
    let y_hi = report.start_weight + 3.0;

    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(25)
        .caption(
            format!(
                "Weight loss from {} to {} (weighed on waking)",
                report.start_date, report.end_date
            ),
            FontDesc::new(FontFamily::SansSerif, 24.0, FontStyle::Normal),
        )
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 90)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_labels(12)
        .y_labels(12)
        .y_max_light_lines(10)
        .x_label_formatter(&|x| ordinal_label(*x))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .x_desc("Date")
        .y_desc("Weight (lbs)")
        .label_style(FontDesc::new(FontFamily::SansSerif, 18.0, FontStyle::Normal))
        .x_label_style(
            FontDesc::new(FontFamily::SansSerif, 14.0, FontStyle::Normal)
                .transform(FontTransform::Rotate90),
        )
        .bold_line_style(BLACK.mix(0.1))
        .draw()?;

    // Ideal trajectory, dashed.
    chart
        .draw_series(DashedLineSeries::new(
            report.days.iter().map(|d| (d.ordinal as f64, d.goal_track)),
            8,
            6,
            BLUE.stroke_width(2),
        ))?
        .label("Ideal weight-loss trajectory")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], BLUE.stroke_width(2)));

    // Constant goal line.
    chart
        .draw_series(LineSeries::new(
            [(x_lo, report.goal_weight), (x_hi, report.goal_weight)],
            RED.stroke_width(2),
        ))?
        .label("Goal weight")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], RED.stroke_width(2)));

    // Measured weights: markers only, gaps where unset.
    chart
        .draw_series(report.days.iter().filter_map(|d| {
            d.weight
                .map(|w| Circle::new((d.ordinal as f64, w), 4, BLACK.filled()))
        }))?
        .label("Measured weight")
        .legend(|(x, y)| Circle::new((x + 15, y), 4, BLACK.filled()));

    // Fitted trend extended across the full axis, clipped to the weight range.
    let trend = report.trend;
    let trend_points: Vec<(f64, f64)> = std::iter::once(x_lo)
        .chain(report.days.iter().map(|d| d.ordinal as f64))
        .chain(std::iter::once(x_hi))
        .map(|x| (x, trend.slope * x + trend.intercept))
        .filter(|(_, y)| (y_lo..=y_hi).contains(y))
        .collect();
    chart
        .draw_series(LineSeries::new(trend_points, BLACK.stroke_width(2)))?
        .label(format!(
            "y = {:.1}x {:+.1}",
            report.trend.slope, report.trend.intercept
        ))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], BLACK.stroke_width(2)));

    // Pace annotation block: translucent red fill, one line per sentence.
    let lines = annotation_lines(report);
    let x_span = x_hi - x_lo;
    let y_span = y_hi - y_lo;
    let line_step = 0.04 * y_span;
    let anchor_x = x_lo + 0.02 * x_span;
    let box_top = y_lo + 0.30 * y_span + 0.5 * line_step * lines.len() as f64;
    chart.draw_series(std::iter::once(Rectangle::new(
        [
            (anchor_x - 0.01 * x_span, box_top + 0.8 * line_step),
            (
                anchor_x + 0.34 * x_span,
                box_top - line_step * (lines.len() as f64 + 0.4),
            ),
        ],
        RED.mix(0.1).filled(),
    )))?;
    for (i, line) in lines.iter().enumerate() {
        chart.draw_series(std::iter::once(Text::new(
            line.clone(),
            (anchor_x, box_top - line_step * i as f64),
            FontDesc::new(FontFamily::SansSerif, 16.0, FontStyle::Normal).color(&BLACK),
        )))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.7))
        .border_style(&BLACK.mix(0.3))
        .label_font(FontDesc::new(FontFamily::SansSerif, 16.0, FontStyle::Normal))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_steps_chart<DB>(
    root: DrawingArea<DB, plotters::coord::Shift>,
    report: &TrackerReport,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let days = &report.days;
    let x_lo = -1.0;
    let x_hi = days.len() as f64;
    let mut y_hi = f64::from(report.steps.max) * 1.25;
    if !y_hi.is_finite() || y_hi <= 0.0 {
        y_hi = 1.0;
    }

    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(25)
        .caption(
            format!(
                "Daily steps from {} to {} (phone count, 00:00-23:59)",
                report.start_date, report.end_date
            ),
            FontDesc::new(FontFamily::SansSerif, 24.0, FontStyle::Normal),
        )
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .build_cartesian_2d(x_lo..x_hi, 0.0..y_hi)?;

    chart
        .configure_mesh()
        .x_labels(12)
        .x_label_formatter(&|x| day_label(days, *x))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .x_desc("Date")
        .y_desc("Daily steps (+/- 15%)")
        .label_style(FontDesc::new(FontFamily::SansSerif, 18.0, FontStyle::Normal))
        .draw()?;

    // One bar per entered day; unset days draw nothing.
    chart
        .draw_series(days.iter().enumerate().filter_map(|(i, d)| {
            d.steps.map(|s| {
                Rectangle::new(
                    [(i as f64 - 0.4, 0.0), (i as f64 + 0.4, f64::from(s))],
                    BLUE.mix(0.5).filled(),
                )
            })
        }))?
        .label("Daily steps")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], BLUE.mix(0.5).filled()));

    // +/- 15% band on each bar.
    chart.draw_series(days.iter().enumerate().filter_map(|(i, d)| {
        match (d.steps, d.step_error) {
            (Some(s), Some(err)) => {
                let v = f64::from(s);
                Some(ErrorBar::new_vertical(
                    i as f64,
                    v - err,
                    v,
                    v + err,
                    BLACK.stroke_width(1),
                    6,
                ))
            }
            _ => None,
        }
    }))?;

    // Reference line at the mean of the entered counts.
    chart
        .draw_series(DashedLineSeries::new(
            [(x_lo, report.steps.mean), (x_hi, report.steps.mean)],
            6,
            4,
            RED.stroke_width(1),
        ))?
        .label("Average daily steps")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], RED.stroke_width(1)));

    // Average annotation, upper right.
    let x_span = x_hi - x_lo;
    let anchor_x = x_lo + 0.76 * x_span;
    let top_y = 0.90 * y_hi;
    let lines = [
        "Average daily steps:".to_string(),
        format!(
            "{:.0} +/- {:.0} steps/day",
            report.steps.mean, report.steps.mean_error
        ),
    ];
    chart.draw_series(std::iter::once(Rectangle::new(
        [
            (anchor_x - 0.01 * x_span, top_y + 0.045 * y_hi),
            (anchor_x + 0.21 * x_span, top_y - 0.095 * y_hi),
        ],
        BLACK.mix(0.15),
    )))?;
    for (i, line) in lines.iter().enumerate() {
        chart.draw_series(std::iter::once(Text::new(
            line.clone(),
            (anchor_x, top_y - 0.05 * y_hi * i as f64),
            FontDesc::new(FontFamily::SansSerif, 16.0, FontStyle::Normal).color(&BLACK),
        )))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.7))
        .border_style(&BLACK.mix(0.3))
        .label_font(FontDesc::new(FontFamily::SansSerif, 16.0, FontStyle::Normal))
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn ordinal_label(ordinal: f64) -> String {
    i32::try_from(ordinal.round() as i64)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn day_label(days: &[DailyRecord], x: f64) -> String {
    let idx = x.round();
    if idx < 0.0 {
        return String::new();
    }
    days.get(idx as usize)
        .map(|d| d.date.format("%m-%d").to_string())
        .unwrap_or_default()
}
