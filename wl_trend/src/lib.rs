//! Core weight-loss and step-count trend computation library.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod series;
pub mod trend;

pub use trend::{Direction, StepSummary, TrendLine, Verdict};

/// Assumed relative error on phone-counted steps.
pub const STEP_ERROR_FRACTION: f64 = 0.15;

#[derive(Error, Debug)]
pub enum TrendError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("insufficient data for trend fit (need at least 2 measured weights)")]
    InsufficientData,
    #[error("no step entries, cannot compute a daily average")]
    EmptyInput,
}

/// Everything the user edits before a run: goal, date range and the raw
/// sample lists. Weight and step samples are chronological from
/// `start_date`; the lists may be shorter than the date range but never
/// longer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackerInput {
    pub start_weight: f64,
    pub goal_weight: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weights: Vec<f64>,
    pub steps: Vec<u32>,
}

impl TrackerInput {
    fn validate(&self) -> Result<(), TrendError> {
        if !self.start_weight.is_finite() || !self.goal_weight.is_finite() {
            return Err(TrendError::Config(
                "start and goal weight must be finite".into(),
            ));
        }
        if self.goal_weight >= self.start_weight {
            return Err(TrendError::Config(format!(
                "goal weight {} is not below starting weight {}",
                self.goal_weight, self.start_weight
            )));
        }
        Ok(())
    }
}

/// One row of the day table. Days without an entered sample hold `None`,
/// never a sentinel value.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    /// Proleptic-Gregorian day number; the regression x value.
    pub ordinal: i64,
    /// Ideal weight for this day on the straight line to the goal.
    pub goal_track: f64,
    pub weight: Option<f64>,
    pub steps: Option<u32>,
    pub step_error: Option<f64>,
}

/// Derived output of the whole pipeline; the chart renderers are read-only
/// consumers of this value.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackerReport {
    pub days: Vec<DailyRecord>,
    pub start_weight: f64,
    pub goal_weight: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub trend: TrendLine,
    /// Weekly loss required by the ideal trajectory, rounded to 2 decimals.
    pub goal_weekly_rate: f64,
    /// Fitted weekly rate, `7 * slope` (negative while losing).
    pub actual_weekly_rate: f64,
    /// Fitted weight at the last day of the range.
    pub projected_end_weight: f64,
    pub direction: Direction,
    pub verdict: Verdict,
    pub steps: StepSummary,
}

/// Run the full pipeline: validate, build the day table, fit the trend,
/// classify the outcome and summarize steps. All validation failures
/// surface here, before anything is rendered.
pub fn compute_report(input: &TrackerInput) -> Result<TrackerReport, TrendError> {
    input.validate()?;

    let dates = series::date_span(input.start_date, input.end_date)?;
    let len = dates.len();

    let track = series::goal_track(input.start_weight, input.goal_weight, len)?;
    let goal_weekly_rate = series::weekly_goal_rate(&track);

    let weights = series::align(input.weights.clone(), len)?;
    let steps = series::align(input.steps.clone(), len)?;

    let mut days = Vec::with_capacity(len);
    for (i, date) in dates.into_iter().enumerate() {
        let steps_today = steps[i];
        days.push(DailyRecord {
            date,
            ordinal: i64::from(date.num_days_from_ce()),
            goal_track: track[i],
            weight: weights[i],
            steps: steps_today,
            step_error: steps_today.map(|s| f64::from(s) * STEP_ERROR_FRACTION),
        });
    }

    let (xs, ys): (Vec<i64>, Vec<f64>) = days
        .iter()
        .filter_map(|d| d.weight.map(|w| (d.ordinal, w)))
        .unzip();
    let trend = trend::fit_line(&xs, &ys)?;

    let last_ordinal = days.last().map(|d| d.ordinal).unwrap_or_default();
    let projected_end_weight = trend.project(last_ordinal);
    let (direction, verdict) = trend::classify(
        &trend,
        goal_weekly_rate,
        projected_end_weight,
        input.goal_weight,
    );

    let step_summary = trend::step_summary(&input.steps)?;

    Ok(TrackerReport {
        days,
        start_weight: input.start_weight,
        goal_weight: input.goal_weight,
        start_date: input.start_date,
        end_date: input.end_date,
        actual_weekly_rate: trend.slope * 7.0,
        trend,
        goal_weekly_rate,
        projected_end_weight,
        direction,
        verdict,
        steps: step_summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base_input() -> TrackerInput {
        TrackerInput {
            start_weight: 200.0,
            goal_weight: 100.0,
            start_date: date(2000, 1, 1),
            end_date: date(2000, 12, 30),
            weights: vec![200.0, 198.0],
            steps: vec![1000, 2000, 3000],
        }
    }

    #[test]
    fn two_sample_pipeline_is_exact() {
        let report = compute_report(&base_input()).unwrap();
        assert_eq!(report.days.len(), 365);
        assert_eq!(report.trend.slope, -2.0);
        assert_eq!(report.actual_weekly_rate, -14.0);
        // 200 - 2 lbs/day over the remaining 364 days
        assert_eq!(report.projected_end_weight, -528.0);
        assert_eq!(report.direction, Direction::Losing);
        assert_eq!(report.verdict, Verdict::Beat { by: 628.0 });
    }

    #[test]
    fn day_table_shape() {
        let report = compute_report(&base_input()).unwrap();
        let days = &report.days;
        assert_eq!(days[0].date, date(2000, 1, 1));
        assert_eq!(days[364].date, date(2000, 12, 30));
        assert!(days.windows(2).all(|w| w[1].ordinal == w[0].ordinal + 1));
        assert_eq!(days[0].weight, Some(200.0));
        assert_eq!(days[1].weight, Some(198.0));
        assert!(days[2..].iter().all(|d| d.weight.is_none()));
        assert_eq!(days[2].steps, Some(3000));
        assert_eq!(days[2].step_error, Some(450.0));
        assert!(days[3..].iter().all(|d| d.steps.is_none()));
    }

    #[test]
    fn goal_above_start_is_rejected() {
        let mut input = base_input();
        input.goal_weight = 250.0;
        assert!(matches!(
            compute_report(&input),
            Err(TrendError::Config(_))
        ));
    }

    #[test]
    fn oversized_sample_list_is_rejected() {
        let mut input = base_input();
        input.end_date = date(2000, 1, 2);
        input.weights = vec![200.0, 199.0, 198.0];
        assert!(matches!(
            compute_report(&input),
            Err(TrendError::Config(_))
        ));
    }

    #[test]
    fn single_weight_is_insufficient() {
        let mut input = base_input();
        input.weights = vec![200.0];
        assert!(matches!(
            compute_report(&input),
            Err(TrendError::InsufficientData)
        ));
    }

    #[test]
    fn missing_steps_are_rejected() {
        let mut input = base_input();
        input.steps = Vec::new();
        assert!(matches!(compute_report(&input), Err(TrendError::EmptyInput)));
    }
}
