//! Least-squares trend fit, outcome classification and step statistics.

use serde::{Deserialize, Serialize};

use crate::{TrendError, STEP_ERROR_FRACTION};

/// First-degree least-squares fit over (ordinal day, weight) pairs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    /// Weight change per day.
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn project(&self, ordinal: i64) -> f64 {
        self.slope * ordinal as f64 + self.intercept
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Losing,
    Gaining,
    Flat,
}

/// Where the fitted trajectory lands relative to the goal weight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Verdict {
    Miss { by: f64 },
    Beat { by: f64 },
    Nail,
    /// Zero slope: the goal is never reached at the current pace.
    Flat,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    /// Arithmetic mean of the entered step counts.
    pub mean: f64,
    /// Mean of the per-day 15% error terms; equals 0.15 * mean.
    pub mean_error: f64,
    pub max: u32,
}

/// Closed-form normal-equations fit minimizing squared vertical residuals.
/// Deterministic for a given input; needs at least two samples on at least
/// two distinct days.
pub fn fit_line(days: &[i64], weights: &[f64]) -> Result<TrendLine, TrendError> {
    if days.len() != weights.len() {
        return Err(TrendError::Config(format!(
            "{} day ordinals paired with {} weights",
            days.len(),
            weights.len()
        )));
    }
    if days.len() < 2 {
        return Err(TrendError::InsufficientData);
    }

    let n = days.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_xy = 0.0;
    for (&day, &weight) in days.iter().zip(weights.iter()) {
        let x = day as f64;
        sum_x += x;
        sum_y += weight;
        sum_xx += x * x;
        sum_xy += x * weight;
    }

    let denom = n * sum_xx - sum_x * sum_x;
    if denom == 0.0 {
        return Err(TrendError::Config(
            "all weight samples fall on the same day".into(),
        ));
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;
    Ok(TrendLine { slope, intercept })
}

/// Total, non-overlapping partition over (sign of slope, |weekly| vs |goal
/// rate|). A perfectly flat fit gets its own verdict instead of silently
/// skipping classification.
pub fn classify(
    trend: &TrendLine,
    goal_weekly_rate: f64,
    projected: f64,
    goal_weight: f64,
) -> (Direction, Verdict) {
    let weekly = trend.slope * 7.0;
    if trend.slope < 0.0 {
        let pace = weekly.abs();
        let needed = goal_weekly_rate.abs();
        let verdict = if pace < needed {
            Verdict::Miss {
                by: (goal_weight - projected).abs(),
            }
        } else if pace > needed {
            Verdict::Beat {
                by: (projected - goal_weight).abs(),
            }
        } else {
            Verdict::Nail
        };
        (Direction::Losing, verdict)
    } else if trend.slope > 0.0 {
        (
            Direction::Gaining,
            Verdict::Miss {
                by: (goal_weight - projected).abs(),
            },
        )
    } else {
        (Direction::Flat, Verdict::Flat)
    }
}

/// Mean entered steps plus the mean of the per-day 15% error terms,
/// computed as `mean(s * 1.15) - mean(s)` the way the tracker reports it.
pub fn step_summary(steps: &[u32]) -> Result<StepSummary, TrendError> {
    if steps.is_empty() {
        return Err(TrendError::EmptyInput);
    }
    let n = steps.len() as f64;
    let mean = steps.iter().map(|&s| f64::from(s)).sum::<f64>() / n;
    let inflated = steps
        .iter()
        .map(|&s| f64::from(s) * (1.0 + STEP_ERROR_FRACTION))
        .sum::<f64>()
        / n;
    let max = steps.iter().copied().max().unwrap_or(0);
    Ok(StepSummary {
        mean,
        mean_error: inflated - mean,
        max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_point_fit_is_exact() {
        let line = fit_line(&[0, 10], &[200.0, 190.0]).unwrap();
        assert_eq!(line.slope, -1.0);
        assert_eq!(line.intercept, 200.0);
        assert_eq!(line.project(10), 190.0);
    }

    #[test]
    fn fit_is_invariant_to_pairwise_reorder() {
        let a = fit_line(&[1, 2, 3, 4], &[10.0, 9.0, 9.5, 8.0]).unwrap();
        let b = fit_line(&[4, 2, 1, 3], &[8.0, 9.0, 10.0, 9.5]).unwrap();
        assert_eq!(a.slope, b.slope);
        assert_eq!(a.intercept, b.intercept);
    }

    #[test]
    fn fit_needs_two_samples() {
        assert!(matches!(
            fit_line(&[1], &[200.0]),
            Err(TrendError::InsufficientData)
        ));
    }

    #[test]
    fn fit_rejects_mismatched_pairing() {
        assert!(matches!(
            fit_line(&[1, 2, 3], &[200.0, 199.0]),
            Err(TrendError::Config(_))
        ));
    }

    #[test]
    fn fit_rejects_single_distinct_day() {
        assert!(matches!(
            fit_line(&[5, 5], &[200.0, 199.0]),
            Err(TrendError::Config(_))
        ));
    }

    #[test]
    fn classification_partitions_every_case() {
        let losing = TrendLine {
            slope: -0.1,
            intercept: 200.0,
        };
        // Losing too slowly: misses.
        assert_eq!(
            classify(&losing, 5.0, 150.0, 100.0),
            (Direction::Losing, Verdict::Miss { by: 50.0 })
        );
        // Losing faster than needed: beats.
        assert_eq!(
            classify(&losing, 0.2, 90.0, 100.0),
            (Direction::Losing, Verdict::Beat { by: 10.0 })
        );
        // Exact pace match: nails.
        let half = TrendLine {
            slope: -0.5,
            intercept: 200.0,
        };
        assert_eq!(
            classify(&half, 3.5, 100.0, 100.0),
            (Direction::Losing, Verdict::Nail)
        );
        // Gaining always misses, regardless of magnitude.
        let gaining = TrendLine {
            slope: 0.1,
            intercept: 200.0,
        };
        assert_eq!(
            classify(&gaining, 5.0, 230.0, 100.0),
            (Direction::Gaining, Verdict::Miss { by: 130.0 })
        );
        // Flat trend is classified explicitly, never skipped.
        let flat = TrendLine {
            slope: 0.0,
            intercept: 200.0,
        };
        assert_eq!(
            classify(&flat, 5.0, 200.0, 100.0),
            (Direction::Flat, Verdict::Flat)
        );
    }

    #[test]
    fn step_summary_mean_and_error() {
        let summary = step_summary(&[1000, 2000, 3000]).unwrap();
        assert_eq!(summary.mean, 2000.0);
        assert!((summary.mean_error - STEP_ERROR_FRACTION * summary.mean).abs() < 1e-9);
        assert!((summary.mean_error - 300.0).abs() < 1e-9);
        assert_eq!(summary.max, 3000);
    }

    #[test]
    fn step_summary_rejects_empty_input() {
        assert!(matches!(step_summary(&[]), Err(TrendError::EmptyInput)));
    }
}
