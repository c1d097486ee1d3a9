//! Calendar series construction and sample alignment.

use chrono::{Duration, NaiveDate};
use ndarray::Array1;

use crate::TrendError;

/// Inclusive daily series from `start` to `end`; the common time axis for
/// every other sequence.
pub fn date_span(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, TrendError> {
    if end < start {
        return Err(TrendError::Config(format!(
            "date range ends before it starts ({start} to {end})"
        )));
    }
    let len = (end - start).num_days() + 1;
    Ok((0..len).map(|offset| start + Duration::days(offset)).collect())
}

/// Pad an ordered sample list out to the series length. Position `i` of the
/// input is day `i` of the range; days past the last sample become `None`.
/// A list longer than the range is rejected outright rather than truncated.
pub fn align<T>(samples: Vec<T>, len: usize) -> Result<Vec<Option<T>>, TrendError> {
    if samples.len() > len {
        return Err(TrendError::Config(format!(
            "{} samples entered but the date range only spans {} days",
            samples.len(),
            len
        )));
    }
    let missing = len - samples.len();
    let mut aligned: Vec<Option<T>> = samples.into_iter().map(Some).collect();
    aligned.extend(std::iter::repeat_with(|| None).take(missing));
    Ok(aligned)
}

/// Ideal straight-line weight path: `len` evenly spaced values from
/// `start_weight` down to `goal_weight` inclusive.
pub fn goal_track(
    start_weight: f64,
    goal_weight: f64,
    len: usize,
) -> Result<Array1<f64>, TrendError> {
    if len < 2 {
        return Err(TrendError::Config(format!(
            "date range spans {len} day(s); need at least 2 to draw a trajectory"
        )));
    }
    Ok(Array1::linspace(start_weight, goal_weight, len))
}

/// Weekly pace the ideal trajectory implies, rounded to 2 decimals.
/// Positive while the trajectory descends.
pub fn weekly_goal_rate(track: &Array1<f64>) -> f64 {
    round2(7.0 * (track[0] - track[1]))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn span_is_inclusive_and_gapless() {
        let days = date_span(date(2000, 1, 1), date(2000, 12, 31)).unwrap();
        assert_eq!(days.len(), 366);
        assert_eq!(days[0], date(2000, 1, 1));
        assert_eq!(days[365], date(2000, 12, 31));
        assert!(days.windows(2).all(|w| w[1] == w[0] + Duration::days(1)));
    }

    #[test]
    fn single_day_span() {
        let days = date_span(date(2000, 6, 1), date(2000, 6, 1)).unwrap();
        assert_eq!(days, vec![date(2000, 6, 1)]);
    }

    #[test]
    fn reversed_span_is_rejected() {
        assert!(matches!(
            date_span(date(2000, 2, 1), date(2000, 1, 1)),
            Err(TrendError::Config(_))
        ));
    }

    #[test]
    fn align_pads_the_tail() {
        let aligned = align(vec![1.0, 2.0], 5).unwrap();
        assert_eq!(aligned, vec![Some(1.0), Some(2.0), None, None, None]);
    }

    #[test]
    fn align_rejects_oversized_input() {
        assert!(matches!(
            align(vec![1, 2, 3], 2),
            Err(TrendError::Config(_))
        ));
    }

    #[test]
    fn trajectory_endpoints_and_monotonicity() {
        let track = goal_track(200.0, 100.0, 365).unwrap();
        assert_eq!(track.len(), 365);
        assert_eq!(track[0], 200.0);
        assert_eq!(track[364], 100.0);
        let values = track.to_vec();
        assert!(values.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn weekly_rate_matches_first_step() {
        let track = goal_track(200.0, 100.0, 365).unwrap();
        let rate = weekly_goal_rate(&track);
        assert_eq!(rate, round2(7.0 * (track[0] - track[1])));
        assert_eq!(rate, 1.92);
    }

    #[test]
    fn degenerate_trajectory_is_rejected() {
        assert!(matches!(
            goal_track(200.0, 100.0, 1),
            Err(TrendError::Config(_))
        ));
    }
}
