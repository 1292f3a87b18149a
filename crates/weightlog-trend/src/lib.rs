// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Weight trend analytics.
//!
//! Everything here is a pure function of an ascending sample sequence: no
//! clock reads, no I/O, no shared state. Callers own ordering and filtering.

mod bucket;
mod regression;

use chrono::{DateTime, Utc};

pub use bucket::{bucket_averages, month_key, week_key, BucketPeriod, WeekScheme};
pub use regression::{linear_fit, trend_points, LinearFit};

pub const CRATE_NAME: &str = "weightlog-trend";

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const DAYS_PER_WEEK: f64 = 7.0;

/// One weight measurement as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub weight_kg: f64,
    pub taken_at: DateTime<Utc>,
}

impl Sample {
    #[must_use]
    pub const fn new(weight_kg: f64, taken_at: DateTime<Utc>) -> Self {
        Self {
            weight_kg,
            taken_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketAggregate {
    pub key: String,
    pub average_weight_kg: f64,
    /// `taken_at` of the first sample that landed in this bucket.
    pub anchor_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub x: DateTime<Utc>,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrendResult {
    pub weekly_averages: Vec<BucketAggregate>,
    pub monthly_averages: Vec<BucketAggregate>,
    /// kg per 7 days between the first and last sample.
    pub rate_of_change: Option<f64>,
    pub trend_points: Vec<TrendPoint>,
    /// kg per sample index step.
    pub trend_slope: Option<f64>,
}

/// Computes trends with ISO-8601 week buckets.
#[must_use]
pub fn compute_trends(samples: &[Sample]) -> TrendResult {
    compute_trends_with(samples, WeekScheme::Iso)
}

/// `samples` must be ascending by `taken_at`; the engine never reorders them.
#[must_use]
pub fn compute_trends_with(samples: &[Sample], scheme: WeekScheme) -> TrendResult {
    debug_assert!(
        is_ascending(samples),
        "trend samples must be sorted ascending by taken_at"
    );
    if samples.is_empty() {
        return TrendResult::default();
    }

    let fit = linear_fit(samples);
    TrendResult {
        weekly_averages: bucket_averages(samples, BucketPeriod::Week(scheme)),
        monthly_averages: bucket_averages(samples, BucketPeriod::Month),
        rate_of_change: rate_of_change(samples),
        trend_points: trend_points(samples, fit),
        trend_slope: Some(fit.slope),
    }
}

/// Weight change between the first and last sample, scaled to kg per week.
///
/// `None` for fewer than two samples or when no time elapsed between them.
#[must_use]
pub fn rate_of_change(samples: &[Sample]) -> Option<f64> {
    let (first, last) = (samples.first()?, samples.last()?);
    let elapsed_ms = (last.taken_at - first.taken_at).num_milliseconds();
    let days = elapsed_ms as f64 / MILLIS_PER_DAY;
    if days > 0.0 {
        Some((last.weight_kg - first.weight_kg) / (days / DAYS_PER_WEEK))
    } else {
        None
    }
}

#[must_use]
pub fn is_ascending(samples: &[Sample]) -> bool {
    samples.windows(2).all(|w| w[0].taken_at <= w[1].taken_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 8, 0, 0).single().expect("valid date")
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let result = compute_trends(&[]);
        assert!(result.weekly_averages.is_empty());
        assert!(result.monthly_averages.is_empty());
        assert!(result.trend_points.is_empty());
        assert_eq!(result.rate_of_change, None);
        assert_eq!(result.trend_slope, None);
    }

    #[test]
    fn single_sample_has_flat_trend_and_no_rate() {
        let t = at(2024, 3, 5);
        let result = compute_trends(&[Sample::new(80.0, t)]);
        assert_eq!(result.trend_slope, Some(0.0));
        assert_eq!(result.trend_points, vec![TrendPoint { x: t, y: 80.0 }]);
        assert_eq!(result.rate_of_change, None);
        assert_eq!(result.weekly_averages.len(), 1);
        assert_eq!(result.weekly_averages[0].average_weight_kg, 80.0);
        assert_eq!(result.monthly_averages.len(), 1);
        assert_eq!(result.monthly_averages[0].average_weight_kg, 80.0);
    }

    #[test]
    fn one_week_apart_gives_weekly_rate() {
        let t0 = at(2024, 3, 4);
        let samples = [Sample::new(100.0, t0), Sample::new(98.0, t0 + Duration::days(7))];
        let result = compute_trends(&samples);
        assert_eq!(result.rate_of_change, Some(-2.0));
        let slope = result.trend_slope.expect("slope");
        assert!(slope < 0.0);
        assert_eq!(result.trend_points.len(), 2);
        assert_eq!(result.trend_points[0].y, 100.0);
        assert_eq!(result.trend_points[1].y, 98.0);
    }

    #[test]
    fn fractional_days_count_toward_rate() {
        let t0 = at(2024, 3, 4);
        let samples = [
            Sample::new(90.0, t0),
            Sample::new(89.0, t0 + Duration::hours(84)),
        ];
        // 3.5 days is half a week, so one kilogram becomes two per week.
        assert_eq!(rate_of_change(&samples), Some(-2.0));
    }

    #[test]
    fn identical_timestamps_have_no_rate_but_keep_slope() {
        let t = at(2024, 3, 4);
        let result = compute_trends(&[Sample::new(70.0, t), Sample::new(71.0, t)]);
        assert_eq!(result.rate_of_change, None);
        assert_eq!(result.trend_slope, Some(1.0));
    }

    #[test]
    fn weekly_buckets_use_selected_scheme() {
        let samples = [Sample::new(70.0, at(2021, 1, 1))];
        let iso = compute_trends_with(&samples, WeekScheme::Iso);
        let legacy = compute_trends_with(&samples, WeekScheme::Legacy);
        assert_eq!(iso.weekly_averages[0].key, "2020-W53");
        assert_eq!(legacy.weekly_averages[0].key, "2021-W1");
    }

    #[test]
    fn ascending_check_accepts_ties() {
        let t = at(2024, 1, 1);
        assert!(is_ascending(&[Sample::new(1.0, t), Sample::new(2.0, t)]));
        assert!(!is_ascending(&[
            Sample::new(1.0, t + Duration::days(1)),
            Sample::new(2.0, t)
        ]));
    }
}
