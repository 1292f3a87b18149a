// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};

use crate::{BucketAggregate, Sample};

/// How week-of-year bucket keys are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekScheme {
    /// ISO-8601 week number paired with the ISO week-year.
    #[default]
    Iso,
    /// `floor((day_of_month + weekday_from_monday) / 7) + 1` with the calendar
    /// year. Kept for output compatibility with earlier releases; it repeats
    /// week numbers every month and ignores year boundaries.
    Legacy,
}

impl WeekScheme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Iso => "iso",
            Self::Legacy => "legacy",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "iso" => Some(Self::Iso),
            "legacy" => Some(Self::Legacy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketPeriod {
    Week(WeekScheme),
    Month,
}

impl BucketPeriod {
    #[must_use]
    pub fn key(self, at: DateTime<Utc>) -> String {
        match self {
            Self::Week(scheme) => week_key(at, scheme),
            Self::Month => month_key(at),
        }
    }
}

/// `"YYYY-Wn"` with an unpadded week number.
#[must_use]
pub fn week_key(at: DateTime<Utc>, scheme: WeekScheme) -> String {
    let date = at.date_naive();
    match scheme {
        WeekScheme::Iso => {
            let iso = date.iso_week();
            format!("{}-W{}", iso.year(), iso.week())
        }
        WeekScheme::Legacy => {
            let weekday = date.weekday().num_days_from_monday();
            let week = (date.day() + weekday) / 7 + 1;
            format!("{}-W{}", date.year(), week)
        }
    }
}

/// `"YYYY-M"` with a 1-based, unpadded month.
#[must_use]
pub fn month_key(at: DateTime<Utc>) -> String {
    let date = at.date_naive();
    format!("{}-{}", date.year(), date.month())
}

struct Accumulator {
    sum: f64,
    count: usize,
    anchor_date: DateTime<Utc>,
}

/// Arithmetic mean per bucket, sorted by each bucket's first-sample date.
#[must_use]
pub fn bucket_averages(samples: &[Sample], period: BucketPeriod) -> Vec<BucketAggregate> {
    let mut grouped: HashMap<String, Accumulator> = HashMap::new();
    for sample in samples {
        grouped
            .entry(period.key(sample.taken_at))
            .and_modify(|acc| {
                acc.sum += sample.weight_kg;
                acc.count += 1;
            })
            .or_insert(Accumulator {
                sum: sample.weight_kg,
                count: 1,
                anchor_date: sample.taken_at,
            });
    }

    let mut out: Vec<BucketAggregate> = grouped
        .into_iter()
        .map(|(key, acc)| BucketAggregate {
            key,
            average_weight_kg: acc.sum / acc.count as f64,
            anchor_date: acc.anchor_date,
        })
        .collect();
    out.sort_by(|a, b| a.anchor_date.cmp(&b.anchor_date).then_with(|| a.key.cmp(&b.key)));
    out
}
