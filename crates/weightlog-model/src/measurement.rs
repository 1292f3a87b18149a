// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use weightlog_trend::Sample;

use crate::{MeasurementId, ParseError, UserId};

pub const WEIGHT_MAX_KG: f64 = 1000.0;
pub const NOTE_MAX_LEN: usize = 500;

/// Stored timestamps carry millisecond precision.
#[must_use]
pub fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct WeightKg(f64);

impl WeightKg {
    pub fn parse(value: f64) -> Result<Self, ParseError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ParseError::Invalid {
                field: "weightKg",
                reason: "must be a positive number",
            });
        }
        if value > WEIGHT_MAX_KG {
            return Err(ParseError::Invalid {
                field: "weightKg",
                reason: "must not exceed 1000 kg",
            });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for WeightKg {
    type Error = ParseError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<WeightKg> for f64 {
    fn from(value: WeightKg) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Note(String);

impl Note {
    /// Blank notes collapse to `None`.
    pub fn parse(input: Option<&str>) -> Result<Option<Self>, ParseError> {
        let Some(trimmed) = input.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        if trimmed.chars().count() > NOTE_MAX_LEN {
            return Err(ParseError::TooLong("note", NOTE_MAX_LEN));
        }
        Ok(Some(Self(trimmed.to_string())))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub id: MeasurementId,
    pub user_id: UserId,
    pub weight_kg: WeightKg,
    pub note: Option<Note>,
    pub created_at: DateTime<Utc>,
}

impl Measurement {
    #[must_use]
    pub fn new(
        user_id: UserId,
        weight_kg: WeightKg,
        note: Option<Note>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MeasurementId::new_random(),
            user_id,
            weight_kg,
            note,
            created_at: truncate_to_millis(created_at),
        }
    }

    #[must_use]
    pub fn sample(&self) -> Sample {
        Sample::new(self.weight_kg.get(), self.created_at)
    }
}

/// One line of a user's data export, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExportRow {
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub date: String,
    pub weight_kg: f64,
    #[serde(default)]
    pub note: String,
}

impl ExportRow {
    #[must_use]
    pub fn from_measurement(m: &Measurement) -> Self {
        Self {
            date: m.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            weight_kg: m.weight_kg.get(),
            note: m.note.as_ref().map(|n| n.as_str().to_string()).unwrap_or_default(),
        }
    }

    pub fn sample(&self) -> Result<Sample, ParseError> {
        let taken_at = DateTime::parse_from_rfc3339(&self.date)
            .map_err(|_| ParseError::Invalid {
                field: "date",
                reason: "must be an RFC 3339 timestamp",
            })?
            .with_timezone(&Utc);
        let weight = WeightKg::parse(self.weight_kg)?;
        Ok(Sample::new(weight.get(), taken_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn weights_must_be_positive_and_finite() {
        assert!(WeightKg::parse(72.4).is_ok());
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY, 1000.5] {
            assert!(WeightKg::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn blank_notes_become_none() {
        assert_eq!(Note::parse(None).expect("ok"), None);
        assert_eq!(Note::parse(Some("   ")).expect("ok"), None);
        assert_eq!(
            Note::parse(Some(" after run ")).expect("ok").map(|n| n.as_str().to_string()),
            Some("after run".to_string())
        );
        assert!(Note::parse(Some(&"x".repeat(NOTE_MAX_LEN + 1))).is_err());
    }

    #[test]
    fn measurement_timestamps_drop_sub_millisecond_precision() {
        let at = Utc.timestamp_opt(1_700_000_000, 123_456_789).single().expect("ts");
        let m = Measurement::new(UserId::new_random(), WeightKg::parse(70.0).expect("w"), None, at);
        assert_eq!(m.created_at.timestamp_subsec_nanos(), 123_000_000);
        assert_eq!(m.sample().taken_at, m.created_at);
    }

    #[test]
    fn export_row_round_trips_to_sample() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 15, 0).single().expect("date");
        let m = Measurement::new(
            UserId::new_random(),
            WeightKg::parse(81.3).expect("w"),
            Note::parse(Some("morning")).expect("note"),
            at,
        );
        let row = ExportRow::from_measurement(&m);
        assert_eq!(row.date, "2024-06-01T09:15:00.000Z");
        assert_eq!(row.note, "morning");
        let sample = row.sample().expect("sample");
        assert_eq!(sample.taken_at, at);
        assert_eq!(sample.weight_kg, 81.3);
    }
}
