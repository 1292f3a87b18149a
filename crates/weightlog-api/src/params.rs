// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use weightlog_model::TimeRange;
use weightlog_trend::WeekScheme;

use crate::errors::ApiError;

pub const PARAM_TIME_RANGE: &str = "timeRange";
pub const PARAM_WEEK_SCHEME: &str = "weekScheme";
pub const PARAM_FORMAT: &str = "format";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrendsParams {
    pub time_range: TimeRange,
    pub week_scheme: WeekScheme,
}

fn parse_optional<T>(
    query: &BTreeMap<String, String>,
    name: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, ApiError> {
    query
        .get(name)
        .map(|raw| parse(raw).ok_or_else(|| ApiError::invalid_param(name, raw)))
        .transpose()
}

/// Absent means the whole history.
pub fn parse_time_range_param(query: &BTreeMap<String, String>) -> Result<TimeRange, ApiError> {
    Ok(parse_optional(query, PARAM_TIME_RANGE, TimeRange::parse)?.unwrap_or_default())
}

pub fn parse_week_scheme_param(query: &BTreeMap<String, String>) -> Result<WeekScheme, ApiError> {
    Ok(parse_optional(query, PARAM_WEEK_SCHEME, WeekScheme::parse)?.unwrap_or_default())
}

pub fn parse_export_format_param(
    query: &BTreeMap<String, String>,
) -> Result<ExportFormat, ApiError> {
    Ok(parse_optional(query, PARAM_FORMAT, ExportFormat::parse)?.unwrap_or_default())
}

pub fn parse_trends_params(query: &BTreeMap<String, String>) -> Result<TrendsParams, ApiError> {
    Ok(TrendsParams {
        time_range: parse_time_range_param(query)?,
        week_scheme: parse_week_scheme_param(query)?,
    })
}
