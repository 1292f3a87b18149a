// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, SecondsFormat, Utc};
use weightlog_model::{Goal, Measurement, Note, User};
use weightlog_trend::TrendResult;

use crate::responses::{
    GoalResponse, MeasurementDto, MonthlyAverageDto, TrendPointDto, TrendResponse, UserDto,
    WeeklyAverageDto,
};

#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[must_use]
pub fn user_dto(user: &User) -> UserDto {
    UserDto {
        id: user.id,
        email: user.email.clone(),
    }
}

#[must_use]
pub fn measurement_dto(m: &Measurement) -> MeasurementDto {
    MeasurementDto {
        id: m.id,
        weight_kg: m.weight_kg.get(),
        note: m.note.as_ref().map(Note::as_str).map(str::to_string),
        created_at: format_timestamp(m.created_at),
    }
}

#[must_use]
pub fn goal_response(goal: Option<&Goal>, latest: Option<&Measurement>) -> GoalResponse {
    let latest_weight = latest.map(|m| m.weight_kg);
    GoalResponse {
        goal_weight_kg: goal.map(|g| g.goal_weight_kg.get()),
        goal_set_at: goal.map(|g| format_timestamp(g.goal_set_at)),
        start_weight_kg: goal.map(|g| g.start_weight_kg.get()),
        latest_weight_kg: latest_weight.map(|w| w.get()),
        progress: goal.and_then(|g| g.progress(latest_weight)),
    }
}

#[must_use]
pub fn trend_response(result: &TrendResult) -> TrendResponse {
    TrendResponse {
        weekly_averages: result
            .weekly_averages
            .iter()
            .map(|b| WeeklyAverageDto {
                week: b.key.clone(),
                average_weight_kg: b.average_weight_kg,
                date: format_timestamp(b.anchor_date),
            })
            .collect(),
        monthly_averages: result
            .monthly_averages
            .iter()
            .map(|b| MonthlyAverageDto {
                month: b.key.clone(),
                average_weight_kg: b.average_weight_kg,
                date: format_timestamp(b.anchor_date),
            })
            .collect(),
        rate_of_change: result.rate_of_change,
        trend_points: result
            .trend_points
            .iter()
            .map(|p| TrendPointDto {
                x: format_timestamp(p.x),
                y: p.y,
            })
            .collect(),
        trend_slope: result.trend_slope,
    }
}

/// Rate as shown in the progress email: two decimals, or `N/A`.
#[must_use]
pub fn format_rate(rate: Option<f64>) -> String {
    rate.map_or_else(|| "N/A".to_string(), |r| format!("{r:.2}"))
}
