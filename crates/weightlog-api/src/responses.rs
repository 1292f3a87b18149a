// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use weightlog_model::{Email, GoalProgress, MeasurementId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: UserId,
    pub email: Email,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementDto {
    pub id: MeasurementId,
    pub weight_kg: f64,
    pub note: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementsResponse {
    pub measurements: Vec<MeasurementDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWeightResponse {
    pub message: String,
    pub measurement: MeasurementDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountResponse {
    pub message: String,
    pub user_id: UserId,
}

/// Every field is `null` when the user has no goal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalResponse {
    pub goal_weight_kg: Option<f64>,
    pub goal_set_at: Option<String>,
    pub start_weight_kg: Option<f64>,
    pub latest_weight_kg: Option<f64>,
    pub progress: Option<GoalProgress>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetGoalResponse {
    pub message: String,
    pub goal_weight_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAverageDto {
    pub week: String,
    pub average_weight_kg: f64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAverageDto {
    pub month: String,
    pub average_weight_kg: f64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPointDto {
    pub x: String,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendResponse {
    pub weekly_averages: Vec<WeeklyAverageDto>,
    pub monthly_averages: Vec<MonthlyAverageDto>,
    pub rate_of_change: Option<f64>,
    pub trend_points: Vec<TrendPointDto>,
    pub trend_slope: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub service: String,
    pub version: String,
    pub api_version: String,
    pub schema_version: i64,
}
