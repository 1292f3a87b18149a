// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! HTTP wire contract: request and response bodies, error envelope, query
//! parameters, and the OpenAPI document.

mod convert;
mod errors;
mod export;
mod openapi;
pub mod params;
mod requests;
mod responses;

pub use convert::{
    format_rate, format_timestamp, goal_response, measurement_dto, trend_response, user_dto,
};
pub use errors::{ApiError, ApiErrorCode, FieldErrors, UNKNOWN_REQUEST_ID};
pub use export::{export_csv, CSV_HEADER};
pub use openapi::openapi_v1_spec;
pub use requests::{
    AddWeightRequest, LoginRequest, PasswordResetRequest, ResetPasswordRequest, SetGoalRequest,
    SignupRequest, UpdateEmailRequest, UpdatePasswordRequest, VerifyEmailRequest,
};
pub use responses::{
    AddWeightResponse, DeleteAccountResponse, GoalResponse, LoginResponse, MeasurementDto,
    MeasurementsResponse, MessageResponse, MonthlyAverageDto, SetGoalResponse, TrendPointDto,
    TrendResponse, UserDto, VersionResponse, WeeklyAverageDto,
};

pub const CRATE_NAME: &str = "weightlog-api";
pub const API_VERSION: &str = "v1";
