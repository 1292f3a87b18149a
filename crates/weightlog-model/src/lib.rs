// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Validated domain types shared by the store, API, and server layers.

mod account;
mod error;
mod goal;
mod ids;
mod measurement;
mod time_range;

pub use account::{
    generate_token, Email, Password, User, EMAIL_MAX_LEN, PASSWORD_MAX_BYTES, PASSWORD_MIN_LEN,
};
pub use error::ParseError;
pub use goal::{Goal, GoalDirection, GoalProgress};
pub use ids::{MeasurementId, UserId};
pub use measurement::{truncate_to_millis, ExportRow, Measurement, Note, WeightKg, NOTE_MAX_LEN, WEIGHT_MAX_KG};
pub use time_range::TimeRange;

pub const CRATE_NAME: &str = "weightlog-model";
