// SPDX-License-Identifier: Apache-2.0

use weightlog_api::{measurement_dto, AddWeightRequest, AddWeightResponse, MeasurementsResponse, MessageResponse};
use weightlog_model::{ExportRow, Measurement, MeasurementId, TimeRange};

use super::blocking;
use crate::auth::AuthUser;
use crate::error::ServiceError;
use crate::AppState;

/// Newest first.
pub async fn list(
    state: &AppState,
    user: &AuthUser,
    range: TimeRange,
) -> Result<MeasurementsResponse, ServiceError> {
    let since = range.since(state.clock.now());
    let owner = user.id;
    let rows = blocking(state, move |s| s.measurements_descending(owner, since)).await?;
    Ok(MeasurementsResponse {
        measurements: rows.iter().map(measurement_dto).collect(),
    })
}

pub async fn add(
    state: &AppState,
    user: &AuthUser,
    req: AddWeightRequest,
) -> Result<AddWeightResponse, ServiceError> {
    let (weight, note) = req.validate()?;
    let measurement = Measurement::new(user.id, weight, note, state.clock.now());
    let dto = measurement_dto(&measurement);
    blocking(state, move |s| s.insert_measurement(&measurement)).await?;
    Ok(AddWeightResponse {
        message: "Weight added".to_string(),
        measurement: dto,
    })
}

/// Ids that are malformed or owned by someone else look the same as
/// missing ones.
pub async fn delete(state: &AppState, user: &AuthUser, id: &str) -> Result<MessageResponse, ServiceError> {
    let not_found = ServiceError::NotFound("Measurement not found");
    let Ok(id) = MeasurementId::parse(id) else {
        return Err(not_found);
    };
    let owner = user.id;
    if blocking(state, move |s| s.delete_measurement(owner, id)).await? {
        Ok(MessageResponse::new("Weight deleted"))
    } else {
        Err(not_found)
    }
}

/// Oldest first.
pub async fn export_rows(state: &AppState, user: &AuthUser) -> Result<Vec<ExportRow>, ServiceError> {
    let owner = user.id;
    let rows = blocking(state, move |s| s.measurements_ascending(owner, None)).await?;
    Ok(rows.iter().map(ExportRow::from_measurement).collect())
}
