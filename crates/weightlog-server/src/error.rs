// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{debug, error};
use weightlog_api::{ApiError, ApiErrorCode, UNKNOWN_REQUEST_ID};
use weightlog_store::StoreError;

use crate::mail::MailError;

tokio::task_local! {
    pub(crate) static REQUEST_ID: String;
}

/// Request id of the request being served, or `req-unknown` outside one.
#[must_use]
pub fn current_request_id() -> String {
    REQUEST_ID
        .try_with(String::clone)
        .unwrap_or_else(|_| UNKNOWN_REQUEST_ID.to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{}", .0.message)]
    BadRequest(ApiError),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("request body too large")]
    PayloadTooLarge,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Email not verified")]
    EmailNotVerified,
    #[error("Email not verified")]
    ResetRequiresVerifiedEmail,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Failed to send email: {0}")]
    Mail(#[from] MailError),
    #[error("request timed out")]
    Timeout,
    #[error("service not ready")]
    NotReady,
    #[error("storage failure: {0}")]
    Store(StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict("email") => Self::Conflict("Email already in use"),
            StoreError::NotFound("user") => Self::Unauthorized("account no longer exists"),
            other => Self::Store(other),
        }
    }
}

impl From<ApiError> for ServiceError {
    fn from(err: ApiError) -> Self {
        Self::BadRequest(err)
    }
}

impl ServiceError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_)
            | Self::MalformedBody(_)
            | Self::ResetRequiresVerifiedEmail
            | Self::InvalidToken => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InvalidCredentials | Self::EmailNotVerified | Self::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Mail(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wire form of the error. Internal causes never reach the client.
    #[must_use]
    pub fn to_api_error(&self) -> ApiError {
        match self {
            Self::BadRequest(err) => err.clone(),
            Self::MalformedBody(reason) => ApiError::new(
                ApiErrorCode::ValidationFailed,
                "malformed request body",
                json!({"reason": reason}),
            ),
            Self::PayloadTooLarge => {
                ApiError::simple(ApiErrorCode::PayloadTooLarge, "request body too large")
            }
            Self::InvalidCredentials => {
                ApiError::simple(ApiErrorCode::InvalidCredentials, self.to_string())
            }
            Self::EmailNotVerified | Self::ResetRequiresVerifiedEmail => {
                ApiError::simple(ApiErrorCode::EmailNotVerified, self.to_string())
            }
            Self::InvalidToken => ApiError::simple(ApiErrorCode::InvalidToken, self.to_string()),
            Self::Unauthorized(msg) => ApiError::simple(ApiErrorCode::Unauthorized, *msg),
            Self::Conflict(msg) => ApiError::simple(ApiErrorCode::Conflict, *msg),
            Self::NotFound(msg) => ApiError::simple(ApiErrorCode::NotFound, *msg),
            Self::Mail(_) => {
                ApiError::simple(ApiErrorCode::MailDeliveryFailed, "Failed to send email")
            }
            Self::Timeout => ApiError::simple(ApiErrorCode::Timeout, "request timed out"),
            Self::NotReady => ApiError::simple(ApiErrorCode::NotReady, "service not ready"),
            Self::Store(_) | Self::Internal(_) => {
                ApiError::simple(ApiErrorCode::Internal, "internal server error")
            }
        }
    }
}

pub(crate) fn api_error_response(status: StatusCode, err: ApiError) -> Response {
    let body = Json(json!({"error": err}));
    (status, body).into_response()
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        let body = self.to_api_error().with_request_id(current_request_id());
        api_error_response(status, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_conflicts_and_missing_users_map_to_client_errors() {
        let conflict = ServiceError::from(StoreError::Conflict("email"));
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
        assert_eq!(conflict.to_api_error().message, "Email already in use");

        let gone = ServiceError::from(StoreError::NotFound("user"));
        assert_eq!(gone.status(), StatusCode::UNAUTHORIZED);

        let other = ServiceError::from(StoreError::Poisoned);
        assert_eq!(other.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(other.to_api_error().code, ApiErrorCode::Internal);
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let err = ServiceError::Internal("disk on fire at /var/lib".into());
        assert_eq!(err.to_api_error().message, "internal server error");
    }

    #[tokio::test]
    async fn request_id_comes_from_the_task_scope() {
        assert_eq!(current_request_id(), UNKNOWN_REQUEST_ID);
        let inside = REQUEST_ID
            .scope("req-42".to_string(), async { current_request_id() })
            .await;
        assert_eq!(inside, "req-42");
    }
}
