// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use weightlog_model::ParseError;

pub const UNKNOWN_REQUEST_ID: &str = "req-unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ApiErrorCode {
    InvalidQueryParameter,
    ValidationFailed,
    Unauthorized,
    EmailNotVerified,
    InvalidCredentials,
    InvalidToken,
    Conflict,
    NotFound,
    PayloadTooLarge,
    Timeout,
    NotReady,
    MailDeliveryFailed,
    Internal,
}

impl ApiErrorCode {
    pub const ALL: [Self; 13] = [
        Self::InvalidQueryParameter,
        Self::ValidationFailed,
        Self::Unauthorized,
        Self::EmailNotVerified,
        Self::InvalidCredentials,
        Self::InvalidToken,
        Self::Conflict,
        Self::NotFound,
        Self::PayloadTooLarge,
        Self::Timeout,
        Self::NotReady,
        Self::MailDeliveryFailed,
        Self::Internal,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidQueryParameter => "invalid_query_parameter",
            Self::ValidationFailed => "validation_failed",
            Self::Unauthorized => "unauthorized",
            Self::EmailNotVerified => "email_not_verified",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidToken => "invalid_token",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::PayloadTooLarge => "payload_too_large",
            Self::Timeout => "timeout",
            Self::NotReady => "not_ready",
            Self::MailDeliveryFailed => "mail_delivery_failed",
            Self::Internal => "internal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
    pub request_id: String,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            request_id: UNKNOWN_REQUEST_ID.to_string(),
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    #[must_use]
    pub fn invalid_param(name: &str, value: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidQueryParameter,
            format!("invalid query parameter: {name}"),
            json!({"field_errors": [{"parameter": name, "reason": "invalid", "value": value}]}),
        )
    }

    #[must_use]
    pub fn validation_failed(field_errors: Value) -> Self {
        Self::new(
            ApiErrorCode::ValidationFailed,
            "validation failed",
            json!({"field_errors": field_errors}),
        )
    }

    #[must_use]
    pub fn simple(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, message, json!({}))
    }
}

/// Accumulates per-field failures so a request reports all of them at once.
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<Value>);

impl FieldErrors {
    pub fn check<T>(&mut self, result: Result<T, ParseError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(err.field(), &err.to_string());
                None
            }
        }
    }

    /// Like [`FieldErrors::check`] but reports under the request's field name.
    pub fn check_as<T>(&mut self, field: &str, result: Result<T, ParseError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(field, &err.to_string());
                None
            }
        }
    }

    pub fn push(&mut self, field: &str, reason: &str) {
        self.0.push(json!({"field": field, "reason": reason}));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_failed(Value::Array(self.0)))
        }
    }
}
