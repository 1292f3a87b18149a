// SPDX-License-Identifier: Apache-2.0

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;
use weightlog_model::UserId;

use crate::error::ServiceError;
use crate::AppState;

/// Caller identity proven by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ServiceError::Unauthorized("missing bearer token"))?;
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ServiceError::Unauthorized("missing bearer token"))?;
        let claims = state
            .tokens
            .verify(token, state.clock.now())
            .map_err(|e| {
                debug!(reason = %e, "rejected bearer token");
                ServiceError::Unauthorized("invalid or expired token")
            })?;
        let id = UserId::parse(&claims.sub)
            .map_err(|_| ServiceError::Unauthorized("invalid or expired token"))?;
        Ok(Self {
            id,
            email: claims.email,
        })
    }
}
