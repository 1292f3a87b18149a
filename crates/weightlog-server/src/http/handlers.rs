// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::sync::atomic::Ordering;

use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use weightlog_api::params::{
    parse_export_format_param, parse_time_range_param, parse_trends_params, ExportFormat,
};
use weightlog_api::{
    export_csv, openapi_v1_spec, AddWeightRequest, LoginRequest, PasswordResetRequest,
    ResetPasswordRequest, SetGoalRequest, SignupRequest, UpdateEmailRequest,
    UpdatePasswordRequest, VerifyEmailRequest, VersionResponse, API_VERSION,
};
use weightlog_core::canonical::stable_json_hash_hex;

use crate::auth::AuthUser;
use crate::error::ServiceError;
use crate::http::extract::ApiJson;
use crate::services::{self, blocking};
use crate::AppState;

type QueryMap = Query<BTreeMap<String, String>>;

pub(crate) fn if_none_match(headers: &HeaderMap) -> Option<String> {
    headers
        .get("if-none-match")
        .and_then(|v| v.to_str().ok())
        .map(std::string::ToString::to_string)
}

/// Per-user data: caches must revalidate every time.
pub(crate) fn put_cache_headers(headers: &mut HeaderMap, etag: &str) {
    headers.insert("cache-control", HeaderValue::from_static("private, no-cache"));
    if let Ok(value) = HeaderValue::from_str(etag) {
        headers.insert("etag", value);
    }
}

/// JSON body tagged with a content hash; answers 304 when the client
/// already holds it.
fn cached_json<T: Serialize>(headers: &HeaderMap, body: &T) -> Result<Response, ServiceError> {
    let hash = stable_json_hash_hex(body)
        .map_err(|e| ServiceError::Internal(format!("response hashing failed: {e}")))?;
    let etag = format!("\"{hash}\"");
    let mut response = if if_none_match(headers).as_deref() == Some(etag.as_str()) {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        Json(body).into_response()
    };
    put_cache_headers(response.headers_mut(), &etag);
    Ok(response)
}

pub(crate) async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(crate) async fn readyz_handler(State(state): State<AppState>) -> Result<&'static str, ServiceError> {
    if !state.ready.load(Ordering::Relaxed) {
        return Err(ServiceError::NotReady);
    }
    blocking(&state, |s| s.ping())
        .await
        .map_err(|_| ServiceError::NotReady)?;
    Ok("ready")
}

pub(crate) async fn version_handler(
    State(state): State<AppState>,
) -> Result<Json<VersionResponse>, ServiceError> {
    let schema_version = blocking(&state, |s| s.schema_version()).await?;
    Ok(Json(VersionResponse {
        service: crate::CRATE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        api_version: API_VERSION.to_string(),
        schema_version,
    }))
}

pub(crate) async fn openapi_handler() -> impl IntoResponse {
    Json(openapi_v1_spec())
}

pub(crate) async fn signup_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<Response, ServiceError> {
    Ok(Json(services::auth::signup(&state, req).await?).into_response())
}

pub(crate) async fn login_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Response, ServiceError> {
    Ok(Json(services::auth::login(&state, req).await?).into_response())
}

pub(crate) async fn verify_email_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<VerifyEmailRequest>,
) -> Result<Response, ServiceError> {
    Ok(Json(services::auth::verify_email(&state, req).await?).into_response())
}

pub(crate) async fn request_password_reset_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PasswordResetRequest>,
) -> Result<Response, ServiceError> {
    Ok(Json(services::auth::request_password_reset(&state, req).await?).into_response())
}

pub(crate) async fn reset_password_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ResetPasswordRequest>,
) -> Result<Response, ServiceError> {
    Ok(Json(services::auth::reset_password(&state, req).await?).into_response())
}

pub(crate) async fn list_weights_handler(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    Query(query): QueryMap,
) -> Result<Response, ServiceError> {
    let range = parse_time_range_param(&query)?;
    let body = services::weights::list(&state, &user, range).await?;
    cached_json(&headers, &body)
}

pub(crate) async fn add_weight_handler(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<AddWeightRequest>,
) -> Result<Response, ServiceError> {
    let body = services::weights::add(&state, &user, req).await?;
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub(crate) async fn delete_weight_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    Ok(Json(services::weights::delete(&state, &user, &id).await?).into_response())
}

pub(crate) async fn export_weights_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): QueryMap,
) -> Result<Response, ServiceError> {
    let format = parse_export_format_param(&query)?;
    let rows = services::weights::export_rows(&state, &user).await?;
    let (body, filename) = match format {
        ExportFormat::Json => (
            serde_json::to_string(&rows)
                .map_err(|e| ServiceError::Internal(format!("export encoding failed: {e}")))?,
            "weights.json",
        ),
        ExportFormat::Csv => (export_csv(&rows), "weights.csv"),
    };
    let mut response = body.into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(format.content_type()));
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\"")) {
        headers.insert(CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

pub(crate) async fn get_goal_handler(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, ServiceError> {
    Ok(Json(services::goals::get(&state, &user).await?).into_response())
}

pub(crate) async fn set_goal_handler(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<SetGoalRequest>,
) -> Result<Response, ServiceError> {
    Ok(Json(services::goals::set(&state, &user, req).await?).into_response())
}

pub(crate) async fn clear_goal_handler(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, ServiceError> {
    Ok(Json(services::goals::clear(&state, &user).await?).into_response())
}

pub(crate) async fn trends_handler(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    Query(query): QueryMap,
) -> Result<Response, ServiceError> {
    let params = parse_trends_params(&query)?;
    let body = services::trends::trends(&state, &user, params).await?;
    cached_json(&headers, &body)
}

pub(crate) async fn progress_email_handler(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, ServiceError> {
    Ok(Json(services::trends::progress_email(&state, &user).await?).into_response())
}

pub(crate) async fn delete_account_handler(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, ServiceError> {
    Ok(Json(services::account::delete(&state, &user).await?).into_response())
}

pub(crate) async fn update_password_handler(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<UpdatePasswordRequest>,
) -> Result<Response, ServiceError> {
    Ok(Json(services::account::update_password(&state, &user, req).await?).into_response())
}

pub(crate) async fn update_email_handler(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<UpdateEmailRequest>,
) -> Result<Response, ServiceError> {
    Ok(Json(services::account::update_email(&state, &user, req).await?).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_etag_yields_not_modified() {
        let body = serde_json::json!({"measurements": []});
        let first = cached_json(&HeaderMap::new(), &body).expect("response");
        assert_eq!(first.status(), StatusCode::OK);
        let etag = first.headers().get("etag").expect("etag").clone();
        assert_eq!(
            first.headers().get("cache-control").and_then(|v| v.to_str().ok()),
            Some("private, no-cache")
        );

        let mut headers = HeaderMap::new();
        headers.insert("if-none-match", etag.clone());
        let second = cached_json(&headers, &body).expect("response");
        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(second.headers().get("etag"), Some(&etag));
    }

    #[test]
    fn stale_etag_returns_full_body() {
        let mut headers = HeaderMap::new();
        headers.insert("if-none-match", HeaderValue::from_static("\"stale\""));
        let resp = cached_json(&headers, &serde_json::json!({"a": 1})).expect("response");
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
