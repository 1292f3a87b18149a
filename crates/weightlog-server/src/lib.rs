// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! HTTP service for the weight tracker: accounts, measurements, goals, and
//! trend analysis over a SQLite store.

use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;
use weightlog_store::Store;

pub mod auth;
mod clock;
mod config;
mod error;
mod http;
pub mod mail;
mod middleware;
pub mod services;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    ApiConfig, AuthConfig, ConfigError, MailConfig, MailTransport, ServerConfig,
    DEFAULT_BCRYPT_COST, DEFAULT_JWT_SECRET,
};
pub use error::{current_request_id, ServiceError};
pub use mail::{HttpMailer, LogMailer, MailError, Mailer, MemoryMailer, OutgoingEmail, RetryPolicy};

pub const CRATE_NAME: &str = "weightlog-server";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
    pub tokens: Arc<auth::TokenSigner>,
    pub config: Arc<ServerConfig>,
    pub ready: Arc<AtomicBool>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn Mailer>, config: ServerConfig) -> Self {
        Self::with_clock(store, mailer, Arc::new(SystemClock), config)
    }

    #[must_use]
    pub fn with_clock(
        store: Arc<dyn Store>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
        config: ServerConfig,
    ) -> Self {
        let tokens = auth::TokenSigner::new(config.auth.jwt_secret.as_bytes(), config.auth.token_ttl);
        Self {
            store,
            mailer,
            clock,
            tokens: Arc::new(tokens),
            config: Arc::new(config),
            ready: Arc::new(AtomicBool::new(false)),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

/// Falls back to the client's own origin when no list is configured.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let configured = if config.api.cors_allowed_origins.is_empty() {
        vec![config.app_url.trim_end_matches('/').to_string()]
    } else {
        config.api.cors_allowed_origins.clone()
    };
    let origins: Vec<HeaderValue> = configured
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    let request_id = HeaderName::from_static("x-request-id");
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, request_id.clone()])
        .expose_headers([HeaderName::from_static("etag"), request_id])
}

pub fn build_router(state: AppState) -> Router {
    use crate::http::handlers as h;
    use crate::middleware::request_tracing::request_tracing_middleware;
    use crate::middleware::timeout::timeout_middleware;

    Router::new()
        .route("/healthz", get(h::healthz_handler))
        .route("/readyz", get(h::readyz_handler))
        .route("/v1/version", get(h::version_handler))
        .route("/v1/openapi.json", get(h::openapi_handler))
        .route("/v1/auth/signup", post(h::signup_handler))
        .route("/v1/auth/login", post(h::login_handler))
        .route("/v1/auth/verify-email", post(h::verify_email_handler))
        .route(
            "/v1/auth/request-password-reset",
            post(h::request_password_reset_handler),
        )
        .route("/v1/auth/reset-password", post(h::reset_password_handler))
        .route(
            "/v1/weights",
            get(h::list_weights_handler).post(h::add_weight_handler),
        )
        .route("/v1/weights/export", get(h::export_weights_handler))
        .route("/v1/weights/:id", delete(h::delete_weight_handler))
        .route(
            "/v1/goal",
            get(h::get_goal_handler)
                .put(h::set_goal_handler)
                .delete(h::clear_goal_handler),
        )
        .route("/v1/trends", get(h::trends_handler))
        .route("/v1/trends/progress-email", post(h::progress_email_handler))
        .route("/v1/account", delete(h::delete_account_handler))
        .route("/v1/account/password", put(h::update_password_handler))
        .route("/v1/account/email", put(h::update_email_handler))
        .layer(from_fn_with_state(state.clone(), timeout_middleware))
        .layer(from_fn_with_state(state.clone(), request_tracing_middleware))
        .layer(cors_layer(&state.config))
        .layer(DefaultBodyLimit::max(state.config.api.max_body_bytes))
        .with_state(state)
}
