// SPDX-License-Identifier: Apache-2.0

//! Use cases behind the HTTP routes. Handlers parse and render; everything
//! that touches the store, the mailer, or the clock lives here.

pub mod account;
pub mod auth;
pub mod goals;
pub mod trends;
pub mod weights;

use std::sync::Arc;

use tracing::info;
use weightlog_model::UserId;
use weightlog_store::{Store, StoreError};

use crate::error::{current_request_id, ServiceError};
use crate::AppState;

/// Runs a store call on the blocking pool.
pub(crate) async fn blocking<T, F>(state: &AppState, f: F) -> Result<T, ServiceError>
where
    T: Send + 'static,
    F: FnOnce(&dyn Store) -> Result<T, StoreError> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| ServiceError::Internal(format!("store task failed: {e}")))?
        .map_err(ServiceError::from)
}

pub(crate) fn audit(state: &AppState, event: &'static str, user: UserId) {
    if state.config.api.enable_audit_log {
        info!(
            target: "weightlog_audit",
            event,
            user_id = %user,
            request_id = %current_request_id(),
            "audit"
        );
    }
}
