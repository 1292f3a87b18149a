// SPDX-License-Identifier: Apache-2.0

use tracing::warn;
use weightlog_api::{DeleteAccountResponse, MessageResponse, UpdateEmailRequest, UpdatePasswordRequest};
use weightlog_model::generate_token;

use super::{audit, blocking};
use crate::auth::{hash_password, AuthUser};
use crate::error::ServiceError;
use crate::mail::templates;
use crate::AppState;

/// Removes the user with every measurement and goal they own.
pub async fn delete(state: &AppState, user: &AuthUser) -> Result<DeleteAccountResponse, ServiceError> {
    let id = user.id;
    if !blocking(state, move |s| s.delete_user(id)).await? {
        return Err(ServiceError::Unauthorized("account no longer exists"));
    }
    audit(state, "account_deleted", id);
    Ok(DeleteAccountResponse {
        message: "Account deleted successfully".to_string(),
        user_id: id,
    })
}

pub async fn update_password(
    state: &AppState,
    user: &AuthUser,
    req: UpdatePasswordRequest,
) -> Result<MessageResponse, ServiceError> {
    let password = req.validate()?;
    let hash = hash_password(password, state.config.auth.bcrypt_cost).await?;
    let id = user.id;
    blocking(state, move |s| s.update_password_hash(id, &hash)).await?;
    audit(state, "password_updated", id);
    Ok(MessageResponse::new("Password updated successfully"))
}

/// The new address starts unverified and gets its own verification link.
/// A mail failure is reported but the change stays committed.
pub async fn update_email(
    state: &AppState,
    user: &AuthUser,
    req: UpdateEmailRequest,
) -> Result<MessageResponse, ServiceError> {
    let email = req.validate()?;
    let lookup = email.clone();
    if blocking(state, move |s| s.user_by_email(&lookup)).await?.is_some() {
        return Err(ServiceError::Conflict("Email already in use"));
    }

    let token = generate_token();
    let id = user.id;
    let stored_email = email.clone();
    let stored_token = token.clone();
    blocking(state, move |s| s.update_email(id, &stored_email, &stored_token)).await?;
    audit(state, "email_updated", id);

    let mail = templates::verification_email(&state.config.app_url, email.as_str(), &token);
    if let Err(err) = state.mailer.send(&mail).await {
        warn!(user_id = %id, error = %err, "verification email for new address failed");
        return Err(err.into());
    }
    Ok(MessageResponse::new("Email updated successfully"))
}
