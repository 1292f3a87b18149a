// SPDX-License-Identifier: Apache-2.0

use chrono::Duration;
use tracing::warn;
use weightlog_api::{
    user_dto, LoginRequest, LoginResponse, MessageResponse, PasswordResetRequest,
    ResetPasswordRequest, SignupRequest, VerifyEmailRequest,
};
use weightlog_model::{generate_token, User};

use super::{audit, blocking};
use crate::auth::{hash_password, verify_password};
use crate::error::ServiceError;
use crate::mail::templates;
use crate::AppState;

pub async fn signup(state: &AppState, req: SignupRequest) -> Result<MessageResponse, ServiceError> {
    let (email, password) = req.validate()?;
    let lookup = email.clone();
    if blocking(state, move |s| s.user_by_email(&lookup)).await?.is_some() {
        return Err(ServiceError::Conflict("Email already exists"));
    }

    let hash = hash_password(password, state.config.auth.bcrypt_cost).await?;
    let token = generate_token();
    let user = User::new_unverified(email, hash, token.clone(), state.clock.now());
    let user_id = user.id;
    let to = user.email.as_str().to_string();
    blocking(state, move |s| s.create_user(&user))
        .await
        .map_err(|e| match e {
            ServiceError::Conflict(_) => ServiceError::Conflict("Email already exists"),
            other => other,
        })?;

    let mail = templates::verification_email(&state.config.app_url, &to, &token);
    if let Err(err) = state.mailer.send(&mail).await {
        warn!(user_id = %user_id, error = %err, "verification email failed, rolling back signup");
        blocking(state, move |s| s.delete_user(user_id)).await?;
        return Err(err.into());
    }
    audit(state, "signup", user_id);
    Ok(MessageResponse::new("Signup successful. Please verify your email."))
}

/// Unknown email and wrong password are indistinguishable; the verification
/// state is only revealed once the password matches.
pub async fn login(state: &AppState, req: LoginRequest) -> Result<LoginResponse, ServiceError> {
    let (email, password) = req.validate()?;
    let user = blocking(state, move |s| s.user_by_email(&email))
        .await?
        .ok_or(ServiceError::InvalidCredentials)?;
    if !verify_password(password, user.password_hash.clone()).await? {
        return Err(ServiceError::InvalidCredentials);
    }
    if !user.is_email_verified {
        return Err(ServiceError::EmailNotVerified);
    }
    let token = state
        .tokens
        .issue(user.id, &user.email, state.clock.now())
        .map_err(|e| ServiceError::Internal(format!("token signing failed: {e}")))?;
    audit(state, "login", user.id);
    Ok(LoginResponse {
        token,
        user: user_dto(&user),
    })
}

pub async fn verify_email(
    state: &AppState,
    req: VerifyEmailRequest,
) -> Result<MessageResponse, ServiceError> {
    let token = req.validate()?.to_string();
    let user = blocking(state, move |s| s.user_by_verification_token(&token))
        .await?
        .ok_or(ServiceError::InvalidToken)?;
    let id = user.id;
    blocking(state, move |s| s.mark_email_verified(id))
        .await
        .map_err(vanished_user_is_invalid_token)?;
    Ok(MessageResponse::new("Email verified successfully"))
}

pub async fn request_password_reset(
    state: &AppState,
    req: PasswordResetRequest,
) -> Result<MessageResponse, ServiceError> {
    let email = req.validate()?;
    let user = blocking(state, move |s| s.user_by_email(&email))
        .await?
        .ok_or(ServiceError::NotFound("Email not found"))?;
    if !user.is_email_verified {
        return Err(ServiceError::ResetRequiresVerifiedEmail);
    }

    let token = generate_token();
    let ttl = state.config.auth.reset_token_ttl;
    let expires_at = state.clock.now()
        + Duration::from_std(ttl)
            .map_err(|e| ServiceError::Internal(format!("reset token ttl out of range: {e}")))?;
    let id = user.id;
    let stored = token.clone();
    blocking(state, move |s| s.set_reset_token(id, &stored, expires_at)).await?;

    let mail = templates::password_reset_email(
        &state.config.app_url,
        user.email.as_str(),
        &token,
        ttl.as_secs() / 3600,
    );
    state.mailer.send(&mail).await?;
    Ok(MessageResponse::new("Password reset email sent"))
}

pub async fn reset_password(
    state: &AppState,
    req: ResetPasswordRequest,
) -> Result<MessageResponse, ServiceError> {
    let (token, password) = req.validate()?;
    let token = token.to_string();
    let now = state.clock.now();
    let user = blocking(state, move |s| s.user_by_reset_token(&token, now))
        .await?
        .ok_or(ServiceError::InvalidToken)?;
    let hash = hash_password(password, state.config.auth.bcrypt_cost).await?;
    let id = user.id;
    blocking(state, move |s| s.update_password_hash(id, &hash))
        .await
        .map_err(vanished_user_is_invalid_token)?;
    audit(state, "password_reset", id);
    Ok(MessageResponse::new("Password reset successfully"))
}

/// A token that matched a user who was deleted before the update landed.
fn vanished_user_is_invalid_token(err: ServiceError) -> ServiceError {
    match err {
        ServiceError::Unauthorized(_) => ServiceError::InvalidToken,
        other => other,
    }
}
