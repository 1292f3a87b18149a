// SPDX-License-Identifier: Apache-2.0

use tracing::debug;
use weightlog_api::params::TrendsParams;
use weightlog_api::{trend_response, MessageResponse, TrendResponse};
use weightlog_trend::{compute_trends_with, rate_of_change};

use super::blocking;
use crate::auth::AuthUser;
use crate::error::ServiceError;
use crate::mail::templates;
use crate::AppState;

pub async fn trends(
    state: &AppState,
    user: &AuthUser,
    params: TrendsParams,
) -> Result<TrendResponse, ServiceError> {
    let since = params.time_range.since(state.clock.now());
    let owner = user.id;
    let samples = blocking(state, move |s| s.samples_ascending(owner, since)).await?;
    debug!(samples = samples.len(), scheme = params.week_scheme.as_str(), "computing trends");
    Ok(trend_response(&compute_trends_with(&samples, params.week_scheme)))
}

/// Rate of change over the whole history, mailed to the caller.
pub async fn progress_email(state: &AppState, user: &AuthUser) -> Result<MessageResponse, ServiceError> {
    let owner = user.id;
    let samples = blocking(state, move |s| s.samples_ascending(owner, None)).await?;
    if samples.len() < 2 {
        return Ok(MessageResponse::new("Not enough data"));
    }
    let mail = templates::progress_email(&user.email, rate_of_change(&samples));
    state.mailer.send(&mail).await?;
    Ok(MessageResponse::new("Progress email sent"))
}
