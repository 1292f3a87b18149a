// SPDX-License-Identifier: Apache-2.0

use weightlog_api::{goal_response, GoalResponse, MessageResponse, SetGoalRequest, SetGoalResponse};
use weightlog_model::Goal;

use super::blocking;
use crate::auth::AuthUser;
use crate::error::ServiceError;
use crate::AppState;

pub async fn get(state: &AppState, user: &AuthUser) -> Result<GoalResponse, ServiceError> {
    let owner = user.id;
    let (goal, latest) = blocking(state, move |s| {
        Ok((s.goal_for(owner)?, s.latest_measurement(owner)?))
    })
    .await?;
    Ok(goal_response(goal.as_ref(), latest.as_ref()))
}

/// Replaces any existing goal.
pub async fn set(
    state: &AppState,
    user: &AuthUser,
    req: SetGoalRequest,
) -> Result<SetGoalResponse, ServiceError> {
    let (goal_weight, start_weight) = req.validate()?;
    let goal = Goal::new(user.id, goal_weight, start_weight, state.clock.now());
    blocking(state, move |s| s.upsert_goal(&goal)).await?;
    Ok(SetGoalResponse {
        message: "Goal set successfully".to_string(),
        goal_weight_kg: goal_weight.get(),
    })
}

/// Clearing when no goal is set still succeeds.
pub async fn clear(state: &AppState, user: &AuthUser) -> Result<MessageResponse, ServiceError> {
    let owner = user.id;
    blocking(state, move |s| s.clear_goal(owner)).await?;
    Ok(MessageResponse::new("Goal cleared successfully"))
}
