// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use weightlog_model::{Email, Note, Password, WeightKg};

use crate::errors::{ApiError, FieldErrors};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(Email, Password), ApiError> {
        let mut errors = FieldErrors::default();
        let email = errors.check(Email::parse(&self.email));
        let password = errors.check(Password::parse_new(&self.password));
        errors.into_result()?;
        Ok((present(email)?, present(password)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(Email, Password), ApiError> {
        let mut errors = FieldErrors::default();
        let email = errors.check(Email::parse(&self.email));
        let password = errors.check(Password::parse_login(&self.password));
        errors.into_result()?;
        Ok((present(email)?, present(password)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VerifyEmailRequest {
    pub token: String,
}

impl VerifyEmailRequest {
    pub fn validate(&self) -> Result<&str, ApiError> {
        non_empty_token(&self.token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PasswordResetRequest {
    pub email: String,
}

impl PasswordResetRequest {
    pub fn validate(&self) -> Result<Email, ApiError> {
        let mut errors = FieldErrors::default();
        let email = errors.check(Email::parse(&self.email));
        errors.into_result()?;
        present(email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

impl ResetPasswordRequest {
    pub fn validate(&self) -> Result<(&str, Password), ApiError> {
        let mut errors = FieldErrors::default();
        if self.token.trim().is_empty() {
            errors.push("token", "token must not be empty");
        }
        let password = errors.check_as("newPassword", Password::parse_new(&self.new_password));
        errors.into_result()?;
        Ok((self.token.as_str(), present(password)?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddWeightRequest {
    pub weight_kg: f64,
    #[serde(default)]
    pub note: Option<String>,
}

impl AddWeightRequest {
    pub fn validate(&self) -> Result<(WeightKg, Option<Note>), ApiError> {
        let mut errors = FieldErrors::default();
        let weight = errors.check(WeightKg::parse(self.weight_kg));
        let note = errors.check(Note::parse(self.note.as_deref()));
        errors.into_result()?;
        Ok((present(weight)?, present(note)?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetGoalRequest {
    pub goal_weight_kg: f64,
    pub start_weight_kg: f64,
}

impl SetGoalRequest {
    pub fn validate(&self) -> Result<(WeightKg, WeightKg), ApiError> {
        let mut errors = FieldErrors::default();
        let goal = errors.check_as("goalWeightKg", WeightKg::parse(self.goal_weight_kg));
        let start = errors.check_as("startWeightKg", WeightKg::parse(self.start_weight_kg));
        errors.into_result()?;
        Ok((present(goal)?, present(start)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePasswordRequest {
    pub new_password: String,
}

impl UpdatePasswordRequest {
    pub fn validate(&self) -> Result<Password, ApiError> {
        let mut errors = FieldErrors::default();
        let password = errors.check_as("newPassword", Password::parse_new(&self.new_password));
        errors.into_result()?;
        present(password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateEmailRequest {
    pub new_email: String,
}

impl UpdateEmailRequest {
    pub fn validate(&self) -> Result<Email, ApiError> {
        let mut errors = FieldErrors::default();
        let email = errors.check_as("newEmail", Email::parse(&self.new_email));
        errors.into_result()?;
        present(email)
    }
}

fn present<T>(value: Option<T>) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::validation_failed(serde_json::Value::Array(Vec::new())))
}

fn non_empty_token(token: &str) -> Result<&str, ApiError> {
    let mut errors = FieldErrors::default();
    if token.trim().is_empty() {
        errors.push("token", "token must not be empty");
    }
    errors.into_result()?;
    Ok(token)
}
