// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ParseError, UserId};

pub const EMAIL_MAX_LEN: usize = 254;
pub const PASSWORD_MIN_LEN: usize = 6;
/// bcrypt only reads the first 72 bytes of a password.
pub const PASSWORD_MAX_BYTES: usize = 72;

/// Normalized (trimmed, lower-cased) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let normalized = input.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(ParseError::Empty("email"));
        }
        if normalized.len() > EMAIL_MAX_LEN {
            return Err(ParseError::TooLong("email", EMAIL_MAX_LEN));
        }
        let invalid = ParseError::Invalid {
            field: "email",
            reason: "must be a valid email address",
        };
        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(invalid);
        };
        let domain_ok = !domain.contains('@')
            && domain.contains('.')
            && domain
                .split('.')
                .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'));
        if local.is_empty() || !domain_ok || normalized.chars().any(char::is_whitespace) {
            return Err(invalid);
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// Plain-text password as received from a client. Never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Rules for a password being set: signup, reset, and change.
    pub fn parse_new(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty("password"));
        }
        if input.chars().count() < PASSWORD_MIN_LEN {
            return Err(ParseError::TooShort("password", PASSWORD_MIN_LEN));
        }
        Self::parse_login(input)
    }

    /// Login only needs something to compare against the stored hash.
    pub fn parse_login(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty("password"));
        }
        if input.len() > PASSWORD_MAX_BYTES {
            return Err(ParseError::TooLong("password", PASSWORD_MAX_BYTES));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Opaque single-use token for email verification and password reset links.
#[must_use]
pub fn generate_token() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub password_hash: String,
    pub is_email_verified: bool,
    pub verification_token: Option<String>,
    pub reset_password_token: Option<String>,
    pub reset_password_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn new_unverified(
        email: Email,
        password_hash: String,
        verification_token: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new_random(),
            email,
            password_hash,
            is_email_verified: false,
            verification_token: Some(verification_token),
            reset_password_token: None,
            reset_password_expires_at: None,
            created_at: crate::truncate_to_millis(created_at),
        }
    }

    #[must_use]
    pub fn reset_token_valid_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        self.reset_password_token.as_deref() == Some(token)
            && self.reset_password_expires_at.is_some_and(|exp| exp > now)
    }
}
