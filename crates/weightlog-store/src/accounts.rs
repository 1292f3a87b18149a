// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use weightlog_model::{Email, User, UserId};

use crate::codec::{corrupt, decode_ts, encode_ts, is_unique_violation};
use crate::{AccountStore, SqliteStore, StoreError};

const TABLE: &str = "users";

const USER_COLUMNS: &str = "id, email, password_hash, is_email_verified, verification_token, \
     reset_password_token, reset_password_expires_at, created_at";

struct RawUserRow {
    id: String,
    email: String,
    password_hash: String,
    is_email_verified: bool,
    verification_token: Option<String>,
    reset_password_token: Option<String>,
    reset_password_expires_at: Option<String>,
    created_at: String,
}

impl RawUserRow {
    fn from_sql_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            is_email_verified: row.get(3)?,
            verification_token: row.get(4)?,
            reset_password_token: row.get(5)?,
            reset_password_expires_at: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    fn decode(self) -> Result<User, StoreError> {
        Ok(User {
            id: UserId::parse(&self.id).map_err(|e| corrupt(TABLE, e))?,
            email: Email::parse(&self.email).map_err(|e| corrupt(TABLE, e))?,
            password_hash: self.password_hash,
            is_email_verified: self.is_email_verified,
            verification_token: self.verification_token,
            reset_password_token: self.reset_password_token,
            reset_password_expires_at: self
                .reset_password_expires_at
                .as_deref()
                .map(|raw| decode_ts(TABLE, raw))
                .transpose()?,
            created_at: decode_ts(TABLE, &self.created_at)?,
        })
    }
}

impl SqliteStore {
    fn user_where(&self, clause: &str, key: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause}");
        self.with_conn(|conn| {
            let raw = conn
                .prepare_cached(&sql)?
                .query_row([key], RawUserRow::from_sql_row)
                .optional()?;
            raw.map(RawUserRow::decode).transpose()
        })
    }

    fn update_user(&self, sql: &str, args: impl rusqlite::Params) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let changed = conn.prepare_cached(sql)?.execute(args).map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Conflict("email")
                } else {
                    StoreError::Sqlite(e)
                }
            })?;
            if changed == 0 {
                return Err(StoreError::NotFound("user"));
            }
            Ok(())
        })
    }
}

impl AccountStore for SqliteStore {
    fn create_user(&self, user: &User) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.prepare_cached(
                "INSERT INTO users (id, email, password_hash, is_email_verified, verification_token, \
                 reset_password_token, reset_password_expires_at, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?
            .execute(params![
                user.id.to_string(),
                user.email.as_str(),
                user.password_hash,
                user.is_email_verified,
                user.verification_token,
                user.reset_password_token,
                user.reset_password_expires_at.map(encode_ts),
                encode_ts(user.created_at),
            ])
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Conflict("email")
                } else {
                    StoreError::Sqlite(e)
                }
            })?;
            Ok(())
        })
    }

    fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.user_where("id = ?1", &id.to_string())
    }

    fn user_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        self.user_where("email = ?1", email.as_str())
    }

    fn user_by_verification_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        if token.is_empty() {
            return Ok(None);
        }
        self.user_where("verification_token = ?1", token)
    }

    fn mark_email_verified(&self, id: UserId) -> Result<(), StoreError> {
        self.update_user(
            "UPDATE users SET is_email_verified = 1, verification_token = NULL WHERE id = ?1",
            params![id.to_string()],
        )
    }

    fn set_reset_token(
        &self,
        id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.update_user(
            "UPDATE users SET reset_password_token = ?2, reset_password_expires_at = ?3 WHERE id = ?1",
            params![id.to_string(), token, encode_ts(expires_at)],
        )
    }

    fn user_by_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        if token.is_empty() {
            return Ok(None);
        }
        Ok(self
            .user_where("reset_password_token = ?1", token)?
            .filter(|user| user.reset_token_valid_at(token, now)))
    }

    fn update_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), StoreError> {
        self.update_user(
            "UPDATE users SET password_hash = ?2, reset_password_token = NULL, \
             reset_password_expires_at = NULL WHERE id = ?1",
            params![id.to_string(), password_hash],
        )
    }

    fn update_email(
        &self,
        id: UserId,
        email: &Email,
        verification_token: &str,
    ) -> Result<(), StoreError> {
        self.update_user(
            "UPDATE users SET email = ?2, is_email_verified = 0, verification_token = ?3 WHERE id = ?1",
            params![id.to_string(), email.as_str(), verification_token],
        )
    }

    fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let changed = conn
                .prepare_cached("DELETE FROM users WHERE id = ?1")?
                .execute([id.to_string()])?;
            Ok(changed > 0)
        })
    }
}
