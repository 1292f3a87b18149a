// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! SQLite persistence for accounts, measurements, and goals.

mod accounts;
mod codec;
mod goals;
mod measurements;
mod schema;

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::debug;
use weightlog_model::{Email, Goal, Measurement, MeasurementId, User, UserId};
use weightlog_trend::Sample;

pub use schema::SCHEMA_VERSION;

pub const CRATE_NAME: &str = "weightlog-store";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0} already exists")]
    Conflict(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("corrupt row in {table}: {reason}")]
    Corrupt { table: &'static str, reason: String },
    #[error("database schema version {found} is newer than supported version {supported}")]
    SchemaTooNew { found: i64, supported: i64 },
    #[error("store connection lock poisoned")]
    Poisoned,
}

/// Users and their credentials.
pub trait AccountStore {
    fn create_user(&self, user: &User) -> Result<(), StoreError>;
    fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
    fn user_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;
    fn user_by_verification_token(&self, token: &str) -> Result<Option<User>, StoreError>;
    fn mark_email_verified(&self, id: UserId) -> Result<(), StoreError>;
    fn set_reset_token(
        &self,
        id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
    /// Only matches tokens whose expiry is strictly after `now`.
    fn user_by_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;
    /// Also consumes any outstanding reset token.
    fn update_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), StoreError>;
    /// Marks the account unverified and stores a fresh verification token.
    fn update_email(
        &self,
        id: UserId,
        email: &Email,
        verification_token: &str,
    ) -> Result<(), StoreError>;
    /// Removes the user together with their measurements and goal.
    fn delete_user(&self, id: UserId) -> Result<bool, StoreError>;
}

/// Append-only per-user weight samples.
pub trait MeasurementStore {
    fn insert_measurement(&self, measurement: &Measurement) -> Result<(), StoreError>;
    fn delete_measurement(&self, user: UserId, id: MeasurementId) -> Result<bool, StoreError>;
    fn measurements_ascending(
        &self,
        user: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Measurement>, StoreError>;
    fn measurements_descending(
        &self,
        user: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Measurement>, StoreError>;
    fn latest_measurement(&self, user: UserId) -> Result<Option<Measurement>, StoreError>;

    /// Trend engine input: one user's samples, oldest first.
    fn samples_ascending(
        &self,
        user: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Sample>, StoreError> {
        Ok(self
            .measurements_ascending(user, since)?
            .iter()
            .map(Measurement::sample)
            .collect())
    }
}

/// At most one current goal per user.
pub trait GoalStore {
    fn upsert_goal(&self, goal: &Goal) -> Result<(), StoreError>;
    fn goal_for(&self, user: UserId) -> Result<Option<Goal>, StoreError>;
    fn clear_goal(&self, user: UserId) -> Result<bool, StoreError>;
}

/// Everything the service needs from persistence.
pub trait Store: AccountStore + MeasurementStore + GoalStore + Send + Sync {
    fn schema_version(&self) -> Result<i64, StoreError>;
    /// Cheap round trip used by readiness checks.
    fn ping(&self) -> Result<(), StoreError>;
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        debug!(path = %path.display(), "opened sqlite store");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys=ON; PRAGMA temp_store=MEMORY;")?;
        conn.set_prepared_statement_cache_capacity(64);
        schema::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&mut guard)
    }
}

impl Store for SqliteStore {
    fn schema_version(&self) -> Result<i64, StoreError> {
        self.with_conn(|conn| schema::user_version(conn))
    }

    fn ping(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
    }
}
