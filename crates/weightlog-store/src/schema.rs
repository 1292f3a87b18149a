// SPDX-License-Identifier: Apache-2.0

use rusqlite::Connection;
use tracing::info;

use crate::StoreError;

pub const SCHEMA_VERSION: i64 = 1;

const MIGRATIONS: [(i64, &str); 1] = [(
    1,
    "
    CREATE TABLE users (
      id TEXT PRIMARY KEY,
      email TEXT NOT NULL UNIQUE,
      password_hash TEXT NOT NULL,
      is_email_verified INTEGER NOT NULL DEFAULT 0,
      verification_token TEXT,
      reset_password_token TEXT,
      reset_password_expires_at TEXT,
      created_at TEXT NOT NULL
    );
    CREATE INDEX idx_users_verification_token ON users(verification_token);
    CREATE INDEX idx_users_reset_password_token ON users(reset_password_token);
    CREATE TABLE weight_measurements (
      id TEXT PRIMARY KEY,
      user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
      weight_kg REAL NOT NULL CHECK (weight_kg > 0),
      note TEXT,
      created_at TEXT NOT NULL
    );
    CREATE INDEX idx_weight_measurements_user_created
      ON weight_measurements(user_id, created_at);
    CREATE TABLE goals (
      user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
      goal_weight_kg REAL NOT NULL CHECK (goal_weight_kg > 0),
      start_weight_kg REAL NOT NULL CHECK (start_weight_kg > 0),
      goal_set_at TEXT NOT NULL
    );
    ",
)];

pub(crate) fn user_version(conn: &Connection) -> Result<i64, StoreError> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

pub(crate) fn migrate(conn: &mut Connection) -> Result<(), StoreError> {
    let found = user_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(StoreError::SchemaTooNew {
            found,
            supported: SCHEMA_VERSION,
        });
    }
    for (version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > found) {
        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.execute_batch(&format!("PRAGMA user_version={version};"))?;
        tx.commit()?;
        info!(schema_version = version, "applied store migration");
    }
    Ok(())
}
