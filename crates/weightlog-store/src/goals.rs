// SPDX-License-Identifier: Apache-2.0

use rusqlite::{params, OptionalExtension};
use weightlog_model::{Goal, UserId, WeightKg};

use crate::codec::{corrupt, decode_ts, encode_ts, is_foreign_key_violation};
use crate::{GoalStore, SqliteStore, StoreError};

const TABLE: &str = "goals";

struct RawGoalRow {
    user_id: String,
    goal_weight_kg: f64,
    start_weight_kg: f64,
    goal_set_at: String,
}

impl RawGoalRow {
    fn from_sql_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get(0)?,
            goal_weight_kg: row.get(1)?,
            start_weight_kg: row.get(2)?,
            goal_set_at: row.get(3)?,
        })
    }

    fn decode(self) -> Result<Goal, StoreError> {
        Ok(Goal {
            user_id: UserId::parse(&self.user_id).map_err(|e| corrupt(TABLE, e))?,
            goal_weight_kg: WeightKg::parse(self.goal_weight_kg).map_err(|e| corrupt(TABLE, e))?,
            start_weight_kg: WeightKg::parse(self.start_weight_kg)
                .map_err(|e| corrupt(TABLE, e))?,
            goal_set_at: decode_ts(TABLE, &self.goal_set_at)?,
        })
    }
}

impl GoalStore for SqliteStore {
    fn upsert_goal(&self, goal: &Goal) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.prepare_cached(
                "INSERT INTO goals (user_id, goal_weight_kg, start_weight_kg, goal_set_at) \
                 VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(user_id) DO UPDATE SET goal_weight_kg = excluded.goal_weight_kg, \
                 start_weight_kg = excluded.start_weight_kg, goal_set_at = excluded.goal_set_at",
            )?
            .execute(params![
                goal.user_id.to_string(),
                goal.goal_weight_kg.get(),
                goal.start_weight_kg.get(),
                encode_ts(goal.goal_set_at),
            ])
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    StoreError::NotFound("user")
                } else {
                    StoreError::Sqlite(e)
                }
            })?;
            Ok(())
        })
    }

    fn goal_for(&self, user: UserId) -> Result<Option<Goal>, StoreError> {
        self.with_conn(|conn| {
            let raw = conn
                .prepare_cached(
                    "SELECT user_id, goal_weight_kg, start_weight_kg, goal_set_at \
                     FROM goals WHERE user_id = ?1",
                )?
                .query_row([user.to_string()], RawGoalRow::from_sql_row)
                .optional()?;
            raw.map(RawGoalRow::decode).transpose()
        })
    }

    fn clear_goal(&self, user: UserId) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let changed = conn
                .prepare_cached("DELETE FROM goals WHERE user_id = ?1")?
                .execute([user.to_string()])?;
            Ok(changed > 0)
        })
    }
}
