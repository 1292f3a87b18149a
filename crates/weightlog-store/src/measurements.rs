// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use rusqlite::params;
use weightlog_model::{Measurement, MeasurementId, Note, UserId, WeightKg};

use crate::codec::{corrupt, decode_ts, encode_ts, is_foreign_key_violation, is_unique_violation};
use crate::{MeasurementStore, SqliteStore, StoreError};

const TABLE: &str = "weight_measurements";

struct RawMeasurementRow {
    id: String,
    user_id: String,
    weight_kg: f64,
    note: Option<String>,
    created_at: String,
}

impl RawMeasurementRow {
    fn from_sql_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            weight_kg: row.get(2)?,
            note: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn decode(self) -> Result<Measurement, StoreError> {
        Ok(Measurement {
            id: MeasurementId::parse(&self.id).map_err(|e| corrupt(TABLE, e))?,
            user_id: UserId::parse(&self.user_id).map_err(|e| corrupt(TABLE, e))?,
            weight_kg: WeightKg::parse(self.weight_kg).map_err(|e| corrupt(TABLE, e))?,
            note: Note::parse(self.note.as_deref()).map_err(|e| corrupt(TABLE, e))?,
            created_at: decode_ts(TABLE, &self.created_at)?,
        })
    }
}

impl SqliteStore {
    fn select_measurements(
        &self,
        user: UserId,
        since: Option<DateTime<Utc>>,
        descending: bool,
        limit: Option<u32>,
    ) -> Result<Vec<Measurement>, StoreError> {
        let order = if descending { "DESC" } else { "ASC" };
        let limit = limit.map(|n| format!(" LIMIT {n}")).unwrap_or_default();
        let sql = format!(
            "SELECT id, user_id, weight_kg, note, created_at FROM weight_measurements \
             WHERE user_id = ?1 AND (?2 IS NULL OR created_at >= ?2) \
             ORDER BY created_at {order}, rowid {order}{limit}"
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt.query_map(
                params![user.to_string(), since.map(encode_ts)],
                RawMeasurementRow::from_sql_row,
            )?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?.decode()?);
            }
            Ok(out)
        })
    }
}

impl MeasurementStore for SqliteStore {
    fn insert_measurement(&self, measurement: &Measurement) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.prepare_cached(
                "INSERT INTO weight_measurements (id, user_id, weight_kg, note, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?
            .execute(params![
                measurement.id.to_string(),
                measurement.user_id.to_string(),
                measurement.weight_kg.get(),
                measurement.note.as_ref().map(Note::as_str),
                encode_ts(measurement.created_at),
            ])
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    StoreError::NotFound("user")
                } else if is_unique_violation(&e) {
                    StoreError::Conflict("measurement")
                } else {
                    StoreError::Sqlite(e)
                }
            })?;
            Ok(())
        })
    }

    fn delete_measurement(&self, user: UserId, id: MeasurementId) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let changed = conn
                .prepare_cached("DELETE FROM weight_measurements WHERE id = ?1 AND user_id = ?2")?
                .execute(params![id.to_string(), user.to_string()])?;
            Ok(changed > 0)
        })
    }

    fn measurements_ascending(
        &self,
        user: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Measurement>, StoreError> {
        self.select_measurements(user, since, false, None)
    }

    fn measurements_descending(
        &self,
        user: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Measurement>, StoreError> {
        self.select_measurements(user, since, true, None)
    }

    fn latest_measurement(&self, user: UserId) -> Result<Option<Measurement>, StoreError> {
        Ok(self
            .select_measurements(user, None, true, Some(1))?
            .into_iter()
            .next())
    }
}
