//! SQLite-backed document store.
//!
//! One `records` table holds every collection's documents as JSON text,
//! stamped with RFC 3339 creation/update times. The fixed-width timestamp
//! format keeps lexicographic and chronological order identical, so list
//! queries sort directly on the column.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{ListQuery, RecordPage, RecordStore, SortOrder, StoreError, StoredRecord};

const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);
     CREATE TABLE records (
         collection TEXT NOT NULL,
         id TEXT NOT NULL,
         body TEXT NOT NULL,
         created_at TEXT NOT NULL,
         updated_at TEXT NOT NULL,
         PRIMARY KEY (collection, id)
     );
     CREATE INDEX idx_records_collection_created
         ON records (collection, created_at);",
)];

/// Document store over a single SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the store at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "PRAGMA journal_mode=DELETE;
             PRAGMA foreign_keys=ON;",
        )?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))
    }
}

fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let current: i64 = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i64>>(0)
        })
        .ok()
        .flatten()
        .unwrap_or(0);

    for (version, sql) in MIGRATIONS {
        if *version > current {
            tracing::info!("Running store migration v{version}");
            conn.execute_batch(sql)
                .map_err(|e| StoreError::MigrationFailed {
                    version: *version,
                    reason: e.to_string(),
                })?;
            conn.execute("INSERT INTO schema_version (version) VALUES (?1)", params![version])
                .map_err(|e| StoreError::MigrationFailed {
                    version: *version,
                    reason: e.to_string(),
                })?;
        }
    }

    Ok(())
}

fn stamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_stamp(collection: &str, id: &str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Malformed {
            collection: collection.into(),
            id: id.into(),
            reason: format!("bad timestamp {raw:?}: {e}"),
        })
}

fn row_to_record(
    collection: &str,
    id: &str,
    body: &str,
    created_at: &str,
    updated_at: &str,
) -> Result<StoredRecord, StoreError> {
    let body = serde_json::from_str(body).map_err(|e| StoreError::Malformed {
        collection: collection.into(),
        id: id.into(),
        reason: format!("body is not valid JSON: {e}"),
    })?;
    Ok(StoredRecord {
        collection: collection.into(),
        id: id.into(),
        created_at: parse_stamp(collection, id, created_at)?,
        updated_at: parse_stamp(collection, id, updated_at)?,
        body,
    })
}

type RecordRow = (String, String, String, String);

fn record_rows_to_vec(
    collection: &str,
    rows: rusqlite::MappedRows<'_, impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<RecordRow>>,
) -> Result<Vec<StoredRecord>, StoreError> {
    let mut documents = Vec::new();
    for row in rows {
        let (id, body, created_at, updated_at) = row?;
        documents.push(row_to_record(collection, &id, &body, &created_at, &updated_at)?);
    }
    Ok(documents)
}

impl RecordStore for SqliteStore {
    fn create(
        &self,
        collection: &str,
        id: &str,
        body: &serde_json::Value,
    ) -> Result<StoredRecord, StoreError> {
        let conn = self.lock()?;
        let now = stamp(Utc::now());
        conn.execute(
            "INSERT INTO records (collection, id, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![collection, id, body.to_string(), now],
        )?;

        Ok(StoredRecord {
            collection: collection.into(),
            id: id.into(),
            created_at: parse_stamp(collection, id, &now)?,
            updated_at: parse_stamp(collection, id, &now)?,
            body: body.clone(),
        })
    }

    fn get(&self, collection: &str, id: &str) -> Result<StoredRecord, StoreError> {
        let conn = self.lock()?;
        let row: Option<(String, String, String)> = conn
            .query_row(
                "SELECT body, created_at, updated_at FROM records
                 WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        match row {
            Some((body, created_at, updated_at)) => {
                row_to_record(collection, id, &body, &created_at, &updated_at)
            }
            None => Err(StoreError::NotFound {
                collection: collection.into(),
                id: id.into(),
            }),
        }
    }

    fn list(&self, collection: &str, query: &ListQuery) -> Result<RecordPage, StoreError> {
        let conn = self.lock()?;

        // Equality filters address top-level document fields via json_extract;
        // the field name travels as a bound JSON path, never as SQL text.
        let (filter_sql, path, value) = match &query.equals {
            Some((field, value)) => (
                " AND json_extract(body, ?2) = ?3",
                format!("$.{field}"),
                value.clone(),
            ),
            None => ("", String::new(), String::new()),
        };

        let order = match query.order {
            SortOrder::CreatedDesc => "ORDER BY created_at DESC, rowid DESC",
            SortOrder::CreatedAsc => "ORDER BY created_at ASC, rowid ASC",
        };

        let limit_sql = match query.limit {
            Some(n) => format!(" LIMIT {n}"),
            None => String::new(),
        };

        let count_sql = format!("SELECT COUNT(*) FROM records WHERE collection = ?1{filter_sql}");
        let select_sql = format!(
            "SELECT id, body, created_at, updated_at FROM records
             WHERE collection = ?1{filter_sql} {order}{limit_sql}"
        );

        let total: i64 = if query.equals.is_some() {
            conn.query_row(&count_sql, params![collection, path, value], |row| row.get(0))?
        } else {
            conn.query_row(&count_sql, params![collection], |row| row.get(0))?
        };

        let mut stmt = conn.prepare(&select_sql)?;
        let documents = if query.equals.is_some() {
            let rows = stmt.query_map(params![collection, path, value], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;
            record_rows_to_vec(collection, rows)?
        } else {
            let rows = stmt.query_map(params![collection], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;
            record_rows_to_vec(collection, rows)?
        };

        Ok(RecordPage {
            documents,
            total: total as u64,
        })
    }

    fn update(
        &self,
        collection: &str,
        id: &str,
        patch: &serde_json::Value,
    ) -> Result<StoredRecord, StoreError> {
        let patch_object = patch.as_object().ok_or_else(|| StoreError::Malformed {
            collection: collection.into(),
            id: id.into(),
            reason: "patch must be a JSON object".into(),
        })?;

        let conn = self.lock()?;

        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT body, created_at FROM records WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (body, created_at) = row.ok_or_else(|| StoreError::NotFound {
            collection: collection.into(),
            id: id.into(),
        })?;

        let mut body: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| StoreError::Malformed {
                collection: collection.into(),
                id: id.into(),
                reason: format!("body is not valid JSON: {e}"),
            })?;
        let merged = body.as_object_mut().ok_or_else(|| StoreError::Malformed {
            collection: collection.into(),
            id: id.into(),
            reason: "body is not a JSON object".into(),
        })?;
        for (key, value) in patch_object {
            merged.insert(key.clone(), value.clone());
        }

        let now = stamp(Utc::now());
        conn.execute(
            "UPDATE records SET body = ?3, updated_at = ?4
             WHERE collection = ?1 AND id = ?2",
            params![collection, id, body.to_string(), now],
        )?;

        Ok(StoredRecord {
            collection: collection.into(),
            id: id.into(),
            created_at: parse_stamp(collection, id, &created_at)?,
            updated_at: parse_stamp(collection, id, &now)?,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::collections;
    use serde_json::json;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn create_then_get_round_trip() {
        let store = store();
        let body = json!({"name": "Jan", "email": "jan@example.com"});

        let created = store.create(collections::USERS, "u1", &body).unwrap();
        assert_eq!(created.id, "u1");
        assert_eq!(created.created_at, created.updated_at);

        let fetched = store.get(collections::USERS, "u1").unwrap();
        assert_eq!(fetched.body, body);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = store();
        let err = store.get(collections::USERS, "nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn duplicate_id_rejected() {
        let store = store();
        let body = json!({"a": 1});
        store.create(collections::USERS, "u1", &body).unwrap();
        let err = store.create(collections::USERS, "u1", &body).unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }

    #[test]
    fn same_id_distinct_across_collections() {
        let store = store();
        store.create(collections::USERS, "x", &json!({"kind": "user"})).unwrap();
        store
            .create(collections::PATIENTS, "x", &json!({"kind": "patient"}))
            .unwrap();

        assert_eq!(
            store.get(collections::USERS, "x").unwrap().body["kind"],
            "user"
        );
        assert_eq!(
            store.get(collections::PATIENTS, "x").unwrap().body["kind"],
            "patient"
        );
    }

    #[test]
    fn list_orders_newest_first_and_reports_total() {
        let store = store();
        for i in 0..3 {
            store
                .create(collections::APPOINTMENTS, &format!("a{i}"), &json!({"n": i}))
                .unwrap();
        }

        let page = store
            .list(collections::APPOINTMENTS, &ListQuery::default())
            .unwrap();
        assert_eq!(page.total, 3);
        let ids: Vec<&str> = page.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a2", "a1", "a0"]);
    }

    #[test]
    fn list_limit_does_not_change_total() {
        let store = store();
        for i in 0..5 {
            store
                .create(collections::APPOINTMENTS, &format!("a{i}"), &json!({"n": i}))
                .unwrap();
        }

        let page = store
            .list(
                collections::APPOINTMENTS,
                &ListQuery {
                    limit: Some(2),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(page.documents.len(), 2);
        assert_eq!(page.total, 5);
    }

    #[test]
    fn list_equality_filter() {
        let store = store();
        store
            .create(collections::PATIENTS, "p1", &json!({"user_id": "u1", "name": "A"}))
            .unwrap();
        store
            .create(collections::PATIENTS, "p2", &json!({"user_id": "u2", "name": "B"}))
            .unwrap();

        let page = store
            .list(collections::PATIENTS, &ListQuery::equals("user_id", "u2"))
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.documents[0].id, "p2");
    }

    #[test]
    fn update_merges_and_bumps_updated_at() {
        let store = store();
        store
            .create(
                collections::APPOINTMENTS,
                "a1",
                &json!({"status": "pending", "reason": "checkup"}),
            )
            .unwrap();

        let updated = store
            .update(collections::APPOINTMENTS, "a1", &json!({"status": "scheduled"}))
            .unwrap();
        assert_eq!(updated.body["status"], "scheduled");
        assert_eq!(updated.body["reason"], "checkup");
        assert!(updated.updated_at >= updated.created_at);

        let fetched = store.get(collections::APPOINTMENTS, "a1").unwrap();
        assert_eq!(fetched.body["status"], "scheduled");
    }

    #[test]
    fn update_missing_is_not_found() {
        let store = store();
        let err = store
            .update(collections::APPOINTMENTS, "ghost", &json!({"status": "cancelled"}))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn update_rejects_non_object_patch() {
        let store = store();
        store.create(collections::USERS, "u1", &json!({"a": 1})).unwrap();
        let err = store
            .update(collections::USERS, "u1", &json!("not-an-object"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[test]
    fn into_typed_rejects_wrong_shape() {
        let store = store();
        store
            .create(collections::USERS, "u1", &json!({"unexpected": true}))
            .unwrap();

        let record = store.get(collections::USERS, "u1").unwrap();
        let err = record.into_typed::<crate::models::User>().unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[test]
    fn migrations_idempotent() {
        let store = store();
        let conn = store.conn.lock().unwrap();
        run_migrations(&conn).unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn open_on_disk_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("caredesk.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.create(collections::USERS, "u1", &json!({"a": 1})).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get(collections::USERS, "u1").unwrap().body["a"], 1);
    }
}
