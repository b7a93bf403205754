//! Record store adapter — a thin typed interface over the document database.
//!
//! Collections hold JSON documents keyed by a unique identifier. The adapter
//! exposes exactly the four operations the services need (create, get, list,
//! update) and parses every document into a typed struct at this boundary —
//! no loosely-shaped values reach the services.

pub mod sqlite;

pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Collection identifiers used by the intake services.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PATIENTS: &str = "patients";
    pub const APPOINTMENTS: &str = "appointments";
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Malformed document {collection}/{id}: {reason}")]
    Malformed {
        collection: String,
        id: String,
        reason: String,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Sort order for list queries, always over creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    CreatedDesc,
    CreatedAsc,
}

/// Query options for [`RecordStore::list`].
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Equality filter on a top-level document field.
    pub equals: Option<(String, String)>,
    pub order: SortOrder,
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn equals(field: &str, value: &str) -> Self {
        Self {
            equals: Some((field.to_string(), value.to_string())),
            ..Self::default()
        }
    }
}

/// Raw document as returned by the store: JSON body plus store-stamped
/// identifier and timestamps.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub collection: String,
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: serde_json::Value,
}

impl StoredRecord {
    /// Parses the JSON body into a typed document.
    ///
    /// A body that does not match the collection's expected shape surfaces
    /// as a `Malformed` error.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<Persisted<T>, StoreError> {
        let StoredRecord {
            collection,
            id,
            created_at,
            updated_at,
            body,
        } = self;
        let document = serde_json::from_value(body).map_err(|e| StoreError::Malformed {
            collection,
            id: id.clone(),
            reason: e.to_string(),
        })?;
        Ok(Persisted {
            id,
            created_at,
            updated_at,
            document,
        })
    }
}

/// A typed document together with its store metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Persisted<T> {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub document: T,
}

/// One page of list results. `total` is the store-reported match count,
/// independent of any limit applied to `documents`.
#[derive(Debug)]
pub struct RecordPage {
    pub documents: Vec<StoredRecord>,
    pub total: u64,
}

/// The four document operations the remote store exposes.
///
/// Implementations are stateless per call: each operation is an independent
/// request/response cycle with no ordering guarantees between collections.
pub trait RecordStore: Send + Sync {
    fn create(
        &self,
        collection: &str,
        id: &str,
        body: &serde_json::Value,
    ) -> Result<StoredRecord, StoreError>;

    fn get(&self, collection: &str, id: &str) -> Result<StoredRecord, StoreError>;

    fn list(&self, collection: &str, query: &ListQuery) -> Result<RecordPage, StoreError>;

    /// Shallow-merges `patch` into the stored body and bumps `updated_at`.
    fn update(
        &self,
        collection: &str,
        id: &str,
        patch: &serde_json::Value,
    ) -> Result<StoredRecord, StoreError>;
}
