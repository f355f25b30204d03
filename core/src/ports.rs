//! Ports (C8): abstract boundaries standing in for external collaborators
//! — the relational store holding watermark records, and the owner
//! identity lookup service — plus in-process adapters used by the demo
//! gateway and tests.
//!
//! A production deployment substitutes a SQL-backed [`WatermarkRepository`]
//! and an HTTP-backed [`IdentityLookup`] without changing any caller.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::record::WatermarkRecord;

/// Errors raised by a [`WatermarkRepository`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("watermark record not found")]
    NotFound,
    #[error("repository backend error: {0}")]
    Backend(String),
}

/// Abstract storage interface for [`WatermarkRecord`]s.
///
/// Implementations can be backed by in-memory maps, a SQL database, etc.
/// The interface mirrors the minimal get/put/list surface a consensus
/// layer's block store exposes: just enough for the embed/verify flow and
/// the compensating-write discipline (§5).
pub trait WatermarkRepository: Send + Sync {
    /// Persists a new record. Fails if a record with the same `id`
    /// already exists.
    fn insert(&self, record: WatermarkRecord) -> Result<(), RepositoryError>;

    /// Deletes a record by id. Used to compensate an embed failure after
    /// the record was already inserted.
    fn delete(&self, id: &str) -> Result<(), RepositoryError>;

    /// Looks up a record by id.
    fn find_by(&self, id: &str) -> Result<Option<WatermarkRecord>, RepositoryError>;

    /// Lists up to `limit` active records, most recently created first.
    fn list_active(&self, limit: usize) -> Result<Vec<WatermarkRecord>, RepositoryError>;
}

/// In-memory [`WatermarkRepository`], a `Mutex`-guarded map. Backs tests
/// and the demo gateway; a production deployment would substitute a
/// SQL-backed adapter without changing callers.
#[derive(Default)]
pub struct InMemoryWatermarkRepository {
    records: Mutex<HashMap<String, WatermarkRecord>>,
}

impl InMemoryWatermarkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WatermarkRepository for InMemoryWatermarkRepository {
    fn insert(&self, record: WatermarkRecord) -> Result<(), RepositoryError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Backend("lock poisoned".to_string()))?;
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Backend("lock poisoned".to_string()))?;
        guard.remove(id).ok_or(RepositoryError::NotFound)?;
        Ok(())
    }

    fn find_by(&self, id: &str) -> Result<Option<WatermarkRecord>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Backend("lock poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    fn list_active(&self, limit: usize) -> Result<Vec<WatermarkRecord>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Backend("lock poisoned".to_string()))?;
        let mut active: Vec<WatermarkRecord> = guard
            .values()
            .filter(|r| r.status == crate::record::RecordStatus::Active)
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        active.truncate(limit);
        Ok(active)
    }
}

/// Resolves a display username for an `owner_id`.
///
/// Documented as backed by a short-timeout (2s) HTTP call in production;
/// failures downgrade gracefully (the caller simply omits the field
/// rather than treating it as fatal).
pub trait IdentityLookup: Send + Sync {
    fn username_for(&self, owner_id: &str) -> Option<String>;
}

/// In-repo [`IdentityLookup`] adapter that resolves from a fixed
/// in-memory map and never fails, standing in for the network call so
/// the gateway demo is self-contained.
#[derive(Default)]
pub struct StaticIdentityLookup {
    usernames: HashMap<String, String>,
}

impl StaticIdentityLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mapping(mut self, owner_id: impl Into<String>, username: impl Into<String>) -> Self {
        self.usernames.insert(owner_id.into(), username.into());
        self
    }
}

impl IdentityLookup for StaticIdentityLookup {
    fn username_for(&self, owner_id: &str) -> Option<String> {
        self.usernames.get(owner_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ContentType;

    #[test]
    fn insert_find_and_delete_roundtrip() {
        let repo = InMemoryWatermarkRepository::new();
        let rec = WatermarkRecord::new("u1", ContentType::Image, "image/png", "v3-continuous");
        let id = rec.id.clone();

        repo.insert(rec).unwrap();
        assert!(repo.find_by(&id).unwrap().is_some());

        repo.delete(&id).unwrap();
        assert!(repo.find_by(&id).unwrap().is_none());
    }

    #[test]
    fn delete_missing_record_errors() {
        let repo = InMemoryWatermarkRepository::new();
        assert!(matches!(repo.delete("nope"), Err(RepositoryError::NotFound)));
    }

    #[test]
    fn list_active_respects_limit() {
        let repo = InMemoryWatermarkRepository::new();
        for i in 0..5 {
            let rec = WatermarkRecord::new(
                format!("u{i}"),
                ContentType::Image,
                "image/png",
                "v3-continuous",
            );
            repo.insert(rec).unwrap();
        }
        let active = repo.list_active(3).unwrap();
        assert_eq!(active.len(), 3);
    }

    #[test]
    fn static_identity_lookup_resolves_known_owner() {
        let lookup = StaticIdentityLookup::new().with_mapping("u1", "alice");
        assert_eq!(lookup.username_for("u1"), Some("alice".to_string()));
        assert_eq!(lookup.username_for("u2"), None);
    }
}
