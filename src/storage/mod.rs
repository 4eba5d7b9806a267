//! Client-record persistence
//!
//! Writes are best-effort and never block report generation: the adapter
//! tries the primary backend, then the secondary, and surfaces an error
//! only when every configured backend fails. Callers log that error and
//! move on.

mod document_api;
mod postgres;

pub use document_api::DocumentApiStore;
pub use postgres::PostgresStore;

use crate::config::Config;
use crate::error::AdvisoryError;
use crate::models::{ClientRecord, Report};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Trait for persisting a client record (and optionally its report),
/// keyed by `profile.user_id`.
#[async_trait::async_trait]
pub trait ClientStore: Send + Sync {
    async fn upsert_client(
        &self,
        record: &ClientRecord,
        report: Option<&Report>,
    ) -> crate::Result<()>;
}

/// Sequential try-primary-then-secondary adapter. Not a transaction: the
/// first backend that accepts the write wins.
pub struct FallbackStore {
    backends: Vec<(&'static str, Arc<dyn ClientStore>)>,
}

impl FallbackStore {
    pub fn new(backends: Vec<(&'static str, Arc<dyn ClientStore>)>) -> Self {
        Self { backends }
    }
}

#[async_trait::async_trait]
impl ClientStore for FallbackStore {
    async fn upsert_client(
        &self,
        record: &ClientRecord,
        report: Option<&Report>,
    ) -> crate::Result<()> {
        let mut last_error = None;

        for (name, backend) in &self.backends {
            match backend.upsert_client(record, report).await {
                Ok(()) => {
                    info!(backend = name, user_id = %record.profile.user_id, "Client record persisted");
                    return Ok(());
                }
                Err(e) => {
                    warn!(backend = name, "Storage backend failed: {}", e);
                    last_error = Some(e);
                }
            }
        }

        Err(AdvisoryError::StorageUnavailable(match last_error {
            Some(e) => format!("all backends failed, last error: {}", e),
            None => "no backends configured".to_string(),
        }))
    }
}

/// Build the configured store chain, or `None` when nothing is configured
/// (writes are then skipped entirely).
pub fn build_store(config: &Config) -> Option<Arc<dyn ClientStore>> {
    let mut backends: Vec<(&'static str, Arc<dyn ClientStore>)> = Vec::new();

    if let Some(base_url) = &config.docstore_base_url {
        let api_key = config.docstore_api_key.clone().unwrap_or_default();
        backends.push((
            "document_api",
            Arc::new(DocumentApiStore::new(api_key, base_url.clone())),
        ));
    }

    if let Some(database_url) = &config.database_url {
        match PostgresStore::connect_lazy(database_url) {
            Ok(store) => backends.push(("postgres", Arc::new(store))),
            Err(e) => warn!("Failed to initialize postgres store: {}", e),
        }
    }

    if backends.is_empty() {
        return None;
    }

    Some(Arc::new(FallbackStore::new(backends)))
}

/// In-memory store for development and tests.
pub struct InMemoryStore {
    records: RwLock<HashMap<String, (ClientRecord, Option<Report>)>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, user_id: &str) -> Option<(ClientRecord, Option<Report>)> {
        self.records.read().await.get(user_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ClientStore for InMemoryStore {
    async fn upsert_client(
        &self,
        record: &ClientRecord,
        report: Option<&Report>,
    ) -> crate::Result<()> {
        let mut records = self.records.write().await;
        records.insert(
            record.profile.user_id.clone(),
            (record.clone(), report.cloned()),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Portfolio, Profile, SectionKey, TaxInfo};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct AlwaysFailingStore {
        attempts: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ClientStore for AlwaysFailingStore {
        async fn upsert_client(
            &self,
            _record: &ClientRecord,
            _report: Option<&Report>,
        ) -> crate::Result<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(AdvisoryError::StorageError("unreachable".to_string()))
        }
    }

    fn sample_record() -> ClientRecord {
        ClientRecord::new(
            Profile {
                user_id: "client_001".to_string(),
                name: "John Doe".to_string(),
                ..Default::default()
            },
            Portfolio::default(),
            TaxInfo::default(),
            vec![],
        )
    }

    #[tokio::test]
    async fn test_fallback_store_uses_secondary_when_primary_fails() {
        let primary = Arc::new(AlwaysFailingStore {
            attempts: AtomicUsize::new(0),
        });
        let secondary = Arc::new(InMemoryStore::new());

        let store = FallbackStore::new(vec![
            ("primary", primary.clone() as Arc<dyn ClientStore>),
            ("secondary", secondary.clone() as Arc<dyn ClientStore>),
        ]);

        let record = sample_record();
        store.upsert_client(&record, None).await.unwrap();

        assert_eq!(primary.attempts.load(Ordering::SeqCst), 1);
        assert!(secondary.get("client_001").await.is_some());
    }

    #[tokio::test]
    async fn test_fallback_store_errors_when_all_backends_fail() {
        let store = FallbackStore::new(vec![
            (
                "primary",
                Arc::new(AlwaysFailingStore {
                    attempts: AtomicUsize::new(0),
                }) as Arc<dyn ClientStore>,
            ),
            (
                "secondary",
                Arc::new(AlwaysFailingStore {
                    attempts: AtomicUsize::new(0),
                }) as Arc<dyn ClientStore>,
            ),
        ]);

        let err = store.upsert_client(&sample_record(), None).await.unwrap_err();
        assert!(matches!(err, AdvisoryError::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn test_in_memory_store_overwrites_by_user_id() {
        let store = InMemoryStore::new();
        let record = sample_record();

        store.upsert_client(&record, None).await.unwrap();

        let mut report = Report::new();
        report.insert(SectionKey::RiskAssessment, "low".to_string());
        store.upsert_client(&record, Some(&report)).await.unwrap();

        assert_eq!(store.len().await, 1);
        let (_, stored_report) = store.get("client_001").await.unwrap();
        assert_eq!(
            stored_report.unwrap().get(SectionKey::RiskAssessment),
            Some("low")
        );
    }
}
