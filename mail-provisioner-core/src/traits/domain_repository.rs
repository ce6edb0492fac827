//! Mail domain persistence abstract Trait

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreResult;
use crate::types::DomainRecord;

/// Domain Repository Trait
///
/// Boundary to the external persistence layer that owns domain rows and the
/// mail addresses attached to them.
#[async_trait]
pub trait DomainRepository: Send + Sync {
    /// Load a domain row.
    async fn find(&self, domain: &str) -> CoreResult<Option<DomainRecord>>;

    /// Insert or replace a domain row.
    async fn save(&self, record: &DomainRecord) -> CoreResult<()>;

    /// Number of mail addresses attached to the domain.
    async fn address_count(&self, domain: &str) -> CoreResult<u64>;

    /// Remove a domain row. Callers check [`Self::address_count`] first.
    async fn delete(&self, domain: &str) -> CoreResult<()>;
}

/// In-memory domain repository
///
/// Default implementation, used by the CLI and in tests.
#[derive(Clone, Default)]
pub struct InMemoryDomainRepository {
    domains: Arc<RwLock<HashMap<String, DomainRecord>>>,
    addresses: Arc<RwLock<HashMap<String, u64>>>,
}

impl InMemoryDomainRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record how many mail addresses a domain has.
    pub async fn set_address_count(&self, domain: &str, count: u64) {
        self.addresses
            .write()
            .await
            .insert(domain.to_string(), count);
    }
}

#[async_trait]
impl DomainRepository for InMemoryDomainRepository {
    async fn find(&self, domain: &str) -> CoreResult<Option<DomainRecord>> {
        Ok(self.domains.read().await.get(domain).cloned())
    }

    async fn save(&self, record: &DomainRecord) -> CoreResult<()> {
        self.domains
            .write()
            .await
            .insert(record.domain.clone(), record.clone());
        Ok(())
    }

    async fn address_count(&self, domain: &str) -> CoreResult<u64> {
        Ok(self
            .addresses
            .read()
            .await
            .get(domain)
            .copied()
            .unwrap_or(0))
    }

    async fn delete(&self, domain: &str) -> CoreResult<()> {
        self.domains.write().await.remove(domain);
        self.addresses.write().await.remove(domain);
        Ok(())
    }
}
