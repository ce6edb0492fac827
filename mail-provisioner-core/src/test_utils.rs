//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mail_provisioner_provider::{
    DnsRecordSpec, ProviderError, ProviderFeatures, ProviderGateway, ProviderMetadata,
    ProviderType, ReconciliationResult, Result as ProviderResult,
};

use crate::services::ServiceContext;
use crate::traits::{AddressResolver, InMemoryDomainRepository};
use crate::types::ServerAddress;

/// Documentation address used throughout the tests.
pub const TEST_ADDRESS: Ipv4Addr = Ipv4Addr::new(203, 0, 113, 10);

// ===== FixedAddressResolver =====

/// Address resolver with a fixed answer that counts lookups.
pub struct FixedAddressResolver {
    answer: ServerAddress,
    calls: AtomicUsize,
}

impl FixedAddressResolver {
    pub fn resolved(ip: Ipv4Addr) -> Self {
        Self {
            answer: ServerAddress::Resolved(ip),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            answer: ServerAddress::Unavailable,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddressResolver for FixedAddressResolver {
    async fn discover(&self) -> ServerAddress {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

// ===== MockGateway =====

#[derive(Clone, Copy)]
enum CredentialBehaviour {
    Accept,
    Reject,
    Unreachable,
}

/// Provider gateway double that records everything pushed to it.
pub struct MockGateway {
    credentials: CredentialBehaviour,
    fail_on: Option<String>,
    push_delay: Option<Duration>,
    domains: Vec<String>,
    validate_calls: AtomicUsize,
    push_calls: AtomicUsize,
    pushed: Mutex<Vec<DnsRecordSpec>>,
}

impl MockGateway {
    fn with_credentials(credentials: CredentialBehaviour) -> Self {
        Self {
            credentials,
            fail_on: None,
            push_delay: None,
            domains: Vec::new(),
            validate_calls: AtomicUsize::new(0),
            push_calls: AtomicUsize::new(0),
            pushed: Mutex::new(Vec::new()),
        }
    }

    /// Valid credentials, every record accepted.
    pub fn accepting() -> Self {
        Self::with_credentials(CredentialBehaviour::Accept)
    }

    /// Credentials rejected.
    pub fn rejecting() -> Self {
        Self::with_credentials(CredentialBehaviour::Reject)
    }

    /// Validation fails with a transport error.
    pub fn unreachable() -> Self {
        Self::with_credentials(CredentialBehaviour::Unreachable)
    }

    /// Reject the first record whose relative name is `name`.
    #[must_use]
    pub fn failing_on(mut self, name: &str) -> Self {
        self.fail_on = Some(name.to_string());
        self
    }

    /// Hold every push for `delay` before writing.
    #[must_use]
    pub fn with_push_delay(mut self, delay: Duration) -> Self {
        self.push_delay = Some(delay);
        self
    }

    #[must_use]
    pub fn with_domains(mut self, domains: Vec<String>) -> Self {
        self.domains = domains;
        self
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    pub fn push_calls(&self) -> usize {
        self.push_calls.load(Ordering::SeqCst)
    }

    /// Records written so far, in push order.
    pub fn pushed_records(&self) -> Vec<DnsRecordSpec> {
        self.pushed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderGateway for MockGateway {
    fn id(&self) -> &'static str {
        "mock"
    }

    fn metadata() -> ProviderMetadata {
        ProviderMetadata {
            id: ProviderType::Cloudflare,
            name: "Mock".to_string(),
            description: "In-memory test gateway".to_string(),
            required_fields: vec![],
            features: ProviderFeatures::default(),
        }
    }

    async fn validate_credentials(&self) -> ProviderResult<bool> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        match self.credentials {
            CredentialBehaviour::Accept => Ok(true),
            CredentialBehaviour::Reject => Ok(false),
            CredentialBehaviour::Unreachable => Err(ProviderError::NetworkError {
                provider: "mock".to_string(),
                detail: "connection refused".to_string(),
            }),
        }
    }

    async fn list_domains(&self) -> ProviderResult<Vec<String>> {
        Ok(self.domains.clone())
    }

    async fn upsert_record(&self, _domain: &str, record: &DnsRecordSpec) -> ProviderResult<()> {
        if self.fail_on.as_deref() == Some(record.name.as_str()) {
            return Err(ProviderError::InvalidParameter {
                provider: "mock".to_string(),
                param: "data".to_string(),
                detail: format!("{} rejected", record.label()),
            });
        }
        self.pushed.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn upsert_records(
        &self,
        domain: &str,
        records: &[DnsRecordSpec],
    ) -> ProviderResult<ReconciliationResult> {
        self.push_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.push_delay {
            tokio::time::sleep(delay).await;
        }

        let mut applied = Vec::new();
        for record in records {
            if let Err(e) = self.upsert_record(domain, record).await {
                return Ok(ReconciliationResult::failed(applied, Some(record.label()), e));
            }
            applied.push(record.label());
        }
        Ok(ReconciliationResult::applied(domain, applied))
    }
}

/// Service context over the given gateway and resolver, with an empty
/// in-memory repository.
pub fn context_with(
    gateway: Option<Arc<dyn ProviderGateway>>,
    resolver: Arc<dyn AddressResolver>,
) -> ServiceContext {
    ServiceContext::new(gateway, resolver, Arc::new(InMemoryDomainRepository::new()))
}
