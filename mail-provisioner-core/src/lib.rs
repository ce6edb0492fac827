//! Mail Provisioner Core Library
//!
//! Business logic for publishing the DNS records that authenticate a mail
//! domain:
//! - DKIM key material (crypto)
//! - public address discovery and record planning
//! - provisioning orchestration over a [`ProviderGateway`](mail_provisioner_provider::ProviderGateway)
//! - domain persistence use cases
//!
//! Storage and address lookup are abstracted through traits so the binary
//! (or any embedding service) can inject its own implementations.

pub mod crypto;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{
    DomainService, HttpAddressResolver, ProvisioningService, RecordPlanner, ServiceContext,
};
pub use traits::{AddressResolver, DomainRepository, InMemoryDomainRepository};
pub use types::{
    DnsFields, DomainRecord, MailDomainAuthPlan, PlanOptions, ProviderStatus, ProvisioningResult,
    ServerAddress, SigningKeyPair,
};
