//! 类型定义模块

mod dns;
mod domain;
mod key;
mod provisioning;

pub use dns::{
    DnsRecordSpec, DnsRecordType, MailDomainAuthPlan, PlanOptions, ServerAddress,
    DEFAULT_DKIM_SELECTOR, DEFAULT_TTL, LOCALHOST_SENTINEL, MAIL_HOST_LABEL, MX_PRIORITY,
};
pub use domain::{DnsFields, DomainRecord};
pub use key::SigningKeyPair;
pub use provisioning::{
    ProviderCredentialState, ProviderStatus, ProvisioningResult, ProvisioningState,
    ProvisioningStatus,
};

// Re-export provider 库的公共类型
pub use mail_provisioner_provider::{
    GatewayOptions, ProviderCredentials, ProviderMetadata, ProviderType, ReconciliationResult,
};
