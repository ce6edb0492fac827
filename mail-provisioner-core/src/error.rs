//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use mail_provisioner_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// RSA key generation failed; no partial key material is ever returned
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// Validation error (domain name, selector, plan content)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Another provisioning attempt for the same domain is still running
    #[error("Provisioning already in progress for {0}")]
    ProvisioningInProgress(String),

    /// Domain name not found in the persistence layer
    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    /// The domain still has mail addresses attached and cannot be deleted
    #[error("Domain {domain} still has {addresses} mail address(es) attached")]
    DomainHasDependentAddresses { domain: String, addresses: u64 },

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::Validation(_)
            | Self::ProvisioningInProgress(_)
            | Self::DomainNotFound(_)
            | Self::DomainHasDependentAddresses { .. } => true,
            Self::Provider(e) => e.is_expected(),
            Self::KeyGeneration(_) | Self::StorageError(_) => false,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_converts() {
        let err: CoreError = ProviderError::InvalidCredentials {
            provider: "godaddy".into(),
            raw_message: None,
        }
        .into();
        assert!(matches!(err, CoreError::Provider(_)));
        assert!(err.is_expected());
        assert_eq!(err.to_string(), "[godaddy] Invalid credentials");
    }

    #[test]
    fn dependent_addresses_message() {
        let err = CoreError::DomainHasDependentAddresses {
            domain: "example.com".into(),
            addresses: 3,
        };
        assert_eq!(
            err.to_string(),
            "Domain example.com still has 3 mail address(es) attached"
        );
        assert!(err.is_expected());
    }

    #[test]
    fn key_generation_is_unexpected() {
        assert!(!CoreError::KeyGeneration("entropy".into()).is_expected());
    }

    #[test]
    fn serializes_with_code_tag() {
        let json = serde_json::to_value(CoreError::Validation("bad".into())).unwrap();
        assert_eq!(json["code"], "Validation");
        assert_eq!(json["details"], "bad");
    }
}
