//! Provisioning outcome types

use std::fmt;

use serde::{Deserialize, Serialize};

use mail_provisioner_provider::ReconciliationResult;

use super::DnsFields;

/// Validity of the configured provider credentials, as seen by one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProviderCredentialState {
    /// No provider credentials configured at all.
    Unconfigured,
    /// Credentials configured but rejected by the provider.
    Invalid,
    /// Credentials accepted.
    Valid,
}

/// Stable machine key of a provisioning outcome, for frontends to localise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningStatus {
    /// No DNS provider configured; a normal steady state.
    Unconfigured,
    /// The provider rejected the credentials; nothing was planned or pushed.
    InvalidCredentials,
    /// Every record was accepted by the provider.
    Applied,
    /// The push stopped at a provider error.
    Failed,
}

/// Result of [`crate::services::ProvisioningService::provision_domain`].
///
/// The `configured`/`valid`/`success` triple tells "not set up",
/// "misconfigured" and "provider failure" apart without parsing messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningResult {
    pub configured: bool,
    pub valid: bool,
    pub success: bool,
    pub status: ProvisioningStatus,
    pub message: String,
    /// Provider reconciliation report, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<ReconciliationResult>,
    /// DNS columns the caller should persist (present once a plan was built).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_fields: Option<DnsFields>,
}

impl ProvisioningResult {
    /// No provider configured.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            valid: false,
            success: false,
            status: ProvisioningStatus::Unconfigured,
            message: "No DNS provider configured".to_string(),
            reconciliation: None,
            dns_fields: None,
        }
    }

    /// Provider rejected the credentials.
    #[must_use]
    pub fn invalid_credentials(provider: &str) -> Self {
        Self {
            configured: true,
            valid: false,
            success: false,
            status: ProvisioningStatus::InvalidCredentials,
            message: format!("DNS provider {provider} rejected the configured credentials"),
            reconciliation: None,
            dns_fields: None,
        }
    }

    /// The push ran; success mirrors the reconciliation.
    #[must_use]
    pub fn pushed(reconciliation: ReconciliationResult, dns_fields: DnsFields) -> Self {
        let status = if reconciliation.success {
            ProvisioningStatus::Applied
        } else {
            ProvisioningStatus::Failed
        };
        Self {
            configured: true,
            valid: true,
            success: reconciliation.success,
            status,
            message: reconciliation.message.clone(),
            reconciliation: Some(reconciliation),
            dns_fields: Some(dns_fields),
        }
    }
}

/// Result of [`crate::services::ProvisioningService::check_provider_configured`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub configured: bool,
    pub valid: bool,
    pub state: ProviderCredentialState,
    /// Provider identifier (`godaddy`, `cloudflare`) when configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Domains visible to the account, when the credentials are valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<String>>,
}

impl ProviderStatus {
    /// No gateway configured.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            valid: false,
            state: ProviderCredentialState::Unconfigured,
            provider: None,
            domains: None,
        }
    }

    /// Credentials were checked against `provider`.
    #[must_use]
    pub fn checked(provider: &str, valid: bool, domains: Option<Vec<String>>) -> Self {
        Self {
            configured: true,
            valid,
            state: if valid {
                ProviderCredentialState::Valid
            } else {
                ProviderCredentialState::Invalid
            },
            provider: Some(provider.to_string()),
            domains,
        }
    }
}

/// Stages of a single provisioning attempt (logged at each transition).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    Unconfigured,
    CredentialCheck,
    Invalid,
    Valid,
    Planning,
    PlanFailed,
    Planned,
    Pushing,
    Failed,
    Applied,
}

impl ProvisioningState {
    /// Whether the attempt ends in this state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Unconfigured | Self::Invalid | Self::PlanFailed | Self::Failed | Self::Applied
        )
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unconfigured => "unconfigured",
            Self::CredentialCheck => "credential-check",
            Self::Invalid => "invalid",
            Self::Valid => "valid",
            Self::Planning => "planning",
            Self::PlanFailed => "plan-failed",
            Self::Planned => "planned",
            Self::Pushing => "pushing",
            Self::Failed => "failed",
            Self::Applied => "applied",
        };
        f.write_str(name)
    }
}
