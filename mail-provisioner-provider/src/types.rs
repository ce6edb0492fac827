use std::time::Duration;

use serde::{Deserialize, Serialize};

// ============ Provider Types ============

/// Identifies which DNS provider gateway to use.
///
/// Each variant is gated behind its corresponding feature flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// GoDaddy Domains API. Requires feature `godaddy`.
    #[cfg(feature = "godaddy")]
    Godaddy,
    /// Cloudflare DNS. Requires feature `cloudflare`.
    #[cfg(feature = "cloudflare")]
    Cloudflare,
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "godaddy")]
            Self::Godaddy => write!(f, "godaddy"),
            #[cfg(feature = "cloudflare")]
            Self::Cloudflare => write!(f, "cloudflare"),
        }
    }
}

impl std::str::FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            #[cfg(feature = "godaddy")]
            "godaddy" => Ok(Self::Godaddy),
            #[cfg(feature = "cloudflare")]
            "cloudflare" => Ok(Self::Cloudflare),
            other => Err(format!("unsupported DNS provider: {other}")),
        }
    }
}

// ============ DNS Record Types ============

/// Default TTL (seconds) of every planned mail authentication record.
pub const DEFAULT_TTL: u32 = 3600;

/// DNS record types used by mail-domain authentication.
///
/// Serialized as uppercase strings (`"MX"`, `"A"`, `"TXT"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    /// Mail exchange record.
    Mx,
    /// IPv4 address record.
    A,
    /// Text record (SPF, DKIM, DMARC).
    Txt,
}

impl DnsRecordType {
    /// Uppercase wire name of the record type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mx => "MX",
            Self::A => "A",
            Self::Txt => "TXT",
        }
    }
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A planned record to be created or verified at the provider.
///
/// `name` is relative to the zone (`"@"` for the apex). On the wire this
/// serializes as `{type, name, data, ttl, priority?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecordSpec {
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// Relative record name.
    pub name: String,
    /// Record payload.
    #[serde(rename = "data")]
    pub value: String,
    /// Priority, MX only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    /// TTL in seconds.
    pub ttl: u32,
}

impl DnsRecordSpec {
    /// MX record with the given priority.
    pub fn mx(name: impl Into<String>, host: impl Into<String>, priority: u16) -> Self {
        Self {
            record_type: DnsRecordType::Mx,
            name: name.into(),
            value: host.into(),
            priority: Some(priority),
            ttl: DEFAULT_TTL,
        }
    }

    /// A record.
    pub fn a(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            record_type: DnsRecordType::A,
            name: name.into(),
            value: address.into(),
            priority: None,
            ttl: DEFAULT_TTL,
        }
    }

    /// TXT record.
    pub fn txt(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            record_type: DnsRecordType::Txt,
            name: name.into(),
            value: value.into(),
            priority: None,
            ttl: DEFAULT_TTL,
        }
    }

    /// Short label used in logs and reconciliation reports, e.g. `"TXT _dmarc"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.record_type, self.name)
    }

    /// Leading `v=` tag of a TXT value (`"v=spf1"`, `"v=DKIM1"`, ...).
    ///
    /// Several TXT records may share a name (SPF lives next to site
    /// verification strings at the apex), so upserts match on this tag.
    #[must_use]
    pub fn txt_tag(&self) -> Option<&str> {
        if self.record_type != DnsRecordType::Txt {
            return None;
        }
        let value = self.value.trim_matches('"');
        value
            .split([';', ' '])
            .next()
            .filter(|tag| tag.starts_with("v="))
    }
}

// ============ Reconciliation ============

/// Outcome of pushing a set of records to a provider.
///
/// Pushes are all-or-nothing on the first error: once a record fails the
/// remaining ones are not attempted and already-written records are left in
/// place (no rollback).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    /// Whether every record was applied.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Labels of records the provider accepted, in push order.
    pub applied: Vec<String>,
    /// Label of the record that stopped the push, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_record: Option<String>,
    /// The provider error that stopped the push, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<crate::ProviderError>,
}

impl ReconciliationResult {
    /// Every record in `applied` was accepted.
    #[must_use]
    pub fn applied(domain: &str, applied: Vec<String>) -> Self {
        Self {
            success: true,
            message: format!("Applied {} DNS records to {domain}", applied.len()),
            applied,
            failed_record: None,
            error: None,
        }
    }

    /// The push stopped at `failed_record`.
    #[must_use]
    pub fn failed(
        applied: Vec<String>,
        failed_record: Option<String>,
        error: crate::ProviderError,
    ) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            applied,
            failed_record,
            error: Some(error),
        }
    }
}

// ============ Gateway Options ============

/// Default per-request deadline for provider API calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Default TCP connect deadline for provider API calls.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP settings shared by every gateway.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Hard deadline for a whole request/response exchange.
    pub request_timeout: Duration,
    /// Deadline for establishing the TCP/TLS connection.
    pub connect_timeout: Duration,
    /// Override of the provider API base URL (sandbox endpoints, tests).
    pub base_url: Option<String>,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            base_url: None,
        }
    }
}

impl GatewayOptions {
    /// Options pointing at a different API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Options with a different request deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

// ============ Provider Metadata Types ============

/// The input type of a credential field (affects UI rendering).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Plain text input.
    Text,
    /// Masked/password input.
    Password,
}

/// Definition of a single credential field required by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredentialField {
    /// Machine-readable field key (e.g., `"apiKey"`).
    pub key: String,
    /// Human-readable label (e.g., `"API Key"`).
    pub label: String,
    /// Input type for UI rendering.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Optional help/description text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

/// Provider-specific feature support flags.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFeatures {
    /// Whether the provider applies a whole record set in one API call.
    pub atomic_batch: bool,
}

/// Static metadata describing a DNS provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMetadata {
    /// Provider type identifier.
    pub id: ProviderType,
    /// Human-readable provider name.
    pub name: String,
    /// Short description of the provider.
    pub description: String,
    /// Credential fields required to authenticate with this provider.
    pub required_fields: Vec<ProviderCredentialField>,
    /// Feature flags for this provider.
    pub features: ProviderFeatures,
}

// ============ Credential Types ============

/// Type-safe credential container for all supported DNS providers.
///
/// Serialized as a tagged enum with `"provider"` as the tag and `"credentials"` as the content:
///
/// ```json
/// { "provider": "godaddy", "credentials": { "api_key": "...", "api_secret": "..." } }
/// ```
///
/// The `Debug` output never contains secret material.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "provider", content = "credentials")]
pub enum ProviderCredentials {
    /// GoDaddy API key pair. Requires feature `godaddy`.
    #[cfg(feature = "godaddy")]
    #[serde(rename = "godaddy")]
    Godaddy {
        /// GoDaddy API key.
        api_key: String,
        /// GoDaddy API secret.
        api_secret: String,
    },

    /// Cloudflare credentials. Requires feature `cloudflare`.
    #[cfg(feature = "cloudflare")]
    #[serde(rename = "cloudflare")]
    Cloudflare {
        /// Cloudflare API token (Zone:DNS:Edit).
        api_token: String,
    },
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "godaddy")]
            Self::Godaddy { .. } => f
                .debug_struct("Godaddy")
                .field("api_key", &"<redacted>")
                .field("api_secret", &"<redacted>")
                .finish(),
            #[cfg(feature = "cloudflare")]
            Self::Cloudflare { .. } => f
                .debug_struct("Cloudflare")
                .field("api_token", &"<redacted>")
                .finish(),
        }
    }
}

impl ProviderCredentials {
    /// Returns the [`ProviderType`] corresponding to this credential variant.
    pub fn provider_type(&self) -> ProviderType {
        match self {
            #[cfg(feature = "godaddy")]
            Self::Godaddy { .. } => ProviderType::Godaddy,
            #[cfg(feature = "cloudflare")]
            Self::Cloudflare { .. } => ProviderType::Cloudflare,
        }
    }
}
