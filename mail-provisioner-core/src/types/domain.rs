//! Domain name related type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MailDomainAuthPlan;

/// Persisted DNS columns of a mail domain.
///
/// Every field is optional: a freshly created domain has none, a partially
/// provisioned one may have some. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsFields {
    /// MX target host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mx_record: Option<String>,
    /// Full SPF TXT value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spf_record: Option<String>,
    /// DKIM selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dkim_selector: Option<String>,
    /// Base64 DKIM public key (the `p=` value).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dkim_public_key: Option<String>,
    /// PKCS#8 PEM private key. Only ever read by the mail transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dkim_private_key: Option<String>,
    /// Full DMARC TXT value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dmarc_record: Option<String>,
}

/// `Some` only for non-blank strings
fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl DnsFields {
    /// Columns derived from a plan.
    ///
    /// `dkim_private_key` is set only when the plan generated a new key. MX
    /// and SPF are left out when the address was unavailable so the
    /// `localhost` stand-ins never get persisted.
    #[must_use]
    pub fn from_plan(plan: &MailDomainAuthPlan) -> Self {
        let resolved = plan.server_address.is_resolved();
        Self {
            mx_record: resolved.then(|| plan.mx_hostname.clone()),
            spf_record: plan
                .spf_record()
                .filter(|_| resolved)
                .map(|r| r.value.clone()),
            dkim_selector: Some(plan.dkim_selector.clone()),
            dkim_public_key: plan.dkim_public_key().map(str::to_string),
            dkim_private_key: plan
                .signing_key
                .as_ref()
                .map(|key| key.private_key_pem.clone()),
            dmarc_record: plan.dmarc_record().map(|r| r.value.clone()),
        }
    }

    /// Fill every absent field from `fallback`.
    #[must_use]
    pub fn or(self, fallback: &Self) -> Self {
        fn pick(own: Option<String>, other: Option<&String>) -> Option<String> {
            own.filter(|v| !v.trim().is_empty())
                .or_else(|| present(other).map(str::to_string))
        }
        Self {
            mx_record: pick(self.mx_record, fallback.mx_record.as_ref()),
            spf_record: pick(self.spf_record, fallback.spf_record.as_ref()),
            dkim_selector: pick(self.dkim_selector, fallback.dkim_selector.as_ref()),
            dkim_public_key: pick(self.dkim_public_key, fallback.dkim_public_key.as_ref()),
            dkim_private_key: pick(self.dkim_private_key, fallback.dkim_private_key.as_ref()),
            dmarc_record: pick(self.dmarc_record, fallback.dmarc_record.as_ref()),
        }
    }

    pub fn spf(&self) -> Option<&str> {
        present(self.spf_record.as_ref())
    }

    pub fn selector(&self) -> Option<&str> {
        present(self.dkim_selector.as_ref())
    }

    pub fn public_key(&self) -> Option<&str> {
        present(self.dkim_public_key.as_ref())
    }

    pub fn dmarc(&self) -> Option<&str> {
        present(self.dmarc_record.as_ref())
    }
}

/// A mail domain row as stored by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord {
    /// Domain name (normalised).
    pub domain: String,
    /// DNS columns.
    #[serde(flatten)]
    pub dns: DnsFields,
    /// Set after a successful provider push.
    #[serde(default)]
    pub is_active: bool,
    /// Last write time.
    #[serde(with = "crate::utils::datetime")]
    pub updated_at: DateTime<Utc>,
}

impl DomainRecord {
    /// A new, inactive domain without DNS fields.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            dns: DnsFields::default(),
            is_active: false,
            updated_at: Utc::now(),
        }
    }
}
