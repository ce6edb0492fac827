//! Mail authentication record plan types

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

pub use mail_provisioner_provider::{DnsRecordSpec, DnsRecordType, DEFAULT_TTL};

use super::SigningKeyPair;

/// Stand-in host used when the public address could not be discovered.
pub const LOCALHOST_SENTINEL: &str = "localhost";
/// Selector used when the caller does not name one.
pub const DEFAULT_DKIM_SELECTOR: &str = "default";
/// Priority of the single MX record.
pub const MX_PRIORITY: u16 = 10;
/// Relative name of the mail host A record.
pub const MAIL_HOST_LABEL: &str = "mail";

/// Outcome of public address discovery.
///
/// Discovery never fails outright: any problem degrades to `Unavailable`,
/// which suppresses the A record and points MX at [`LOCALHOST_SENTINEL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "address", rename_all = "camelCase")]
pub enum ServerAddress {
    /// Routable IPv4 address of this host.
    Resolved(Ipv4Addr),
    /// Lookup failed, timed out or returned garbage.
    Unavailable,
}

impl ServerAddress {
    /// The resolved address, if any.
    #[must_use]
    pub fn ip(&self) -> Option<Ipv4Addr> {
        match self {
            Self::Resolved(ip) => Some(*ip),
            Self::Unavailable => None,
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Renders the address, or `localhost` when unavailable.
impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(ip) => write!(f, "{ip}"),
            Self::Unavailable => f.write_str(LOCALHOST_SENTINEL),
        }
    }
}

/// Knobs for [`crate::services::RecordPlanner::plan_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOptions {
    /// Generate a fresh DKIM key even if one is already persisted.
    #[serde(default)]
    pub rotate_dkim: bool,
}

/// The full set of records that authenticates a mail domain.
///
/// Records are always ordered MX, \[A\], SPF, DKIM, DMARC.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailDomainAuthPlan {
    /// Normalised domain name (lowercase, no trailing dot).
    pub domain: String,
    /// Discovered public address of the mail host.
    pub server_address: ServerAddress,
    /// `mail.<domain>`, or `localhost` when the address is unavailable.
    pub mx_hostname: String,
    /// DKIM selector (`<selector>._domainkey`).
    pub dkim_selector: String,
    /// Ordered record set.
    pub records: Vec<DnsRecordSpec>,
    /// Present only when a key was generated for this plan, so the caller can
    /// persist the private half. Never serialised.
    #[serde(skip)]
    pub signing_key: Option<SigningKeyPair>,
}

impl MailDomainAuthPlan {
    /// First record of a given type and relative name.
    #[must_use]
    pub fn record(&self, record_type: DnsRecordType, name: &str) -> Option<&DnsRecordSpec> {
        self.records
            .iter()
            .find(|r| r.record_type == record_type && r.name == name)
    }

    /// Name of the DKIM TXT record.
    #[must_use]
    pub fn dkim_record_name(&self) -> String {
        format!("{}._domainkey", self.dkim_selector)
    }

    /// The SPF TXT record at the apex.
    #[must_use]
    pub fn spf_record(&self) -> Option<&DnsRecordSpec> {
        self.records
            .iter()
            .find(|r| r.name == "@" && r.txt_tag() == Some("v=spf1"))
    }

    /// The DMARC TXT record.
    #[must_use]
    pub fn dmarc_record(&self) -> Option<&DnsRecordSpec> {
        self.record(DnsRecordType::Txt, "_dmarc")
    }

    /// The DKIM TXT record.
    #[must_use]
    pub fn dkim_record(&self) -> Option<&DnsRecordSpec> {
        self.record(DnsRecordType::Txt, &self.dkim_record_name())
    }

    /// Base64 public key advertised by the DKIM record (`p=` tag).
    #[must_use]
    pub fn dkim_public_key(&self) -> Option<&str> {
        self.dkim_record()?
            .value
            .split(';')
            .map(str::trim)
            .find_map(|tag| tag.strip_prefix("p="))
    }

    /// BIND-style rendering for previews, one record per line.
    ///
    /// TXT payloads longer than 255 bytes are split into several quoted strings.
    #[must_use]
    pub fn to_zone_file(&self) -> String {
        let mut out = format!("; mail authentication records for {}\n", self.domain);
        out.push_str(&format!("$ORIGIN {}.\n", self.domain));
        for record in &self.records {
            out.push_str(&zone_line(record));
            out.push('\n');
        }
        out
    }
}

fn zone_line(record: &DnsRecordSpec) -> String {
    match record.record_type {
        DnsRecordType::Mx => format!(
            "{}\t{}\tIN\tMX\t{} {}.",
            record.name,
            record.ttl,
            record.priority.unwrap_or(MX_PRIORITY),
            record.value
        ),
        DnsRecordType::A => format!("{}\t{}\tIN\tA\t{}", record.name, record.ttl, record.value),
        DnsRecordType::Txt => format!(
            "{}\t{}\tIN\tTXT\t{}",
            record.name,
            record.ttl,
            quote_txt(&record.value)
        ),
    }
}

/// 按 255 字节切分并加引号
fn quote_txt(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    let mut chunks = Vec::new();
    let mut rest = escaped.as_str();
    while rest.len() > 255 {
        let mut cut = 255;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        let (head, tail) = rest.split_at(cut);
        chunks.push(format!("\"{head}\""));
        rest = tail;
    }
    chunks.push(format!("\"{rest}\""));
    chunks.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> MailDomainAuthPlan {
        MailDomainAuthPlan {
            domain: "example.com".into(),
            server_address: ServerAddress::Resolved(Ipv4Addr::new(203, 0, 113, 10)),
            mx_hostname: "mail.example.com".into(),
            dkim_selector: "default".into(),
            records: vec![
                DnsRecordSpec::mx("@", "mail.example.com", 10),
                DnsRecordSpec::a("mail", "203.0.113.10"),
                DnsRecordSpec::txt("@", "v=spf1 mx ip4:203.0.113.10 ~all"),
                DnsRecordSpec::txt("default._domainkey", format!("v=DKIM1; k=rsa; p={}", "A".repeat(300))),
                DnsRecordSpec::txt(
                    "_dmarc",
                    "v=DMARC1; p=quarantine; rua=mailto:postmaster@example.com; pct=100",
                ),
            ],
            signing_key: None,
        }
    }

    #[test]
    fn server_address_display() {
        assert_eq!(
            ServerAddress::Resolved(Ipv4Addr::new(203, 0, 113, 10)).to_string(),
            "203.0.113.10"
        );
        assert_eq!(ServerAddress::Unavailable.to_string(), "localhost");
        assert!(ServerAddress::Unavailable.ip().is_none());
    }

    #[test]
    fn record_accessors() {
        let plan = plan();
        assert_eq!(plan.dkim_record_name(), "default._domainkey");
        assert_eq!(plan.dkim_public_key(), Some("A".repeat(300).as_str()));
        assert!(plan.spf_record().is_some());
        assert_eq!(
            plan.dmarc_record().map(|r| r.value.as_str()),
            Some("v=DMARC1; p=quarantine; rua=mailto:postmaster@example.com; pct=100")
        );
    }

    #[test]
    fn zone_file_lines() {
        let zone = plan().to_zone_file();
        let lines: Vec<&str> = zone.lines().collect();
        assert_eq!(lines[1], "$ORIGIN example.com.");
        assert_eq!(lines[2], "@\t3600\tIN\tMX\t10 mail.example.com.");
        assert_eq!(lines[3], "mail\t3600\tIN\tA\t203.0.113.10");
        assert_eq!(lines[4], "@\t3600\tIN\tTXT\t\"v=spf1 mx ip4:203.0.113.10 ~all\"");
        // 2048-bit keys exceed a single TXT string
        assert!(lines[5].starts_with("default._domainkey\t3600\tIN\tTXT\t\"v=DKIM1; k=rsa; p="));
        assert_eq!(lines[5].matches("\" \"").count(), 1);
    }

    #[test]
    fn plan_serialisation_skips_signing_key() {
        let mut plan = plan();
        plan.signing_key = Some(SigningKeyPair {
            public_key_pem: String::new(),
            private_key_pem: "SECRET".into(),
            public_key_base64: String::new(),
        });
        let json = serde_json::to_string(&plan).unwrap();
        assert!(!json.contains("SECRET"));
        assert!(json.contains("\"mxHostname\":\"mail.example.com\""));
    }
}
