//! Mail authentication record planner
//!
//! Turns a domain name into the ordered record set MX, \[A\], SPF, DKIM, DMARC.
//! Key generation happens first and is fatal on failure; address discovery
//! never fails and only changes which records are emitted.

use std::sync::Arc;

use crate::crypto::{decode_public_key_base64, format_for_dns, generate_signing_key_pair_async};
use crate::error::{CoreError, CoreResult};
use crate::traits::AddressResolver;
use crate::types::{
    DnsFields, DnsRecordSpec, MailDomainAuthPlan, PlanOptions, ServerAddress, SigningKeyPair,
    DEFAULT_DKIM_SELECTOR, LOCALHOST_SENTINEL, MAIL_HOST_LABEL, MX_PRIORITY,
};

const MAX_DOMAIN_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;

/// Builds [`MailDomainAuthPlan`]s.
#[derive(Clone)]
pub struct RecordPlanner {
    resolver: Arc<dyn AddressResolver>,
}

impl RecordPlanner {
    pub fn new(resolver: Arc<dyn AddressResolver>) -> Self {
        Self { resolver }
    }

    /// Plan from scratch: fresh key, fresh address, computed values.
    pub async fn plan(
        &self,
        domain: &str,
        selector: Option<&str>,
    ) -> CoreResult<MailDomainAuthPlan> {
        self.plan_with(domain, selector, &DnsFields::default(), PlanOptions::default())
            .await
    }

    /// Plan preferring persisted values.
    ///
    /// A persisted DKIM public key is reused unless `options.rotate_dkim` is
    /// set; persisted SPF and DMARC values replace the computed ones (see
    /// [`Self::assemble`] for when SPF is not reused).
    /// Selector precedence is `selector`, then the persisted one, then
    /// [`DEFAULT_DKIM_SELECTOR`].
    pub async fn plan_with(
        &self,
        domain: &str,
        selector: Option<&str>,
        existing: &DnsFields,
        options: PlanOptions,
    ) -> CoreResult<MailDomainAuthPlan> {
        let domain = normalize_domain(domain)?;
        let selector = selector
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| existing.selector())
            .unwrap_or(DEFAULT_DKIM_SELECTOR)
            .to_ascii_lowercase();
        validate_label(&selector, "DKIM selector")?;

        // 1. 密钥：失败直接终止
        let (public_key_base64, signing_key) = match existing.public_key() {
            Some(key) if !options.rotate_dkim => {
                decode_public_key_base64(key).map_err(|e| {
                    CoreError::Validation(format!("persisted DKIM key of {domain} is unusable: {e}"))
                })?;
                log::debug!("Reusing persisted DKIM key for {domain}");
                (key.to_string(), None)
            }
            _ => {
                let pair = generate_signing_key_pair_async().await?;
                log::info!("Generated new DKIM key for {domain} (selector {selector})");
                (pair.public_key_base64.clone(), Some(pair))
            }
        };

        // 2. 地址：失败降级为 localhost
        let server_address = self.resolver.discover().await;

        let plan = Self::assemble(
            &domain,
            &selector,
            server_address,
            &public_key_base64,
            existing,
            signing_key,
        );
        validate_plan(&plan)?;

        log::debug!(
            "Planned {} records for {domain} (address {server_address})",
            plan.records.len()
        );
        Ok(plan)
    }

    /// Pure record assembly; `domain` and `selector` must already be normalised.
    ///
    /// The MX host always follows `server_address`. A persisted SPF value is
    /// used only while the address is resolved and the value does not carry
    /// the `localhost` sentinel.
    pub fn assemble(
        domain: &str,
        selector: &str,
        server_address: ServerAddress,
        public_key_base64: &str,
        existing: &DnsFields,
        signing_key: Option<SigningKeyPair>,
    ) -> MailDomainAuthPlan {
        let mx_hostname = mx_hostname_for(domain, server_address);
        let spf = match existing.spf() {
            Some(spf) if server_address.is_resolved() && !is_sentinel_spf(spf) => spf.to_string(),
            _ => spf_value(server_address),
        };

        let mut records = Vec::with_capacity(5);
        records.push(DnsRecordSpec::mx("@", mx_hostname.clone(), MX_PRIORITY));
        if let Some(ip) = server_address.ip() {
            records.push(DnsRecordSpec::a(MAIL_HOST_LABEL, ip.to_string()));
        }
        records.push(DnsRecordSpec::txt("@", spf));
        records.push(DnsRecordSpec::txt(
            format!("{selector}._domainkey"),
            format_for_dns(public_key_base64),
        ));
        records.push(DnsRecordSpec::txt(
            "_dmarc",
            existing
                .dmarc()
                .map_or_else(|| dmarc_value(domain), str::to_string),
        ));

        MailDomainAuthPlan {
            domain: domain.to_string(),
            server_address,
            mx_hostname,
            dkim_selector: selector.to_string(),
            records,
            signing_key,
        }
    }
}

/// `mail.<domain>`, or `localhost` when the address is unknown.
pub fn mx_hostname_for(domain: &str, server_address: ServerAddress) -> String {
    if server_address.is_resolved() {
        format!("{MAIL_HOST_LABEL}.{domain}")
    } else {
        LOCALHOST_SENTINEL.to_string()
    }
}

/// `v=spf1 mx ip4:<address> ~all`
pub fn spf_value(server_address: ServerAddress) -> String {
    format!("v=spf1 mx ip4:{server_address} ~all")
}

/// Whether an SPF value was computed without a real address.
fn is_sentinel_spf(spf: &str) -> bool {
    spf.contains(&format!("ip4:{LOCALHOST_SENTINEL}"))
}

/// `v=DMARC1; p=quarantine; rua=mailto:postmaster@<domain>; pct=100`
pub fn dmarc_value(domain: &str) -> String {
    format!("v=DMARC1; p=quarantine; rua=mailto:postmaster@{domain}; pct=100")
}

/// Trim, lowercase, drop the trailing dot and check hostname syntax.
pub fn normalize_domain(domain: &str) -> CoreResult<String> {
    let normalized = domain.trim().trim_end_matches('.').to_ascii_lowercase();

    if normalized.is_empty() {
        return Err(CoreError::Validation("domain name is empty".to_string()));
    }
    if normalized.len() > MAX_DOMAIN_LENGTH {
        return Err(CoreError::Validation(format!(
            "domain name exceeds {MAX_DOMAIN_LENGTH} characters: {normalized}"
        )));
    }

    let labels: Vec<&str> = normalized.split('.').collect();
    if labels.len() < 2 {
        return Err(CoreError::Validation(format!(
            "'{normalized}' is not a fully qualified domain name"
        )));
    }
    for label in labels {
        validate_label(label, "domain label")?;
    }
    Ok(normalized)
}

fn validate_label(label: &str, what: &str) -> CoreResult<()> {
    let valid = !label.is_empty()
        && label.len() <= MAX_LABEL_LENGTH
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("invalid {what}: '{label}'")))
    }
}

fn validate_plan(plan: &MailDomainAuthPlan) -> CoreResult<()> {
    match plan.dkim_public_key() {
        Some(key) if !key.is_empty() => Ok(()),
        _ => Err(CoreError::Validation(format!(
            "DKIM public key for {} is empty",
            plan.domain
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::test_utils::{FixedAddressResolver, TEST_ADDRESS};
    use crate::types::DnsRecordType;

    fn resolved() -> ServerAddress {
        ServerAddress::Resolved(TEST_ADDRESS)
    }

    fn labels(plan: &MailDomainAuthPlan) -> Vec<String> {
        plan.records.iter().map(DnsRecordSpec::label).collect()
    }

    #[test]
    fn example_com_record_set_is_exact() {
        let plan = RecordPlanner::assemble(
            "example.com",
            "default",
            resolved(),
            "MIIBIjANBg",
            &DnsFields::default(),
            None,
        );

        let expected = vec![
            DnsRecordSpec::mx("@", "mail.example.com", 10),
            DnsRecordSpec::a("mail", "203.0.113.10"),
            DnsRecordSpec::txt("@", "v=spf1 mx ip4:203.0.113.10 ~all"),
            DnsRecordSpec::txt("default._domainkey", "v=DKIM1; k=rsa; p=MIIBIjANBg"),
            DnsRecordSpec::txt(
                "_dmarc",
                "v=DMARC1; p=quarantine; rua=mailto:postmaster@example.com; pct=100",
            ),
        ];
        assert_eq!(plan.records, expected);
        assert!(plan.records.iter().all(|r| r.ttl == 3600));
        assert_eq!(plan.mx_hostname, "mail.example.com");
    }

    #[test]
    fn unavailable_address_uses_localhost_and_drops_a_record() {
        let plan = RecordPlanner::assemble(
            "example.com",
            "default",
            ServerAddress::Unavailable,
            "KEY",
            &DnsFields::default(),
            None,
        );
        assert_eq!(
            labels(&plan),
            vec!["MX @", "TXT @", "TXT default._domainkey", "TXT _dmarc"]
        );
        assert_eq!(plan.mx_hostname, "localhost");
        assert_eq!(plan.records[0].value, "localhost");
        assert_eq!(plan.records[1].value, "v=spf1 mx ip4:localhost ~all");
        assert!(plan.record(DnsRecordType::A, "mail").is_none());
    }

    #[test]
    fn persisted_values_take_precedence() {
        let existing = DnsFields {
            mx_record: Some("mail.example.com".into()),
            spf_record: Some("v=spf1 include:_spf.provider.net -all".into()),
            dmarc_record: Some("v=DMARC1; p=reject".into()),
            ..DnsFields::default()
        };
        let plan =
            RecordPlanner::assemble("example.com", "s1", resolved(), "KEY", &existing, None);

        assert_eq!(plan.mx_hostname, "mail.example.com");
        assert_eq!(
            plan.spf_record().map(|r| r.value.as_str()),
            Some("v=spf1 include:_spf.provider.net -all")
        );
        assert_eq!(
            plan.dmarc_record().map(|r| r.value.as_str()),
            Some("v=DMARC1; p=reject")
        );
        assert_eq!(plan.dkim_record_name(), "s1._domainkey");
        // A 仍按探测结果生成
        assert!(plan.record(DnsRecordType::A, "mail").is_some());
    }

    #[test]
    fn persisted_mx_never_overrides_the_address() {
        let existing = DnsFields {
            mx_record: Some("mail.example.com".into()),
            spf_record: Some("v=spf1 mx ip4:198.51.100.7 ~all".into()),
            ..DnsFields::default()
        };
        let plan = RecordPlanner::assemble(
            "example.com",
            "default",
            ServerAddress::Unavailable,
            "KEY",
            &existing,
            None,
        );

        assert_eq!(plan.mx_hostname, "localhost");
        assert_eq!(plan.records[0].value, "localhost");
        assert!(plan.record(DnsRecordType::A, "mail").is_none());
        assert_eq!(
            plan.spf_record().map(|r| r.value.as_str()),
            Some("v=spf1 mx ip4:localhost ~all")
        );

        let stale = DnsFields {
            mx_record: Some("old-host.example.net".into()),
            ..DnsFields::default()
        };
        let plan =
            RecordPlanner::assemble("example.com", "default", resolved(), "KEY", &stale, None);
        assert_eq!(plan.mx_hostname, "mail.example.com");
    }

    #[test]
    fn sentinel_values_are_recomputed_once_address_resolves() {
        let legacy = DnsFields {
            mx_record: Some("localhost".into()),
            spf_record: Some("v=spf1 mx ip4:localhost ~all".into()),
            ..DnsFields::default()
        };
        let plan =
            RecordPlanner::assemble("example.com", "default", resolved(), "KEY", &legacy, None);

        assert_eq!(plan.mx_hostname, "mail.example.com");
        assert_eq!(plan.records[0].value, "mail.example.com");
        assert_eq!(plan.records[1].value, "203.0.113.10");
        assert_eq!(plan.records[2].value, "v=spf1 mx ip4:203.0.113.10 ~all");
    }

    #[tokio::test]
    async fn unresolved_run_followed_by_resolved_run_recovers() {
        let offline = RecordPlanner::new(Arc::new(FixedAddressResolver::unavailable()));
        let first = offline.plan("example.com", None).await.unwrap();
        let persisted = DnsFields::from_plan(&first);
        assert!(persisted.mx_record.is_none());
        assert!(persisted.spf_record.is_none());

        let online = RecordPlanner::new(Arc::new(FixedAddressResolver::resolved(TEST_ADDRESS)));
        let second = online
            .plan_with("example.com", None, &persisted, PlanOptions::default())
            .await
            .unwrap();

        assert_eq!(second.server_address, resolved());
        assert_eq!(second.mx_hostname, "mail.example.com");
        assert_eq!(
            labels(&second),
            vec!["MX @", "A mail", "TXT @", "TXT default._domainkey", "TXT _dmarc"]
        );
        assert_eq!(second.records[2].value, "v=spf1 mx ip4:203.0.113.10 ~all");
        // 密钥沿用首次生成的
        assert!(second.signing_key.is_none());
        assert_eq!(second.dkim_public_key(), first.dkim_public_key());
    }

    #[test]
    fn domain_normalisation() {
        assert_eq!(normalize_domain("  Example.COM. ").unwrap(), "example.com");
        assert_eq!(normalize_domain("mx-1.sub.example.org").unwrap(), "mx-1.sub.example.org");

        for bad in [
            "",
            "localhost",
            "example..com",
            "-bad.example.com",
            "bad-.example.com",
            "under_score.example.com",
            "exa mple.com",
        ] {
            assert!(
                matches!(normalize_domain(bad), Err(CoreError::Validation(_))),
                "accepted {bad:?}"
            );
        }
        let long_label = format!("{}.com", "a".repeat(64));
        assert!(normalize_domain(&long_label).is_err());
        let too_long = format!("{}com", "abcdefghi.".repeat(26));
        assert!(normalize_domain(&too_long).is_err());
    }

    #[tokio::test]
    async fn plan_generates_key_and_discovers_address() {
        let resolver = Arc::new(FixedAddressResolver::resolved(TEST_ADDRESS));
        let planner = RecordPlanner::new(resolver.clone());

        let plan = planner.plan("Example.com.", None).await.unwrap();

        assert_eq!(plan.domain, "example.com");
        assert_eq!(plan.dkim_selector, "default");
        assert_eq!(
            labels(&plan),
            vec![
                "MX @",
                "A mail",
                "TXT @",
                "TXT default._domainkey",
                "TXT _dmarc"
            ]
        );
        let key = plan.signing_key.as_ref().expect("fresh key expected");
        assert_eq!(plan.dkim_public_key(), Some(key.public_key_base64.as_str()));
        assert_eq!(resolver.calls(), 1);
    }

    #[tokio::test]
    async fn plan_with_reuses_persisted_key_unless_rotating() {
        let pair = crate::crypto::generate_signing_key_pair().unwrap();
        let existing = DnsFields {
            dkim_selector: Some("mail2024".into()),
            dkim_public_key: Some(pair.public_key_base64.clone()),
            dkim_private_key: Some(pair.private_key_pem.clone()),
            ..DnsFields::default()
        };
        let planner = RecordPlanner::new(Arc::new(FixedAddressResolver::unavailable()));

        let reused = planner
            .plan_with("example.com", None, &existing, PlanOptions::default())
            .await
            .unwrap();
        assert!(reused.signing_key.is_none());
        assert_eq!(reused.dkim_selector, "mail2024");
        assert_eq!(reused.dkim_public_key(), Some(pair.public_key_base64.as_str()));

        let rotated = planner
            .plan_with(
                "example.com",
                Some("fresh"),
                &existing,
                PlanOptions { rotate_dkim: true },
            )
            .await
            .unwrap();
        assert!(rotated.signing_key.is_some());
        assert_eq!(rotated.dkim_selector, "fresh");
        assert_ne!(rotated.dkim_public_key(), Some(pair.public_key_base64.as_str()));
    }

    #[tokio::test]
    async fn corrupt_persisted_key_is_rejected() {
        let existing = DnsFields {
            dkim_public_key: Some("bm90IGEga2V5".into()),
            ..DnsFields::default()
        };
        let planner = RecordPlanner::new(Arc::new(FixedAddressResolver::resolved(
            Ipv4Addr::new(192, 0, 2, 1),
        )));
        let result = planner
            .plan_with("example.com", None, &existing, PlanOptions::default())
            .await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn invalid_selector_rejected() {
        let planner = RecordPlanner::new(Arc::new(FixedAddressResolver::unavailable()));
        let result = planner.plan("example.com", Some("bad selector")).await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn empty_dkim_key_fails_validation() {
        let plan = RecordPlanner::assemble(
            "example.com",
            "default",
            resolved(),
            "",
            &DnsFields::default(),
            None,
        );
        assert!(matches!(validate_plan(&plan), Err(CoreError::Validation(_))));
    }
}
