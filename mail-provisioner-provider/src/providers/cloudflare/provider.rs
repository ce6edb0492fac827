//! Cloudflare `ProviderGateway` 实现

use async_trait::async_trait;
use reqwest::Method;

use crate::error::{ProviderError, Result};
use crate::providers::common::{normalize_domain_name, relative_to_full_name, txt_supersedes};
use crate::traits::{ErrorContext, ProviderErrorMapper, ProviderGateway};
use crate::types::{
    DnsRecordSpec, DnsRecordType, FieldType, ProviderCredentialField, ProviderFeatures,
    ProviderMetadata, ProviderType,
};

use super::types::{CloudflareRecordBody, TokenVerification};
use super::{
    CloudflareDnsRecord, CloudflareProvider, CloudflareZone, MAX_PAGE_SIZE_RECORDS,
    MAX_PAGE_SIZE_ZONES,
};

impl CloudflareProvider {
    /// 按域名查找 zone
    pub(crate) async fn find_zone(&self, domain: &str) -> Result<CloudflareZone> {
        let path = format!("/zones?name={}", urlencoding::encode(domain));
        let zones: Vec<CloudflareZone> = self
            .get_result(&path, ErrorContext::for_domain(domain))
            .await?;

        zones
            .into_iter()
            .find(|zone| normalize_domain_name(&zone.name) == domain)
            .ok_or_else(|| ProviderError::DomainNotFound {
                provider: self.provider_name().to_string(),
                domain: domain.to_string(),
                raw_message: None,
            })
    }

    /// 查找与待写入记录对应的已有记录（type + name，TXT 另见 `txt_supersedes`）
    pub(crate) async fn find_existing(
        &self,
        zone: &CloudflareZone,
        full_name: &str,
        record: &DnsRecordSpec,
        ctx: ErrorContext,
    ) -> Result<Option<CloudflareDnsRecord>> {
        let path = format!(
            "/zones/{}/dns_records?type={}&name={}&per_page={MAX_PAGE_SIZE_RECORDS}",
            zone.id,
            record.record_type.as_str(),
            urlencoding::encode(full_name),
        );
        let candidates: Vec<CloudflareDnsRecord> = self.get_result(&path, ctx).await?;
        Ok(select_existing(candidates, record))
    }
}

/// 从同名同类型的候选记录中挑出要覆盖的那一条
fn select_existing(
    candidates: Vec<CloudflareDnsRecord>,
    record: &DnsRecordSpec,
) -> Option<CloudflareDnsRecord> {
    let mut candidates = candidates
        .into_iter()
        .filter(|c| c.record_type.eq_ignore_ascii_case(record.record_type.as_str()));

    match record.record_type {
        DnsRecordType::Txt => candidates.find(|c| txt_supersedes(record, &c.content)),
        _ => candidates.next(),
    }
}

#[async_trait]
impl ProviderGateway for CloudflareProvider {
    fn id(&self) -> &'static str {
        "cloudflare"
    }

    fn metadata() -> ProviderMetadata {
        ProviderMetadata {
            id: ProviderType::Cloudflare,
            name: "Cloudflare".to_string(),
            description: "Cloudflare DNS".to_string(),
            required_fields: vec![ProviderCredentialField {
                key: "apiToken".to_string(),
                label: "API Token".to_string(),
                field_type: FieldType::Password,
                help_text: Some("Token with Zone:Read and Zone:DNS:Edit permissions".to_string()),
            }],
            features: ProviderFeatures {
                atomic_batch: false,
            },
        }
    }

    async fn validate_credentials(&self) -> Result<bool> {
        match self
            .get_result::<TokenVerification>("/user/tokens/verify", ErrorContext::default())
            .await
        {
            Ok(verification) => Ok(verification.status == "active"),
            Err(e) if e.is_auth_failure() => {
                log::warn!("[cloudflare] credential check rejected: {e}");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn list_domains(&self) -> Result<Vec<String>> {
        let mut domains = Vec::new();
        let mut page = 1;

        loop {
            let path = format!("/zones?page={page}&per_page={MAX_PAGE_SIZE_ZONES}");
            let response = self
                .get::<Vec<CloudflareZone>>(&path, ErrorContext::default())
                .await?;

            let zones = response.result.unwrap_or_default();
            let fetched = zones.len();
            domains.extend(zones.into_iter().map(|z| normalize_domain_name(&z.name)));

            let total_pages = response
                .result_info
                .as_ref()
                .and_then(|info| info.total_pages)
                .unwrap_or(1);
            let current = response.result_info.map_or(page, |info| info.page);
            if fetched == 0 || current >= total_pages {
                break;
            }
            page = current + 1;
        }

        Ok(domains)
    }

    async fn upsert_record(&self, domain: &str, record: &DnsRecordSpec) -> Result<()> {
        let domain = normalize_domain_name(domain);
        let zone = self.find_zone(&domain).await?;
        let full_name = relative_to_full_name(&record.name, &zone.name);

        let existing = self
            .find_existing(&zone, &full_name, record, ErrorContext::for_record(&domain, record))
            .await?;

        let body = CloudflareRecordBody {
            record_type: record.record_type.as_str(),
            name: full_name,
            content: &record.value,
            ttl: record.ttl,
            priority: record.priority,
        };
        let ctx = ErrorContext::for_record(&domain, record);

        match existing {
            Some(current) => {
                log::debug!("[cloudflare] replacing {} ({})", record.label(), current.id);
                self.write(
                    Method::PUT,
                    &format!("/zones/{}/dns_records/{}", zone.id, current.id),
                    &body,
                    ctx,
                )
                .await
            }
            None => {
                log::debug!("[cloudflare] creating {}", record.label());
                self.write(
                    Method::POST,
                    &format!("/zones/{}/dns_records", zone.id),
                    &body,
                    ctx,
                )
                .await
            }
        }
    }
}
