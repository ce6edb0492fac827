//! GoDaddy `ProviderGateway` 实现

use async_trait::async_trait;

use crate::error::Result;
use crate::providers::common::{normalize_domain_name, txt_supersedes};
use crate::traits::{ErrorContext, ProviderGateway};
use crate::types::{
    DnsRecordSpec, DnsRecordType, FieldType, ProviderCredentialField, ProviderFeatures,
    ProviderMetadata, ProviderType,
};

use super::types::{GodaddyDomain, GodaddyRecord};
use super::{GodaddyProvider, MAX_PAGE_SIZE_DOMAINS};

impl GodaddyProvider {
    /// 同 type + name 的记录集路径（`@`、`_dmarc` 等名称原样放入路径）
    fn record_set_path(domain: &str, record: &DnsRecordSpec) -> String {
        format!(
            "/v1/domains/{}/records/{}/{}",
            urlencoding::encode(domain),
            record.record_type.as_str(),
            record.name
        )
    }

    /// 替换后的完整记录集
    ///
    /// PUT 会覆盖该 type + name 下的全部记录，所以 TXT 需要先读出并保留
    /// 不会被 `record` 取代的值（如 `@` 上的站点验证）。MX / A 只保留新值。
    async fn replacement_set(
        &self,
        path: &str,
        record: &DnsRecordSpec,
        ctx: ErrorContext,
    ) -> Result<Vec<GodaddyRecord>> {
        let mut set = Vec::new();
        if record.record_type == DnsRecordType::Txt {
            let current: Vec<GodaddyRecord> = self.get(path, ctx).await?;
            set.extend(
                current
                    .into_iter()
                    .filter(|existing| !txt_supersedes(record, &existing.data)),
            );
        }
        set.push(GodaddyRecord::from(record));
        Ok(set)
    }
}

#[async_trait]
impl ProviderGateway for GodaddyProvider {
    fn id(&self) -> &'static str {
        "godaddy"
    }

    fn metadata() -> ProviderMetadata {
        ProviderMetadata {
            id: ProviderType::Godaddy,
            name: "GoDaddy".to_string(),
            description: "GoDaddy Domains API".to_string(),
            required_fields: vec![
                ProviderCredentialField {
                    key: "apiKey".to_string(),
                    label: "API Key".to_string(),
                    field_type: FieldType::Text,
                    help_text: None,
                },
                ProviderCredentialField {
                    key: "apiSecret".to_string(),
                    label: "API Secret".to_string(),
                    field_type: FieldType::Password,
                    help_text: None,
                },
            ],
            features: ProviderFeatures {
                atomic_batch: false,
            },
        }
    }

    async fn validate_credentials(&self) -> Result<bool> {
        match self
            .get::<Vec<GodaddyDomain>>("/v1/domains?limit=1", ErrorContext::default())
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_auth_failure() => {
                log::warn!("[godaddy] credential check rejected: {e}");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn list_domains(&self) -> Result<Vec<String>> {
        let mut domains: Vec<String> = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut path = format!("/v1/domains?limit={MAX_PAGE_SIZE_DOMAINS}");
            if let Some(ref last) = marker {
                path.push_str(&format!("&marker={}", urlencoding::encode(last)));
            }

            let page: Vec<GodaddyDomain> = self.get(&path, ErrorContext::default()).await?;
            let full_page = page.len() >= MAX_PAGE_SIZE_DOMAINS as usize;
            marker = page.last().map(|d| d.domain.clone());

            domains.extend(
                page.into_iter()
                    .filter(|d| d.status.as_deref().is_none_or(|s| s != "CANCELLED"))
                    .map(|d| normalize_domain_name(&d.domain)),
            );

            if !full_page {
                break;
            }
        }

        Ok(domains)
    }

    /// `upsert_records` 使用默认的逐条写入：首个失败即终止，之前写入的记录保留。
    async fn upsert_record(&self, domain: &str, record: &DnsRecordSpec) -> Result<()> {
        let domain = normalize_domain_name(domain);
        let path = Self::record_set_path(&domain, record);
        let ctx = ErrorContext::for_record(&domain, record);

        let set = self.replacement_set(&path, record, ctx.clone()).await?;
        log::debug!(
            "[godaddy] replacing {} on {domain} ({} value(s))",
            record.label(),
            set.len()
        );
        self.put(&path, &set, ctx).await
    }
}
