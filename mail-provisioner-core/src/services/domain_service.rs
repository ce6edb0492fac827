//! 域名管理服务
//!
//! 持久化边界上的用例：读取域名行、执行 provisioning、回写 DNS 字段。

use std::sync::Arc;

use chrono::Utc;

use crate::error::{CoreError, CoreResult};
use crate::services::{normalize_domain, ProvisioningService, ServiceContext};
use crate::types::{DomainRecord, PlanOptions, ProvisioningResult};

/// 域名管理服务
pub struct DomainService {
    ctx: Arc<ServiceContext>,
    provisioning: ProvisioningService,
}

impl DomainService {
    /// 创建域名服务实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            provisioning: ProvisioningService::new(Arc::clone(&ctx)),
            ctx,
        }
    }

    /// 登记新域名（已存在时返回原记录）
    pub async fn register_domain(&self, domain: &str) -> CoreResult<DomainRecord> {
        let domain = normalize_domain(domain)?;
        if let Some(existing) = self.ctx.domain_repository.find(&domain).await? {
            return Ok(existing);
        }
        let record = DomainRecord::new(domain);
        self.ctx.domain_repository.save(&record).await?;
        log::info!("Registered domain {}", record.domain);
        Ok(record)
    }

    /// 读取已存储域名并执行 provisioning
    ///
    /// 推送执行过（无论成功与否）都会回写 DNS 字段，`is_active` 与推送结果一致。
    /// 未配置或凭证无效时不修改存储。
    pub async fn provision_stored_domain(
        &self,
        domain: &str,
        options: PlanOptions,
    ) -> CoreResult<ProvisioningResult> {
        let domain = normalize_domain(domain)?;
        let mut record = self
            .ctx
            .domain_repository
            .find(&domain)
            .await?
            .ok_or_else(|| CoreError::DomainNotFound(domain.clone()))?;

        let result = self
            .provisioning
            .provision_domain(&domain, &record.dns, options)
            .await?;

        if let Some(fields) = &result.dns_fields {
            record.dns = fields.clone();
            record.is_active = result.success;
            record.updated_at = Utc::now();
            self.ctx.domain_repository.save(&record).await?;
        }

        Ok(result)
    }

    /// 删除域名；仍有邮箱地址挂在域名下时拒绝
    pub async fn delete_domain(&self, domain: &str) -> CoreResult<()> {
        let domain = normalize_domain(domain)?;
        if self.ctx.domain_repository.find(&domain).await?.is_none() {
            return Err(CoreError::DomainNotFound(domain));
        }

        let addresses = self.ctx.domain_repository.address_count(&domain).await?;
        if addresses > 0 {
            return Err(CoreError::DomainHasDependentAddresses { domain, addresses });
        }

        self.ctx.domain_repository.delete(&domain).await?;
        log::info!("Deleted domain {domain}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mail_provisioner_provider::ProviderGateway;

    use super::*;
    use crate::test_utils::{FixedAddressResolver, MockGateway, TEST_ADDRESS};
    use crate::traits::{DomainRepository, InMemoryDomainRepository};
    use crate::types::ProvisioningStatus;

    struct Fixture {
        service: DomainService,
        repository: Arc<InMemoryDomainRepository>,
        gateway: Arc<MockGateway>,
    }

    fn fixture(gateway: MockGateway, configured: bool) -> Fixture {
        let gateway = Arc::new(gateway);
        let repository = Arc::new(InMemoryDomainRepository::new());
        let ctx = ServiceContext::new(
            configured.then(|| Arc::clone(&gateway) as Arc<dyn ProviderGateway>),
            Arc::new(FixedAddressResolver::resolved(TEST_ADDRESS)),
            repository.clone(),
        );
        Fixture {
            service: DomainService::new(Arc::new(ctx)),
            repository,
            gateway,
        }
    }

    #[tokio::test]
    async fn provision_stored_domain_writes_back_fields() {
        let f = fixture(MockGateway::accepting(), true);
        f.service.register_domain("Example.com").await.unwrap();

        let result = f
            .service
            .provision_stored_domain("example.com", PlanOptions::default())
            .await
            .unwrap();
        assert!(result.success);

        let stored = f.repository.find("example.com").await.unwrap().unwrap();
        assert!(stored.is_active);
        assert_eq!(stored.dns.mx_record.as_deref(), Some("mail.example.com"));
        assert!(stored.dns.dkim_public_key.is_some());
        assert!(stored.dns.dkim_private_key.is_some());
    }

    #[tokio::test]
    async fn second_provision_reuses_stored_key() {
        let f = fixture(MockGateway::accepting(), true);
        f.service.register_domain("example.com").await.unwrap();

        f.service
            .provision_stored_domain("example.com", PlanOptions::default())
            .await
            .unwrap();
        let first = f.repository.find("example.com").await.unwrap().unwrap();

        f.service
            .provision_stored_domain("example.com", PlanOptions::default())
            .await
            .unwrap();
        let second = f.repository.find("example.com").await.unwrap().unwrap();

        assert_eq!(first.dns.dkim_public_key, second.dns.dkim_public_key);
        assert_eq!(first.dns.dkim_private_key, second.dns.dkim_private_key);
        assert_eq!(f.gateway.push_calls(), 2);
    }

    #[tokio::test]
    async fn failed_push_marks_domain_inactive() {
        let f = fixture(MockGateway::accepting().failing_on("mail"), true);
        f.service.register_domain("example.com").await.unwrap();

        let result = f
            .service
            .provision_stored_domain("example.com", PlanOptions::default())
            .await
            .unwrap();
        assert_eq!(result.status, ProvisioningStatus::Failed);

        let stored = f.repository.find("example.com").await.unwrap().unwrap();
        assert!(!stored.is_active);
        assert!(stored.dns.dkim_private_key.is_some());
    }

    #[tokio::test]
    async fn unconfigured_leaves_storage_untouched() {
        let f = fixture(MockGateway::accepting(), false);
        let registered = f.service.register_domain("example.com").await.unwrap();

        let result = f
            .service
            .provision_stored_domain("example.com", PlanOptions::default())
            .await
            .unwrap();
        assert!(!result.configured);

        let stored = f.repository.find("example.com").await.unwrap().unwrap();
        assert_eq!(stored, registered);
    }

    #[tokio::test]
    async fn provisioning_unknown_domain_fails() {
        let f = fixture(MockGateway::accepting(), true);
        let result = f
            .service
            .provision_stored_domain("missing.example", PlanOptions::default())
            .await;
        assert!(matches!(result, Err(CoreError::DomainNotFound(d)) if d == "missing.example"));
        assert_eq!(f.gateway.validate_calls(), 0);
    }

    #[tokio::test]
    async fn delete_refuses_domain_with_addresses() {
        let f = fixture(MockGateway::accepting(), true);
        f.service.register_domain("example.com").await.unwrap();
        f.repository.set_address_count("example.com", 3).await;

        let result = f.service.delete_domain("example.com").await;
        assert!(matches!(
            result,
            Err(CoreError::DomainHasDependentAddresses { addresses: 3, .. })
        ));
        assert!(f.repository.find("example.com").await.unwrap().is_some());

        f.repository.set_address_count("example.com", 0).await;
        f.service.delete_domain("example.com").await.unwrap();
        assert!(f.repository.find("example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_unknown_domain_fails() {
        let f = fixture(MockGateway::accepting(), true);
        assert!(matches!(
            f.service.delete_domain("missing.example").await,
            Err(CoreError::DomainNotFound(_))
        ));
    }
}
