//! 业务逻辑服务层

mod address_discovery;
mod domain_locks;
mod domain_service;
mod provisioning_service;
mod record_planner;

pub use address_discovery::{
    HttpAddressResolver, DEFAULT_DISCOVERY_ENDPOINT, DEFAULT_DISCOVERY_TIMEOUT,
};
pub use domain_locks::{DomainGuard, DomainLocks};
pub use domain_service::DomainService;
pub use provisioning_service::ProvisioningService;
pub use record_planner::{
    dmarc_value, mx_hostname_for, normalize_domain, spf_value, RecordPlanner,
};

use std::sync::Arc;

use mail_provisioner_provider::ProviderGateway;

use crate::traits::{AddressResolver, DomainRepository};

/// 服务上下文 - 持有所有依赖
///
/// 平台层创建此上下文并注入 Provider 网关、地址探测与持久化实现。
/// `gateway` 为 `None` 表示未配置 DNS Provider，这是正常状态而非错误。
pub struct ServiceContext {
    /// DNS Provider 网关（未配置凭证时为 None）
    pub gateway: Option<Arc<dyn ProviderGateway>>,
    /// 公网地址探测
    pub address_resolver: Arc<dyn AddressResolver>,
    /// 域名持久化仓库
    pub domain_repository: Arc<dyn DomainRepository>,
    /// 按域名的在途标记
    pub domain_locks: DomainLocks,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(
        gateway: Option<Arc<dyn ProviderGateway>>,
        address_resolver: Arc<dyn AddressResolver>,
        domain_repository: Arc<dyn DomainRepository>,
    ) -> Self {
        Self {
            gateway,
            address_resolver,
            domain_repository,
            domain_locks: DomainLocks::new(),
        }
    }

    /// 获取 Provider 网关（未配置时为 None）
    #[must_use]
    pub fn gateway(&self) -> Option<Arc<dyn ProviderGateway>> {
        self.gateway.clone()
    }

    /// 基于当前地址探测实现的记录规划器
    #[must_use]
    pub fn planner(&self) -> RecordPlanner {
        RecordPlanner::new(Arc::clone(&self.address_resolver))
    }
}
