//! 按域名的在途标记
//!
//! 同一域名同时只允许一次 provisioning；第二个并发请求直接被拒绝，
//! 避免两份不同的 DKIM 密钥竞争发布到同一个 selector 下。

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{CoreError, CoreResult};

/// Set of domains with a provisioning attempt in flight.
#[derive(Clone, Default)]
pub struct DomainLocks {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl DomainLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记域名为处理中；已被标记时返回 `ProvisioningInProgress`
    pub fn try_acquire(&self, domain: &str) -> CoreResult<DomainGuard> {
        if !self.set().insert(domain.to_string()) {
            log::warn!("Rejected concurrent provisioning of {domain}");
            return Err(CoreError::ProvisioningInProgress(domain.to_string()));
        }
        Ok(DomainGuard {
            in_flight: Arc::clone(&self.in_flight),
            domain: domain.to_string(),
        })
    }

    /// 域名当前是否处理中
    #[must_use]
    pub fn is_locked(&self, domain: &str) -> bool {
        self.set().contains(domain)
    }

    // 持锁期间不会 panic，中毒时直接取回内部数据
    fn set(&self) -> MutexGuard<'_, HashSet<String>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the in-flight marker on drop (success, error or cancellation).
#[must_use = "the domain is released as soon as the guard is dropped"]
pub struct DomainGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
    domain: String,
}

impl Drop for DomainGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.domain);
    }
}
