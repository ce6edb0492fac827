//! Provisioning orchestration
//!
//! Ties credential validation, record planning and the provider push together
//! for one domain at a time.

use std::sync::Arc;

use crate::error::CoreResult;
use crate::services::{normalize_domain, ServiceContext};
use crate::types::{
    DnsFields, MailDomainAuthPlan, PlanOptions, ProviderStatus, ProvisioningResult,
    ProvisioningState,
};

/// Provisioning orchestrator
pub struct ProvisioningService {
    ctx: Arc<ServiceContext>,
}

impl ProvisioningService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Whether a provider is configured, whether its credentials work, and
    /// which domains it can see.
    ///
    /// A missing gateway is `configured: false` without any network call.
    /// Transport failures while validating are returned as errors; a failing
    /// domain listing after successful validation only leaves `domains` empty.
    pub async fn check_provider_configured(&self) -> CoreResult<ProviderStatus> {
        let Some(gateway) = self.ctx.gateway() else {
            return Ok(ProviderStatus::unconfigured());
        };

        if !gateway.validate_credentials().await? {
            log::warn!("[{}] credentials rejected", gateway.id());
            return Ok(ProviderStatus::checked(gateway.id(), false, None));
        }

        let domains = match gateway.list_domains().await {
            Ok(domains) => Some(domains),
            Err(e) => {
                log::warn!("[{}] failed to list domains: {e}", gateway.id());
                None
            }
        };

        Ok(ProviderStatus::checked(gateway.id(), true, domains))
    }

    /// Plan the records for `domain` without touching the provider.
    pub async fn generate_auth_material(
        &self,
        domain: &str,
        selector: Option<&str>,
    ) -> CoreResult<MailDomainAuthPlan> {
        self.ctx.planner().plan(domain, selector).await
    }

    /// Validate credentials, plan, and push the record set for `domain`.
    ///
    /// Persisted `existing` values are preferred; the DKIM key is only
    /// regenerated when none is persisted or `options.rotate_dkim` is set.
    /// The returned `dns_fields` must be persisted by the caller even when
    /// the push failed, so a retry reuses the same key.
    pub async fn provision_domain(
        &self,
        domain: &str,
        existing: &DnsFields,
        options: PlanOptions,
    ) -> CoreResult<ProvisioningResult> {
        let Some(gateway) = self.ctx.gateway() else {
            transition(domain, ProvisioningState::Unconfigured);
            return Ok(ProvisioningResult::unconfigured());
        };

        let domain = normalize_domain(domain)?;
        let _guard = self.ctx.domain_locks.try_acquire(&domain)?;

        transition(&domain, ProvisioningState::CredentialCheck);
        if !gateway.validate_credentials().await? {
            transition(&domain, ProvisioningState::Invalid);
            return Ok(ProvisioningResult::invalid_credentials(gateway.id()));
        }
        transition(&domain, ProvisioningState::Valid);

        transition(&domain, ProvisioningState::Planning);
        let plan = match self
            .ctx
            .planner()
            .plan_with(&domain, None, existing, options)
            .await
        {
            Ok(plan) => plan,
            Err(e) => {
                transition(&domain, ProvisioningState::PlanFailed);
                return Err(e);
            }
        };
        transition(&domain, ProvisioningState::Planned);

        transition(&domain, ProvisioningState::Pushing);
        let reconciliation = match gateway.upsert_records(&domain, &plan.records).await {
            Ok(reconciliation) => reconciliation,
            Err(e) => {
                transition(&domain, ProvisioningState::Failed);
                return Err(e.into());
            }
        };
        transition(
            &domain,
            if reconciliation.success {
                ProvisioningState::Applied
            } else {
                ProvisioningState::Failed
            },
        );

        let dns_fields = DnsFields::from_plan(&plan).or(existing);
        Ok(ProvisioningResult::pushed(reconciliation, dns_fields))
    }
}

fn transition(domain: &str, state: ProvisioningState) {
    match state {
        ProvisioningState::Applied => log::info!("[provision] {domain}: {state}"),
        ProvisioningState::Invalid
        | ProvisioningState::PlanFailed
        | ProvisioningState::Failed => log::warn!("[provision] {domain}: {state}"),
        _ => log::debug!("[provision] {domain}: {state}"),
    }
}
