//! Application bootstrap for the mail domain provisioner.
//!
//! Provides `AppConfig` (TOML + environment), `AppState` (service container)
//! and `AppStateBuilder` (adapter injection).

pub mod config;

use std::sync::Arc;

use mail_provisioner_core::error::CoreResult;
use mail_provisioner_core::services::{
    DomainService, HttpAddressResolver, ProvisioningService, ServiceContext,
};
use mail_provisioner_core::traits::{
    AddressResolver, DomainRepository, InMemoryDomainRepository, StaticAddressResolver,
};
use mail_provisioner_core::types::{ServerAddress, DEFAULT_DKIM_SELECTOR};
use mail_provisioner_provider::{create_provider, ProviderGateway};

pub use config::{AppConfig, ConfigError};

/// Application state.
///
/// Holds the `ServiceContext` and the services built on it. Constructed once
/// at startup via `AppStateBuilder`.
pub struct AppState {
    /// Service context (gateway and adapters)
    pub ctx: Arc<ServiceContext>,
    /// Provisioning orchestrator
    pub provisioning_service: ProvisioningService,
    /// Domain persistence use cases
    pub domain_service: DomainService,
    /// Selector used when the caller does not name one
    pub default_selector: String,
}

impl AppState {
    /// Wire everything from configuration.
    ///
    /// No credentials means no gateway; the state is still usable and every
    /// provisioning request reports `configured: false`.
    pub fn from_config(config: &AppConfig) -> CoreResult<Self> {
        let mut builder = AppStateBuilder::new().default_selector(&config.dkim.default_selector);

        match config.credentials() {
            Some(credentials) => {
                let provider = credentials.provider_type();
                let gateway = create_provider(credentials, &config.gateway_options())?;
                log::info!("DNS provider configured: {provider}");
                builder = builder.gateway(gateway);
            }
            None => log::info!("No DNS provider configured"),
        }

        let resolver: Arc<dyn AddressResolver> = match config.discovery.static_address {
            Some(ip) => {
                log::info!("Using static server address {ip}");
                Arc::new(StaticAddressResolver(ServerAddress::Resolved(ip)))
            }
            None => Arc::new(HttpAddressResolver::new(
                config.discovery.endpoint.clone(),
                config.discovery_timeout(),
            )?),
        };

        builder.address_resolver(resolver).build()
    }

    /// `explicit`, or the configured default selector.
    #[must_use]
    pub fn selector<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.default_selector)
    }
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Optional
/// - `gateway`: defaults to none (unconfigured)
/// - `address_resolver`: defaults to `HttpAddressResolver` with default endpoint
/// - `domain_repository`: defaults to `InMemoryDomainRepository`
pub struct AppStateBuilder {
    gateway: Option<Arc<dyn ProviderGateway>>,
    address_resolver: Option<Arc<dyn AddressResolver>>,
    domain_repository: Option<Arc<dyn DomainRepository>>,
    default_selector: Option<String>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            gateway: None,
            address_resolver: None,
            domain_repository: None,
            default_selector: None,
        }
    }

    #[must_use]
    pub fn gateway(mut self, gateway: Arc<dyn ProviderGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    #[must_use]
    pub fn address_resolver(mut self, resolver: Arc<dyn AddressResolver>) -> Self {
        self.address_resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn domain_repository(mut self, repo: Arc<dyn DomainRepository>) -> Self {
        self.domain_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn default_selector(mut self, selector: impl Into<String>) -> Self {
        self.default_selector = Some(selector.into());
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::Validation` if the default discovery client cannot
    /// be created.
    pub fn build(self) -> CoreResult<AppState> {
        let address_resolver: Arc<dyn AddressResolver> = match self.address_resolver {
            Some(resolver) => resolver,
            None => Arc::new(HttpAddressResolver::with_defaults()?),
        };
        let domain_repository: Arc<dyn DomainRepository> = self
            .domain_repository
            .unwrap_or_else(|| Arc::new(InMemoryDomainRepository::new()));

        let ctx = Arc::new(ServiceContext::new(
            self.gateway,
            address_resolver,
            domain_repository,
        ));

        Ok(AppState {
            provisioning_service: ProvisioningService::new(Arc::clone(&ctx)),
            domain_service: DomainService::new(Arc::clone(&ctx)),
            ctx,
            default_selector: self
                .default_selector
                .unwrap_or_else(|| DEFAULT_DKIM_SELECTOR.to_string()),
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
