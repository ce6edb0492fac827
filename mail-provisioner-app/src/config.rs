//! Application configuration
//!
//! TOML file (all sections optional) plus environment overrides. Missing
//! provider credentials are not an error: the app then runs unconfigured.

use std::fmt;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mail_provisioner_core::services::{DEFAULT_DISCOVERY_ENDPOINT, DEFAULT_DISCOVERY_TIMEOUT};
use mail_provisioner_core::types::DEFAULT_DKIM_SELECTOR;
use mail_provisioner_provider::{GatewayOptions, ProviderCredentials, ProviderType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provider kind (`godaddy` / `cloudflare`).
pub const ENV_PROVIDER: &str = "MAIL_PROVISIONER_PROVIDER";
/// API base URL override (test servers, sandboxes).
pub const ENV_PROVIDER_URL: &str = "MAIL_PROVISIONER_PROVIDER_URL";
pub const ENV_GODADDY_API_KEY: &str = "GODADDY_API_KEY";
pub const ENV_GODADDY_API_SECRET: &str = "GODADDY_API_SECRET";
pub const ENV_CLOUDFLARE_API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";

const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Configuration loading error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub discovery: DiscoveryConfig,
    pub dkim: DkimConfig,
}

/// `[provider]` section.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Explicit provider; inferred from the credentials present when unset.
    pub kind: Option<ProviderType>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub api_token: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: None,
            api_key: None,
            api_secret: None,
            api_token: None,
            base_url: None,
            timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
        }
    }
}

/// Redacts every credential field.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(value: Option<&String>) -> &'static str {
            if value.is_some() {
                "***"
            } else {
                "<unset>"
            }
        }
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &mask(self.api_key.as_ref()))
            .field("api_secret", &mask(self.api_secret.as_ref()))
            .field("api_token", &mask(self.api_token.as_ref()))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// `[discovery]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Plain-text "what is my IP" endpoint.
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Skip discovery and always use this address.
    pub static_address: Option<Ipv4Addr>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_DISCOVERY_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_DISCOVERY_TIMEOUT.as_secs(),
            static_address: None,
        }
    }
}

/// `[dkim]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DkimConfig {
    pub default_selector: String,
}

impl Default for DkimConfig {
    fn default() -> Self {
        Self {
            default_selector: DEFAULT_DKIM_SELECTOR.to_string(),
        }
    }
}

impl AppConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// File (if given) plus process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(kind) = get(ENV_PROVIDER) {
            let kind = kind.parse::<ProviderType>().map_err(ConfigError::Invalid)?;
            self.provider.kind = Some(kind);
        }
        if let Some(url) = get(ENV_PROVIDER_URL) {
            self.provider.base_url = Some(url);
        }
        if let Some(key) = get(ENV_GODADDY_API_KEY) {
            self.provider.api_key = Some(key);
        }
        if let Some(secret) = get(ENV_GODADDY_API_SECRET) {
            self.provider.api_secret = Some(secret);
        }
        if let Some(token) = get(ENV_CLOUDFLARE_API_TOKEN) {
            self.provider.api_token = Some(token);
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "provider.timeout_secs must be positive".to_string(),
            ));
        }
        if self.discovery.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "discovery.timeout_secs must be positive".to_string(),
            ));
        }
        if self.dkim.default_selector.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "dkim.default_selector must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Provider credentials, or `None` when the provider is not configured.
    ///
    /// Without an explicit `kind`, a Cloudflare token wins over a GoDaddy key
    /// pair.
    #[must_use]
    pub fn credentials(&self) -> Option<ProviderCredentials> {
        let p = &self.provider;
        let godaddy = || match (present(p.api_key.as_ref()), present(p.api_secret.as_ref())) {
            (Some(api_key), Some(api_secret)) => Some(ProviderCredentials::Godaddy {
                api_key: api_key.to_string(),
                api_secret: api_secret.to_string(),
            }),
            _ => None,
        };
        let cloudflare = || {
            present(p.api_token.as_ref()).map(|token| ProviderCredentials::Cloudflare {
                api_token: token.to_string(),
            })
        };

        let credentials = match p.kind {
            Some(ProviderType::Godaddy) => godaddy(),
            Some(ProviderType::Cloudflare) => cloudflare(),
            None => cloudflare().or_else(godaddy),
        };
        if credentials.is_none() {
            if let Some(kind) = p.kind {
                log::warn!("Provider {kind} selected but its credentials are incomplete");
            }
        }
        credentials
    }

    /// HTTP options for the provider gateway.
    #[must_use]
    pub fn gateway_options(&self) -> GatewayOptions {
        let options =
            GatewayOptions::default().with_timeout(Duration::from_secs(self.provider.timeout_secs));
        match present(self.provider.base_url.as_ref()) {
            Some(url) => options.with_base_url(url),
            None => options,
        }
    }

    #[must_use]
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery.timeout_secs)
    }
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}
