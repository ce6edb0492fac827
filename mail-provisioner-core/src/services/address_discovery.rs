//! 公网地址探测

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{CoreError, CoreResult};
use crate::traits::AddressResolver;
use crate::types::{ServerAddress, LOCALHOST_SENTINEL};

/// Default plain-text "what is my IP" endpoint.
pub const DEFAULT_DISCOVERY_ENDPOINT: &str = "https://api.ipify.org";
/// Hard deadline of a discovery lookup.
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Discovers the public IPv4 address by asking an HTTP lookup service.
///
/// The endpoint must answer `200` with the bare address as body. Network
/// errors, timeouts, non-2xx answers and non-IPv4 bodies all degrade to
/// [`ServerAddress::Unavailable`].
pub struct HttpAddressResolver {
    client: Client,
    endpoint: String,
}

impl HttpAddressResolver {
    /// Resolver for `endpoint` with a hard per-lookup `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> CoreResult<Self> {
        let endpoint = endpoint.into();
        reqwest::Url::parse(&endpoint).map_err(|e| {
            CoreError::Validation(format!("invalid discovery endpoint '{endpoint}': {e}"))
        })?;

        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Validation(format!("failed to build discovery client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// Resolver for the default endpoint and timeout.
    pub fn with_defaults() -> CoreResult<Self> {
        Self::new(DEFAULT_DISCOVERY_ENDPOINT, DEFAULT_DISCOVERY_TIMEOUT)
    }

    async fn lookup(&self) -> Result<Ipv4Addr, String> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    "timed out".to_string()
                } else {
                    e.to_string()
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status.as_u16()));
        }

        let body = response.text().await.map_err(|e| e.to_string())?;
        let body = body.trim();
        body.parse::<Ipv4Addr>()
            .map_err(|_| format!("not an IPv4 address: {:.64}", body))
    }
}

#[async_trait]
impl AddressResolver for HttpAddressResolver {
    async fn discover(&self) -> ServerAddress {
        match self.lookup().await {
            Ok(ip) => {
                log::info!("Discovered public address {ip}");
                ServerAddress::Resolved(ip)
            }
            Err(reason) => {
                log::warn!(
                    "Public address discovery via {} failed ({reason}); using {LOCALHOST_SENTINEL}",
                    self.endpoint
                );
                ServerAddress::Unavailable
            }
        }
    }
}
