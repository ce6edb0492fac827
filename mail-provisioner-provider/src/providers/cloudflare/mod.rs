//! Cloudflare DNS gateway

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::error::Result;
use crate::providers::common::{create_http_client, resolve_base_url};
use crate::types::GatewayOptions;

pub(crate) use types::{CloudflareDnsRecord, CloudflareResponse, CloudflareZone};

pub(crate) const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";
/// Cloudflare Zones API 单页最大记录数
pub(crate) const MAX_PAGE_SIZE_ZONES: u32 = 50;
/// Cloudflare DNS Records API 单页最大记录数
pub(crate) const MAX_PAGE_SIZE_RECORDS: u32 = 100;

/// Cloudflare DNS gateway (bearer token, per-record upsert)
pub struct CloudflareProvider {
    pub(crate) client: Client,
    pub(crate) api_token: String,
    pub(crate) base_url: String,
}

impl CloudflareProvider {
    /// Build a gateway for an API token (needs `Zone:DNS:Edit` and `Zone:Read`).
    ///
    /// # Errors
    ///
    /// Fails only when the HTTP client cannot be constructed.
    pub fn new(api_token: String, options: &GatewayOptions) -> Result<Self> {
        Ok(Self {
            client: create_http_client(options, "cloudflare")?,
            api_token,
            base_url: resolve_base_url(options, CF_API_BASE),
        })
    }
}
