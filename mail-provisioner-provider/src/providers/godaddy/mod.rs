//! GoDaddy Domains API gateway

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::error::Result;
use crate::providers::common::{create_http_client, resolve_base_url};
use crate::types::GatewayOptions;

pub(crate) const GODADDY_API_BASE: &str = "https://api.godaddy.com";
/// `GET /v1/domains` 单次返回上限
pub(crate) const MAX_PAGE_SIZE_DOMAINS: u32 = 1000;

/// GoDaddy DNS gateway (`sso-key` auth, per type + name record-set replacement)
pub struct GodaddyProvider {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    pub(crate) api_secret: String,
    pub(crate) base_url: String,
}

impl GodaddyProvider {
    /// Build a gateway for an API key pair.
    ///
    /// Point `options.base_url` at `https://api.ote-godaddy.com` for the OTE sandbox.
    ///
    /// # Errors
    ///
    /// Fails only when the HTTP client cannot be constructed.
    pub fn new(api_key: String, api_secret: String, options: &GatewayOptions) -> Result<Self> {
        Ok(Self {
            client: create_http_client(options, "godaddy")?,
            api_key,
            api_secret,
            base_url: resolve_base_url(options, GODADDY_API_BASE),
        })
    }

    /// `Authorization` 头的值
    pub(crate) fn auth_header(&self) -> String {
        format!("sso-key {}:{}", self.api_key, self.api_secret)
    }
}
