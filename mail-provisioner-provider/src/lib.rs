//! # mail-provisioner-provider
//!
//! DNS provider gateways for publishing the records that authenticate a mail
//! domain (MX, A, SPF, DKIM, DMARC).
//!
//! ## Supported Providers
//!
//! | Provider | Feature Flag | Auth Method | Record push |
//! |----------|-------------|-------------|-------------|
//! | [GoDaddy](https://developer.godaddy.com/) | `godaddy` | `sso-key` key/secret | per type + name `PUT` |
//! | [Cloudflare](https://www.cloudflare.com/) | `cloudflare` | Bearer Token | sequential per-record upsert |
//!
//! ## Feature Flags
//!
//! - **`all-providers`** *(default)*: enable every provider listed above.
//! - **`godaddy`** / **`cloudflare`**: enable a single provider.
//! - **`native-tls`** *(default)* or **`rustls`**: TLS backend for `reqwest`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mail_provisioner_provider::{
//!     create_provider, DnsRecordSpec, GatewayOptions, ProviderCredentials,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = create_provider(
//!         ProviderCredentials::Cloudflare {
//!             api_token: "your-token".to_string(),
//!         },
//!         &GatewayOptions::default(),
//!     )?;
//!
//!     if !gateway.validate_credentials().await? {
//!         eprintln!("credentials rejected");
//!         return Ok(());
//!     }
//!
//!     let records = vec![
//!         DnsRecordSpec::mx("@", "mail.example.com", 10),
//!         DnsRecordSpec::txt("_dmarc", "v=DMARC1; p=quarantine"),
//!     ];
//!     let result = gateway.upsert_records("example.com", &records).await?;
//!     println!("{}: {:?}", result.message, result.applied);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Result<T, ProviderError>`](ProviderError).
//! `validate_credentials` answers `Ok(false)` for rejected credentials and
//! reserves `Err` for transport failures ([`ProviderError::NetworkError`],
//! [`ProviderError::Timeout`]). Record pushes report provider rejections inside
//! [`ReconciliationResult`] instead of failing the call.
//!
//! Nothing is retried automatically: HTTP 429 surfaces as
//! [`ProviderError::RateLimited`] and 502-504 as [`ProviderError::NetworkError`].

mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export factory functions
pub use factory::{create_provider, get_all_provider_metadata};

// Re-export the gateway trait only (internal traits are not exported)
pub use traits::ProviderGateway;

// Re-export types
pub use types::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, DEFAULT_TTL,
    DnsRecordSpec, DnsRecordType, FieldType, GatewayOptions, ProviderCredentialField,
    ProviderCredentials, ProviderFeatures, ProviderMetadata, ProviderType, ReconciliationResult,
};

// Re-export concrete providers (behind feature flags)
#[cfg(feature = "cloudflare")]
pub use providers::CloudflareProvider;
#[cfg(feature = "godaddy")]
pub use providers::GodaddyProvider;
