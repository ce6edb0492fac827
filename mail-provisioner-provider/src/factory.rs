//! Provider factory functions and metadata.

use std::sync::Arc;

use crate::error::Result;
use crate::traits::ProviderGateway;
use crate::types::{GatewayOptions, ProviderCredentials, ProviderMetadata};

#[cfg(feature = "cloudflare")]
use crate::providers::CloudflareProvider;
#[cfg(feature = "godaddy")]
use crate::providers::GodaddyProvider;

/// Creates a [`ProviderGateway`] from the given credentials.
///
/// The concrete gateway is determined by the [`ProviderCredentials`] variant.
/// The result is wrapped in `Arc<dyn ProviderGateway>` so it can be built once
/// at startup and injected wherever provisioning runs.
///
/// # Examples
///
/// ```rust,no_run
/// use mail_provisioner_provider::{create_provider, GatewayOptions, ProviderCredentials};
///
/// let gateway = create_provider(
///     ProviderCredentials::Godaddy {
///         api_key: "key".to_string(),
///         api_secret: "secret".to_string(),
///     },
///     &GatewayOptions::default(),
/// )
/// .unwrap();
/// ```
///
/// # Errors
///
/// Fails when the underlying HTTP client cannot be built.
pub fn create_provider(
    credentials: ProviderCredentials,
    options: &GatewayOptions,
) -> Result<Arc<dyn ProviderGateway>> {
    log::debug!(
        "creating {} gateway (timeout {:?})",
        credentials.provider_type(),
        options.request_timeout
    );

    match credentials {
        #[cfg(feature = "godaddy")]
        ProviderCredentials::Godaddy {
            api_key,
            api_secret,
        } => Ok(Arc::new(GodaddyProvider::new(api_key, api_secret, options)?)),
        #[cfg(feature = "cloudflare")]
        ProviderCredentials::Cloudflare { api_token } => {
            Ok(Arc::new(CloudflareProvider::new(api_token, options)?))
        }
    }
}

/// Returns metadata for all providers enabled via feature flags.
pub fn get_all_provider_metadata() -> Vec<ProviderMetadata> {
    vec![
        #[cfg(feature = "godaddy")]
        GodaddyProvider::metadata(),
        #[cfg(feature = "cloudflare")]
        CloudflareProvider::metadata(),
    ]
}
