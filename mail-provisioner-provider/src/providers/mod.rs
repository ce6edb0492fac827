//! DNS provider gateway implementations

/// Shared utilities used by provider implementations.
pub mod common;

#[cfg(feature = "cloudflare")]
mod cloudflare;
#[cfg(feature = "godaddy")]
mod godaddy;

#[cfg(feature = "cloudflare")]
pub use cloudflare::CloudflareProvider;
#[cfg(feature = "godaddy")]
pub use godaddy::GodaddyProvider;
