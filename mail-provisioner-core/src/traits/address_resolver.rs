//! Public address discovery abstract Trait

use async_trait::async_trait;

use crate::types::ServerAddress;

/// Address Resolver Trait
///
/// Finds the public IPv4 address of the mail host. Implementations must never
/// fail: any problem is reported as [`ServerAddress::Unavailable`].
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Discover the public address (bounded by the implementation's timeout).
    async fn discover(&self) -> ServerAddress;
}

/// Resolver returning a fixed answer (static configuration, tests).
#[derive(Debug, Clone, Copy)]
pub struct StaticAddressResolver(pub ServerAddress);

#[async_trait]
impl AddressResolver for StaticAddressResolver {
    async fn discover(&self) -> ServerAddress {
        self.0
    }
}
