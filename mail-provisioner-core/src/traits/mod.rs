//! Storage and environment abstraction trait definitions

mod address_resolver;
mod domain_repository;

pub use address_resolver::{AddressResolver, StaticAddressResolver};
pub use domain_repository::{DomainRepository, InMemoryDomainRepository};
