//! domain_geo — resolve a domain or URL to an IP address and locate it.
//!
//! Geolocation comes from third-party providers tried in a fixed priority
//! order; the first one that returns a city or country wins.

pub mod config;
pub mod domain;
pub mod location;
pub mod logging;
pub mod lookup;
pub mod server;

pub use config::Settings;
pub use location::{GeoLocator, LocationProvider, LocationRecord, ProviderKind};
pub use lookup::{validate_domain, DomainError, DomainRecord, DomainValidator};
