//! Location subsystem for domain_geo.
//!
//! Provider adapters for IP geolocation services and the locator that
//! chains them in priority order.

pub mod locator;
pub mod providers;
pub mod types;

pub use locator::GeoLocator;
pub use providers::LocationProvider;
pub use types::{AllProvidersFailed, LocationRecord, ProviderError, ProviderKind};
