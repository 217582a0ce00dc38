//! Geo locator — walks the provider chain in priority order.
//!
//! Flow:  provider[0] → provider[1] → … → AllProvidersFailed
//!
//! The first provider that yields a record with a city or a country wins;
//! later providers are not contacted.

use super::providers::{build_provider, http_agent, LocationProvider};
use super::types::{AllProvidersFailed, LocationRecord};
use crate::config::Settings;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The ordered provider chain.
pub struct GeoLocator {
    providers: Vec<Box<dyn LocationProvider>>,
}

impl GeoLocator {
    /// Create a locator from an explicit, ordered provider list.
    pub fn new(providers: Vec<Box<dyn LocationProvider>>) -> Self {
        Self { providers }
    }

    /// Build the chain described by `settings`, sharing one HTTP agent.
    pub fn from_settings(settings: &Settings) -> Self {
        let agent = http_agent(Duration::from_secs(settings.timeout_secs), &settings.user_agent);
        let providers = settings
            .providers
            .iter()
            .map(|&kind| build_provider(kind, settings.endpoints.template_for(kind), agent.clone()))
            .collect();
        Self { providers }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Look up `ip`, trying each provider once in order.
    pub fn get_location(&self, ip: &str) -> Result<LocationRecord, AllProvidersFailed> {
        for (attempt, provider) in self.providers.iter().enumerate() {
            let kind = provider.kind();
            debug!(provider = %kind, attempt, ip, "querying provider");

            match provider.fetch_location(ip) {
                Ok(loc) if loc.has_location_data() => {
                    info!(provider = %kind, ip, city = %loc.city, country = %loc.country, "location found");
                    return Ok(loc);
                }
                Ok(_) => warn!(provider = %kind, ip, "provider returned no location data"),
                Err(e) => warn!(provider = %kind, ip, error = %e, "provider failed"),
            }
        }

        warn!(ip, tried = self.providers.len(), "all providers failed");
        Err(AllProvidersFailed)
    }
}
