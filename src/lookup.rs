//! Public entry point: domain or URL in, resolved address and location out.
//!
//! Pipeline: normalize → format check → DNS → provider chain. Every stage
//! fails fast; a [`DomainRecord`] only exists once all of them succeeded.

use crate::config::{ConfigError, Settings};
use crate::domain::{self, HostResolver, ResolveFailure, SystemResolver};
use crate::location::{GeoLocator, LocationRecord};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

/// A fully resolved lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainRecord {
    pub original_input: String,
    pub normalized_domain: String,
    pub resolved_address: String,
    pub location: LocationRecord,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid domain format: '{0}'")]
    InvalidFormat(String),
    #[error("cannot resolve domain '{0}'")]
    UnresolvableDomain(String),
    #[error("unable to resolve IP for '{domain}': {reason}")]
    AddressResolutionFailed { domain: String, reason: String },
    #[error("unable to fetch location for {0}: no provider returned data")]
    LocationUnavailable(String),
}

/// Failure to build a [`DomainValidator`].
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("DNS resolver unavailable: {0}")]
    Resolver(#[from] std::io::Error),
}

/// Resolver plus provider chain. Stateless between calls.
pub struct DomainValidator {
    resolver: Box<dyn HostResolver>,
    locator: GeoLocator,
}

impl DomainValidator {
    pub fn new(resolver: Box<dyn HostResolver>, locator: GeoLocator) -> Self {
        Self { resolver, locator }
    }

    /// Validate `settings` and wire the system resolver to its provider chain.
    pub fn from_settings(settings: &Settings) -> Result<Self, SetupError> {
        settings.validate()?;
        let resolver = SystemResolver::new()?;
        Ok(Self::new(Box::new(resolver), GeoLocator::from_settings(settings)))
    }

    /// Blocks on DNS and HTTP. From async code, run it in
    /// `tokio::task::spawn_blocking`.
    #[instrument(skip(self), fields(providers = self.locator.len()))]
    pub fn validate_domain(&self, input: &str) -> Result<DomainRecord, DomainError> {
        let normalized = domain::normalize(input);
        if !domain::is_valid_domain_format(&normalized) {
            return Err(DomainError::InvalidFormat(normalized));
        }

        let address = domain::resolve(self.resolver.as_ref(), &normalized).map_err(|e| match e {
            ResolveFailure::NotFound(d) => DomainError::UnresolvableDomain(d),
            ResolveFailure::Transport { domain, reason } => {
                DomainError::AddressResolutionFailed { domain, reason }
            }
        })?;
        debug!(domain = %normalized, %address, "resolved");

        let location = self
            .locator
            .get_location(&address)
            .map_err(|_| DomainError::LocationUnavailable(address.clone()))?;

        Ok(DomainRecord {
            original_input: input.to_string(),
            normalized_domain: normalized,
            resolved_address: address,
            location,
        })
    }
}

/// One-shot lookup with default settings and the system resolver.
///
/// Blocking. Every call builds a fresh system resolver, which starts its own
/// tokio runtime, so calling this on an async worker panics. From async code
/// use `tokio::task::spawn_blocking`, or share a [`DomainValidator`].
pub fn validate_domain(input: &str) -> Result<DomainRecord, DomainError> {
    let normalized = domain::normalize(input);
    if !domain::is_valid_domain_format(&normalized) {
        return Err(DomainError::InvalidFormat(normalized));
    }

    let validator = DomainValidator::from_settings(&Settings::default()).map_err(|e| {
        DomainError::AddressResolutionFailed {
            domain: normalized,
            reason: e.to_string(),
        }
    })?;
    validator.validate_domain(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::locator::tests::MockProvider;
    use crate::location::ProviderKind;
    use std::collections::HashMap;
    use std::net::IpAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// In-memory DNS; unknown names are NXDOMAIN, names under `.fail` time out.
    struct StubDns {
        zone: HashMap<&'static str, Vec<IpAddr>>,
        queries: Arc<AtomicUsize>,
    }

    impl StubDns {
        fn new() -> (Self, Arc<AtomicUsize>) {
            let mut zone = HashMap::new();
            zone.insert("example.com", vec!["93.184.216.34".parse().unwrap(), "2606:2800:220:1::".parse().unwrap()]);
            zone.insert("empty.org", vec![]);
            let queries = Arc::new(AtomicUsize::new(0));
            (Self { zone, queries: queries.clone() }, queries)
        }
    }

    impl HostResolver for StubDns {
        fn lookup(&self, domain: &str) -> Result<Vec<IpAddr>, ResolveFailure> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            if domain.ends_with(".fail") {
                return Err(ResolveFailure::Transport {
                    domain: domain.to_string(),
                    reason: "request timed out".into(),
                });
            }
            self.zone
                .get(domain)
                .cloned()
                .ok_or_else(|| ResolveFailure::NotFound(domain.to_string()))
        }
    }

    fn paris_chain() -> (GeoLocator, Vec<Arc<AtomicUsize>>) {
        let (a, a_calls) = MockProvider::ok(ProviderKind::IpApi, "", "");
        let (b, b_calls) = MockProvider::failing(ProviderKind::IpInfo);
        let (c, c_calls) = MockProvider::ok(ProviderKind::FreeGeoIp, "Paris", "France");
        let locator = GeoLocator::new(vec![Box::new(a), Box::new(b), Box::new(c)]);
        (locator, vec![a_calls, b_calls, c_calls])
    }

    #[test]
    fn test_full_lookup() {
        let (dns, _) = StubDns::new();
        let (locator, calls) = paris_chain();
        let validator = DomainValidator::new(Box::new(dns), locator);

        let record = validator.validate_domain("https://www.example.com/path").unwrap();
        assert_eq!(record.original_input, "https://www.example.com/path");
        assert_eq!(record.normalized_domain, "example.com");
        assert_eq!(record.resolved_address, "93.184.216.34");
        assert_eq!(record.location.city, "Paris");
        assert_eq!(record.location.country, "France");
        assert!(calls.iter().all(|c| c.load(Ordering::SeqCst) == 1));
    }

    #[test]
    fn test_invalid_format_skips_network() {
        let (dns, queries) = StubDns::new();
        let (locator, calls) = paris_chain();
        let validator = DomainValidator::new(Box::new(dns), locator);

        for input in ["not a domain", "-bad.com", "", "https://"] {
            assert!(matches!(
                validator.validate_domain(input),
                Err(DomainError::InvalidFormat(_))
            ));
        }
        assert_eq!(queries.load(Ordering::SeqCst), 0);
        assert!(calls.iter().all(|c| c.load(Ordering::SeqCst) == 0));
    }

    #[test]
    fn test_unresolvable_domain() {
        let (dns, _) = StubDns::new();
        let (locator, calls) = paris_chain();
        let validator = DomainValidator::new(Box::new(dns), locator);

        assert_eq!(
            validator.validate_domain("missing.example.net"),
            Err(DomainError::UnresolvableDomain("missing.example.net".into()))
        );
        assert_eq!(
            validator.validate_domain("empty.org"),
            Err(DomainError::UnresolvableDomain("empty.org".into()))
        );
        assert!(calls.iter().all(|c| c.load(Ordering::SeqCst) == 0));
    }

    #[test]
    fn test_dns_transport_failure() {
        let (dns, _) = StubDns::new();
        let (locator, _) = paris_chain();
        let validator = DomainValidator::new(Box::new(dns), locator);

        match validator.validate_domain("slow.example.fail") {
            Err(DomainError::AddressResolutionFailed { domain, reason }) => {
                assert_eq!(domain, "slow.example.fail");
                assert!(reason.contains("timed out"));
            }
            other => panic!("expected AddressResolutionFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_location_unavailable() {
        let (dns, _) = StubDns::new();
        let (a, a_calls) = MockProvider::failing(ProviderKind::IpApi);
        let (b, b_calls) = MockProvider::ok(ProviderKind::IpInfo, "", "");
        let (c, c_calls) = MockProvider::failing(ProviderKind::FreeGeoIp);
        let locator = GeoLocator::new(vec![Box::new(a), Box::new(b), Box::new(c)]);
        let validator = DomainValidator::new(Box::new(dns), locator);

        assert_eq!(
            validator.validate_domain("example.com"),
            Err(DomainError::LocationUnavailable("93.184.216.34".into()))
        );
        for calls in [a_calls, b_calls, c_calls] {
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_free_fn_rejects_bad_format() {
        assert_eq!(
            validate_domain("not a domain"),
            Err(DomainError::InvalidFormat("not a domain".into()))
        );
    }

    #[tokio::test]
    async fn test_free_fn_from_blocking_task() {
        // `.invalid` is reserved; the resolver answers it without the network.
        let result = tokio::task::spawn_blocking(|| validate_domain("nothing.invalid"))
            .await
            .unwrap();
        assert_eq!(result, Err(DomainError::UnresolvableDomain("nothing.invalid".into())));
    }

    #[test]
    fn test_record_serializes() {
        let (dns, _) = StubDns::new();
        let (locator, _) = paris_chain();
        let validator = DomainValidator::new(Box::new(dns), locator);
        let record = validator.validate_domain("example.com").unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["normalized_domain"], "example.com");
        assert_eq!(json["location"]["source"], "freegeoip");
    }
}
