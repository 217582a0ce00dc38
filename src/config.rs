//! Runtime settings for the lookup pipeline.
//!
//! Defaults reproduce the stock provider chain; the binary overrides fields
//! from command-line flags.

use crate::location::ProviderKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least one provider must be configured")]
    NoProviders,
    #[error("provider '{0}' is listed more than once")]
    DuplicateProvider(ProviderKind),
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    #[error("invalid endpoint for {provider}: {reason}")]
    InvalidEndpoint { provider: ProviderKind, reason: String },
}

/// Per-provider URL template overrides. `{ip}` marks the address slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointOverrides {
    #[serde(default)]
    pub ipapi: Option<String>,
    #[serde(default)]
    pub ipinfo: Option<String>,
    #[serde(default)]
    pub freegeoip: Option<String>,
}

impl EndpointOverrides {
    pub fn template_for(&self, kind: ProviderKind) -> &str {
        let custom = match kind {
            ProviderKind::IpApi => self.ipapi.as_deref(),
            ProviderKind::IpInfo => self.ipinfo.as_deref(),
            ProviderKind::FreeGeoIp => self.freegeoip.as_deref(),
        };
        custom.unwrap_or_else(|| kind.default_endpoint())
    }

    pub fn set(&mut self, kind: ProviderKind, template: impl Into<String>) {
        let slot = match kind {
            ProviderKind::IpApi => &mut self.ipapi,
            ProviderKind::IpInfo => &mut self.ipinfo,
            ProviderKind::FreeGeoIp => &mut self.freegeoip,
        };
        *slot = Some(template.into());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Provider priority order. Earlier entries are preferred.
    pub providers: Vec<ProviderKind>,
    /// Per-request transport timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
    #[serde(default)]
    pub endpoints: EndpointOverrides,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            providers: ProviderKind::DEFAULT_ORDER.to_vec(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("domain_geo/{}", env!("CARGO_PKG_VERSION")),
            endpoints: EndpointOverrides::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.providers.is_empty() {
            return Err(ConfigError::NoProviders);
        }

        let mut seen = HashSet::new();
        for &kind in &self.providers {
            if !seen.insert(kind) {
                return Err(ConfigError::DuplicateProvider(kind));
            }
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        for &kind in &self.providers {
            validate_template(kind, self.endpoints.template_for(kind))?;
        }

        Ok(())
    }
}

fn validate_template(provider: ProviderKind, template: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEndpoint { provider, reason };

    if !template.contains("{ip}") {
        return Err(invalid(format!("'{}' has no {{ip}} placeholder", template)));
    }

    // Substitute a sample address so the template parses as a URL.
    let sample = template.replace("{ip}", "192.0.2.1");
    let url = Url::parse(&sample).map_err(|e| invalid(format!("'{}': {}", template, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(format!("unsupported scheme '{}'", scheme))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.providers, ProviderKind::DEFAULT_ORDER.to_vec());
        assert!(settings.user_agent.starts_with("domain_geo/"));
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn test_empty_providers() {
        let settings = Settings { providers: vec![], ..Settings::default() };
        assert_eq!(settings.validate(), Err(ConfigError::NoProviders));
    }

    #[test]
    fn test_duplicate_provider() {
        let settings = Settings {
            providers: vec![ProviderKind::IpInfo, ProviderKind::IpApi, ProviderKind::IpInfo],
            ..Settings::default()
        };
        assert_eq!(settings.validate(), Err(ConfigError::DuplicateProvider(ProviderKind::IpInfo)));
    }

    #[test]
    fn test_zero_timeout() {
        let settings = Settings { timeout_secs: 0, ..Settings::default() };
        assert_eq!(settings.validate(), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn test_endpoint_override() {
        let mut settings = Settings::default();
        settings.endpoints.set(ProviderKind::IpInfo, "http://127.0.0.1:8080/{ip}/json");
        assert_eq!(
            settings.endpoints.template_for(ProviderKind::IpInfo),
            "http://127.0.0.1:8080/{ip}/json"
        );
        assert_eq!(
            settings.endpoints.template_for(ProviderKind::IpApi),
            ProviderKind::IpApi.default_endpoint()
        );
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn test_endpoint_without_placeholder() {
        let mut settings = Settings::default();
        settings.endpoints.set(ProviderKind::IpApi, "https://ipapi.co/json/");
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidEndpoint { provider: ProviderKind::IpApi, .. })
        ));
    }

    #[test]
    fn test_endpoint_bad_scheme() {
        let mut settings = Settings::default();
        settings.endpoints.set(ProviderKind::FreeGeoIp, "ftp://example.com/{ip}");
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_unused_override_is_ignored() {
        let mut settings = Settings { providers: vec![ProviderKind::IpApi], ..Settings::default() };
        settings.endpoints.set(ProviderKind::IpInfo, "not a url");
        assert_eq!(settings.validate(), Ok(()));
    }
}
