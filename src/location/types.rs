//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which provider produced a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    IpApi,
    IpInfo,
    FreeGeoIp,
}

impl ProviderKind {
    /// Default priority order. Earlier entries are preferred.
    pub const DEFAULT_ORDER: [ProviderKind; 3] =
        [ProviderKind::IpApi, ProviderKind::IpInfo, ProviderKind::FreeGeoIp];

    /// URL template used when no override is configured. `{ip}` is replaced
    /// with the address being looked up.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            Self::IpApi => "https://ipapi.co/{ip}/json/",
            Self::IpInfo => "https://ipinfo.io/{ip}/json",
            Self::FreeGeoIp => "https://freegeoip.app/json/{ip}",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IpApi => write!(f, "ipapi.co"),
            Self::IpInfo => write!(f, "ipinfo.io"),
            Self::FreeGeoIp => write!(f, "freegeoip.app"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ipapi" | "ipapi.co" => Ok(Self::IpApi),
            "ipinfo" | "ipinfo.io" => Ok(Self::IpInfo),
            "freegeoip" | "freegeoip.app" => Ok(Self::FreeGeoIp),
            _ => Err(format!(
                "Unknown provider '{}'. Use 'ipapi', 'ipinfo' or 'freegeoip'.",
                s
            )),
        }
    }
}

/// Canonical, provider-agnostic location.
///
/// Coordinates are `None` when the provider omitted them, so a genuine
/// position at (0, 0) is not confused with missing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub city: String,
    pub region: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub source: ProviderKind,
}

impl LocationRecord {
    /// A record is usable only if it names a city or a country.
    pub fn has_location_data(&self) -> bool {
        !self.city.is_empty() || !self.country.is_empty()
    }

    pub fn display_line(&self) -> String {
        let place = [&self.city, &self.region, &self.country]
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => format!("{} ({:.4}, {:.4}) via {}", place, lat, lon, self.source),
            _ => format!("{} via {}", place, self.source),
        }
    }
}

/// Why a single provider did not produce data.
///
/// These never leave the orchestrator; they are logged and discarded.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("rate limited")]
    RateLimited,
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("no location data")]
    NoLocationData,
}

/// Every configured provider failed for one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("could not fetch location from any provider")]
pub struct AllProvidersFailed;
