//! Geolocation providers: ipapi.co, ipinfo.io and freegeoip.app.
//!
//! Each adapter issues one blocking GET and maps the provider's own JSON
//! schema onto [`LocationRecord`]. Transport and schema failures are both
//! reported as [`ProviderError`].

use super::types::{LocationRecord, ProviderError, ProviderKind};
use serde::Deserialize;
use std::time::Duration;

/// Common capability of every provider adapter.
pub trait LocationProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn fetch_location(&self, ip: &str) -> Result<LocationRecord, ProviderError>;
}

/// Build the blocking HTTP agent shared by all adapters.
pub fn http_agent(timeout: Duration, user_agent: &str) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
}

/// Build the adapter for `kind` against a URL template containing `{ip}`.
pub fn build_provider(
    kind: ProviderKind,
    template: &str,
    agent: ureq::Agent,
) -> Box<dyn LocationProvider> {
    let source = HttpSource::new(template, agent);
    match kind {
        ProviderKind::IpApi => Box::new(IpApi::new(source)),
        ProviderKind::IpInfo => Box::new(IpInfo::new(source)),
        ProviderKind::FreeGeoIp => Box::new(FreeGeoIp::new(source)),
    }
}

// ─── Transport ──────────────────────────────────────────────────

/// An endpoint template plus the agent used to call it.
#[derive(Clone)]
pub struct HttpSource {
    template: String,
    agent: ureq::Agent,
}

impl HttpSource {
    pub fn new(template: impl Into<String>, agent: ureq::Agent) -> Self {
        Self {
            template: template.into(),
            agent,
        }
    }

    pub fn url_for(&self, ip: &str) -> String {
        self.template.replace("{ip}", ip)
    }

    /// GET the endpoint for `ip` and return the raw body of a 2xx response.
    fn get_body(&self, ip: &str) -> Result<String, ProviderError> {
        let url = self.url_for(ip);
        let response = match self.agent.get(&url).call() {
            Ok(r) => r,
            Err(ureq::Error::Status(429, _)) => return Err(ProviderError::RateLimited),
            Err(ureq::Error::Status(code, _)) => return Err(ProviderError::Status(code)),
            Err(e) => return Err(ProviderError::Transport(e.to_string())),
        };

        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(ProviderError::Status(status));
        }

        response
            .into_string()
            .map_err(|e| ProviderError::Transport(e.to_string()))
    }
}

// ─── Shared parsing helpers ─────────────────────────────────────

fn text(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

fn accept(record: LocationRecord) -> Result<LocationRecord, ProviderError> {
    if record.has_location_data() {
        Ok(record)
    } else {
        Err(ProviderError::NoLocationData)
    }
}

fn is_rate_limit(reason: &str) -> bool {
    let lower = reason.to_lowercase();
    lower.contains("ratelimit") || lower.contains("rate limit") || lower.contains("too many")
}

fn rejection(reason: String) -> ProviderError {
    if is_rate_limit(&reason) {
        ProviderError::RateLimited
    } else {
        ProviderError::Rejected(reason)
    }
}

fn decode<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))
}

/// Split an ipinfo-style `"lat,lon"` string into two coordinates.
pub fn parse_coordinate_pair(loc: &str) -> Option<(f64, f64)> {
    let mut parts = loc.split(',');
    let lat = parts.next()?.trim().parse::<f64>().ok()?;
    let lon = parts.next()?.trim().parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((lat, lon))
}

// ─── ipapi.co ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct IpApiResult {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

pub struct IpApi {
    source: HttpSource,
}

impl IpApi {
    pub fn new(source: HttpSource) -> Self {
        Self { source }
    }

    pub fn parse(body: &str) -> Result<LocationRecord, ProviderError> {
        let r: IpApiResult = decode(body)?;

        // Throttling and reserved ranges come back as 200 with an error flag.
        if r.error {
            return Err(rejection(r.reason.unwrap_or_else(|| "unspecified".into())));
        }

        accept(LocationRecord {
            city: text(r.city),
            region: text(r.region),
            country: text(r.country_name),
            latitude: r.latitude,
            longitude: r.longitude,
            source: ProviderKind::IpApi,
        })
    }
}

impl LocationProvider for IpApi {
    fn kind(&self) -> ProviderKind {
        ProviderKind::IpApi
    }

    fn fetch_location(&self, ip: &str) -> Result<LocationRecord, ProviderError> {
        Self::parse(&self.source.get_body(ip)?)
    }
}

// ─── ipinfo.io ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct IpInfoError {
    title: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct IpInfoResult {
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
    loc: Option<String>,
    #[serde(default)]
    bogon: bool,
    error: Option<IpInfoError>,
}

pub struct IpInfo {
    source: HttpSource,
}

impl IpInfo {
    pub fn new(source: HttpSource) -> Self {
        Self { source }
    }

    pub fn parse(body: &str) -> Result<LocationRecord, ProviderError> {
        let r: IpInfoResult = decode(body)?;

        if let Some(err) = r.error {
            let title = err.title.unwrap_or_default();
            if is_rate_limit(&title) {
                return Err(ProviderError::RateLimited);
            }
            let reason = err
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| if title.is_empty() { "unspecified".into() } else { title });
            return Err(rejection(reason));
        }
        if r.bogon {
            return Err(ProviderError::NoLocationData);
        }

        let coords = r.loc.as_deref().and_then(parse_coordinate_pair);

        accept(LocationRecord {
            city: text(r.city),
            region: text(r.region),
            country: text(r.country),
            latitude: coords.map(|(lat, _)| lat),
            longitude: coords.map(|(_, lon)| lon),
            source: ProviderKind::IpInfo,
        })
    }
}

impl LocationProvider for IpInfo {
    fn kind(&self) -> ProviderKind {
        ProviderKind::IpInfo
    }

    fn fetch_location(&self, ip: &str) -> Result<LocationRecord, ProviderError> {
        Self::parse(&self.source.get_body(ip)?)
    }
}

// ─── freegeoip.app ──────────────────────────────────────────────

#[derive(Deserialize)]
struct FreeGeoIpResult {
    city: Option<String>,
    #[serde(alias = "region")]
    region_name: Option<String>,
    country_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

pub struct FreeGeoIp {
    source: HttpSource,
}

impl FreeGeoIp {
    pub fn new(source: HttpSource) -> Self {
        Self { source }
    }

    pub fn parse(body: &str) -> Result<LocationRecord, ProviderError> {
        let r: FreeGeoIpResult = decode(body)?;

        accept(LocationRecord {
            city: text(r.city),
            region: text(r.region_name),
            country: text(r.country_name),
            latitude: r.latitude,
            longitude: r.longitude,
            source: ProviderKind::FreeGeoIp,
        })
    }
}

impl LocationProvider for FreeGeoIp {
    fn kind(&self) -> ProviderKind {
        ProviderKind::FreeGeoIp
    }

    fn fetch_location(&self, ip: &str) -> Result<LocationRecord, ProviderError> {
        Self::parse(&self.source.get_body(ip)?)
    }
}
