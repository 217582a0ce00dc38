//! Forward DNS lookup.

use std::net::IpAddr;
use thiserror::Error;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveErrorKind;
use trust_dns_resolver::Resolver;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveFailure {
    /// The name exists in no zone we can see, or has no address records.
    #[error("no DNS records for '{0}'")]
    NotFound(String),
    /// The lookup itself failed (timeout, unreachable server, bad reply).
    #[error("DNS lookup for '{domain}' failed: {reason}")]
    Transport { domain: String, reason: String },
}

/// Anything that can turn a host name into addresses.
pub trait HostResolver: Send + Sync {
    fn lookup(&self, domain: &str) -> Result<Vec<IpAddr>, ResolveFailure>;
}

/// Blocking resolver backed by the system DNS configuration.
pub struct SystemResolver {
    inner: Resolver,
}

impl SystemResolver {
    /// Read `/etc/resolv.conf` (or the platform equivalent), falling back to
    /// the library's default upstreams when that is unavailable.
    pub fn new() -> std::io::Result<Self> {
        let inner = match Resolver::from_system_conf() {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "system DNS config unavailable, using defaults");
                Resolver::new(ResolverConfig::default(), ResolverOpts::default())?
            }
        };
        Ok(Self { inner })
    }
}

impl HostResolver for SystemResolver {
    fn lookup(&self, domain: &str) -> Result<Vec<IpAddr>, ResolveFailure> {
        match self.inner.lookup_ip(domain) {
            Ok(answer) => Ok(answer.iter().collect()),
            Err(e) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => Err(ResolveFailure::NotFound(domain.to_string())),
                _ => Err(ResolveFailure::Transport {
                    domain: domain.to_string(),
                    reason: e.to_string(),
                }),
            },
        }
    }
}

/// Resolve `domain` and return its first address.
///
/// Existence check and address fetch share this single lookup. No IPv4/IPv6
/// preference is applied; order is whatever the resolver returned.
pub fn resolve(resolver: &dyn HostResolver, domain: &str) -> Result<String, ResolveFailure> {
    let addrs = resolver.lookup(domain)?;
    addrs
        .first()
        .map(|ip| ip.to_string())
        .ok_or_else(|| ResolveFailure::NotFound(domain.to_string()))
}
