//! Domain input cleanup and syntactic validation.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Labels of 1-63 alphanumerics/hyphens (no leading or trailing hyphen),
/// dot-separated, ending in an alphabetic TLD of at least two characters.
static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,63}$")
        .expect("domain pattern is valid")
});

const MAX_DOMAIN_LEN: usize = 253;

/// Reduce a user-supplied domain or URL to a bare host name.
///
/// `https://www.example.com/path` → `example.com`. Never fails: input that
/// cannot be parsed as a URL is passed through for validation to reject.
pub fn normalize(input: &str) -> String {
    if input.starts_with("http://") || input.starts_with("https://") {
        if let Ok(url) = Url::parse(input) {
            if let Some(host) = url.host_str() {
                return strip_host(host);
            }
        }
    }

    strip_host(input)
}

fn strip_host(host: &str) -> String {
    host.strip_prefix("www.").unwrap_or(host).trim().to_string()
}

/// Pure syntactic check; says nothing about whether the name exists.
pub fn is_valid_domain_format(domain: &str) -> bool {
    domain.len() <= MAX_DOMAIN_LEN && DOMAIN_RE.is_match(domain)
}
