//! Title and favicon lookup used by `bookmark.refetch`.
//!
//! Page scraping lives outside this crate; the server only sees the
//! [`MetadataResolver`] seam. The default resolver works offline.

use std::net::Ipv4Addr;

use reqwest::Url;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlMetadata {
    pub title: Option<String>,
    pub favicon: Option<String>,
}

pub trait MetadataResolver: Send {
    /// Metadata for `url`. Unreachable or disallowed urls yield empty metadata.
    fn resolve(&self, url: &str) -> UrlMetadata;
}

/// Rejects non-http schemes, loopback and private network hosts.
pub fn is_allowed_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_lowercase();
    if matches!(host.as_str(), "localhost" | "[::1]" | "::1" | "0.0.0.0") {
        return false;
    }
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        let [a, b, _, _] = ip.octets();
        if a == 10 || a == 127 {
            return false;
        }
        if (a == 172 && (16..=31).contains(&b)) || (a == 192 && b == 168) || (a == 169 && b == 254) {
            return false;
        }
    }
    true
}

/// `<scheme>://<host>/favicon.ico` for a parseable url.
pub fn origin_favicon(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();
    Some(format!("{}://{}{}/favicon.ico", parsed.scheme(), host, port))
}

/// Resolver that never touches the network: keeps the title and points the
/// favicon at the site root.
#[derive(Debug, Clone, Copy, Default)]
pub struct OriginFaviconResolver;

impl MetadataResolver for OriginFaviconResolver {
    fn resolve(&self, url: &str) -> UrlMetadata {
        if !is_allowed_url(url) {
            return UrlMetadata::default();
        }
        UrlMetadata {
            title: None,
            favicon: origin_favicon(url),
        }
    }
}
