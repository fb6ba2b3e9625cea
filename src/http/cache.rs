//! HTTP cache control module
//!
//! `ETag` generation, conditional requests and the `Cache-Control` policy
//! of each kind of response.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Quoted `ETag` for a response body, e.g. `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// True when the client's `If-None-Match` matches `etag` (answer 304)
///
/// Accepts a single tag, a comma separated list, or `*`.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .any(|e| e.trim() == etag || e.trim() == "*")
    })
}

/// Seconds a statically generated page may be kept by shared caches
const GENERATED_MAX_AGE: u32 = 31_536_000;

/// Cache policy per response kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Page rendered for this request; must not be reused
    RequestTime,
    /// Page from the static page cache
    Generated,
    /// Static asset with a browser max-age (seconds)
    Asset(u32),
    /// Never stored (health probes, errors)
    NoStore,
}

impl CachePolicy {
    /// `Cache-Control` header value
    pub fn to_header_value(self) -> String {
        match self {
            Self::RequestTime => "private, no-cache".to_string(),
            Self::Generated => {
                format!("public, s-maxage={GENERATED_MAX_AGE}, stale-while-revalidate")
            }
            Self::Asset(max_age) => format!("public, max-age={max_age}"),
            Self::NoStore => "no-store".to_string(),
        }
    }

    /// Policy for a rendered page
    pub const fn for_page(cached: bool) -> Self {
        if cached {
            Self::Generated
        } else {
            Self::RequestTime
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::Asset(3600)
    }
}
