//! Edge routing rule
//!
//! Runs before page dispatch and decides, per request, whether the page is
//! rendered at request time or served from the statically generated
//! namespace. Stateless: the decision depends only on the path and cookies.

use crate::config::EdgeConfig;

/// Outcome of the edge rule for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeDecision {
    /// Static asset; the rule takes no action
    Asset,
    /// Not cacheable; rendered at request time on the unchanged path
    PassThrough,
    /// Rewritten into the cached namespace
    Rewrite(String),
}

impl EdgeDecision {
    /// Path the request is dispatched on
    pub fn target<'a>(&'a self, path: &'a str) -> &'a str {
        match self {
            Self::Rewrite(target) => target,
            Self::Asset | Self::PassThrough => path,
        }
    }
}

/// Apply the rule to a request path and its raw `Cookie` header
pub fn decide(path: &str, cookie_header: Option<&str>, config: &EdgeConfig) -> EdgeDecision {
    if is_asset(path, &config.asset_extensions) {
        return EdgeDecision::Asset;
    }

    let cacheable = cookie_header
        .and_then(|header| cookie_value(header, &config.cookie_name))
        .is_some_and(|value| value == "true");
    if !cacheable {
        return EdgeDecision::PassThrough;
    }

    let prefix = config.cached_prefix.trim_end_matches('/');
    EdgeDecision::Rewrite(format!("{prefix}{path}"))
}

fn is_asset(path: &str, extensions: &[String]) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| extensions.iter().any(|e| e == ext))
}

/// First value of cookie `name`; pairs without `=` are skipped
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> EdgeConfig {
        EdgeConfig::default()
    }

    #[test]
    fn test_assets_are_never_rewritten() {
        for path in ["/favicon.ico", "/img/cover.jpg", "/a/b/c.png"] {
            assert_eq!(decide(path, None, &cfg()), EdgeDecision::Asset);
            assert_eq!(
                decide(path, Some("cacheable=true"), &cfg()),
                EdgeDecision::Asset
            );
        }
    }

    #[test]
    fn test_other_extensions_are_pages() {
        assert_eq!(
            decide("/album/v1.2", Some("cacheable=true"), &cfg()),
            EdgeDecision::Rewrite("/ssg/album/v1.2".to_string())
        );
        assert_eq!(decide("/logo.svg", None, &cfg()), EdgeDecision::PassThrough);
    }

    #[test]
    fn test_without_cookie_passes_through() {
        assert_eq!(decide("/album/1", None, &cfg()), EdgeDecision::PassThrough);
        assert_eq!(
            decide("/album/1", Some("theme=dark"), &cfg()),
            EdgeDecision::PassThrough
        );
    }

    #[test]
    fn test_non_true_values_pass_through() {
        for header in [
            "cacheable=false",
            "cacheable=TRUE",
            "cacheable=1",
            "cacheable=",
            "cacheable",
            "cacheable=\"true\"",
            "notcacheable=true",
        ] {
            assert_eq!(
                decide("/", Some(header), &cfg()),
                EdgeDecision::PassThrough,
                "header {header:?}"
            );
        }
    }

    #[test]
    fn test_cacheable_true_rewrites() {
        assert_eq!(
            decide("/album/1", Some("cacheable=true"), &cfg()),
            EdgeDecision::Rewrite("/ssg/album/1".to_string())
        );
        assert_eq!(
            decide("/", Some("theme=dark; cacheable=true"), &cfg()),
            EdgeDecision::Rewrite("/ssg/".to_string())
        );
    }

    #[test]
    fn test_malformed_cookie_header() {
        assert_eq!(
            decide("/artist", Some(";;=;garbage"), &cfg()),
            EdgeDecision::PassThrough
        );
        assert_eq!(
            decide("/artist", Some("garbage; cacheable=true"), &cfg()),
            EdgeDecision::Rewrite("/ssg/artist".to_string())
        );
    }

    #[test]
    fn test_custom_prefix_and_cookie() {
        let config = EdgeConfig {
            cookie_name: "static".to_string(),
            cached_prefix: "/cache/".to_string(),
            asset_extensions: vec!["webp".to_string()],
        };
        assert_eq!(
            decide("/playlist/9", Some("static=true"), &config),
            EdgeDecision::Rewrite("/cache/playlist/9".to_string())
        );
        assert_eq!(decide("/x.webp", Some("static=true"), &config), EdgeDecision::Asset);
    }

    #[test]
    fn test_target() {
        let rewrite = EdgeDecision::Rewrite("/ssg/album".to_string());
        assert_eq!(rewrite.target("/album"), "/ssg/album");
        assert_eq!(EdgeDecision::PassThrough.target("/album"), "/album");
    }

    #[test]
    fn test_cookie_value() {
        assert_eq!(cookie_value("a=1; b=2", "b"), Some("2"));
        assert_eq!(cookie_value("a=1; a=2", "a"), Some("1"));
        assert_eq!(cookie_value("a", "a"), None);
    }
}
