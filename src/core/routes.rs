//! Static route table for forwarded paths.
//!
//! Each entry pairs a path predicate with the backend target it forwards to,
//! the `Accept` header sent upstream, and the content-type and
//! cache-control headers sent back to the client.
use std::fmt;

/// Advisory caching headers for downstream caches. Never enforced in-process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// `max-age` in seconds (browsers and edge)
    pub max_age: u32,
    /// `s-maxage` in seconds (shared caches)
    pub s_maxage: u32,
}

impl CachePolicy {
    pub const API: CachePolicy = CachePolicy::new(300, 600);
    pub const FEED: CachePolicy = CachePolicy::new(3600, 7200);
    pub const BOT_RENDER: CachePolicy = CachePolicy::new(60, 300);

    pub const fn new(max_age: u32, s_maxage: u32) -> Self {
        Self { max_age, s_maxage }
    }

    pub fn header_value(&self) -> String {
        format!("public, max-age={}, s-maxage={}", self.max_age, self.s_maxage)
    }
}

/// XML feeds proxied from fixed backend paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Rss,
    RssFull,
    Sitemap,
}

impl FeedKind {
    /// Backend path; the inbound query string is never forwarded.
    pub fn upstream_path(&self) -> &'static str {
        match self {
            FeedKind::Rss => "/rss.xml",
            FeedKind::RssFull => "/rss-full.xml",
            FeedKind::Sitemap => "/sitemap.xml",
        }
    }

    pub fn accept(&self) -> &'static str {
        match self {
            FeedKind::Rss | FeedKind::RssFull => "application/rss+xml",
            FeedKind::Sitemap => "application/xml",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            FeedKind::Rss | FeedKind::RssFull => "application/rss+xml; charset=utf-8",
            FeedKind::Sitemap => "application/xml; charset=utf-8",
        }
    }

    /// Body for a non-2xx backend reply.
    pub fn unavailable_message(&self) -> &'static str {
        match self {
            FeedKind::Rss | FeedKind::RssFull => "RSS feed not available",
            FeedKind::Sitemap => "Sitemap not available",
        }
    }

    /// Body when the backend could not be reached.
    pub fn fetch_failed_message(&self) -> &'static str {
        match self {
            FeedKind::Rss | FeedKind::RssFull => "Failed to fetch RSS feed",
            FeedKind::Sitemap => "Failed to fetch sitemap",
        }
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::FEED
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.upstream_path())
    }
}

/// An `/api` request: the path remainder after `/api` plus the raw query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRoute {
    /// Remainder after `/api`, e.g. `/posts` (empty for `/api` itself)
    pub rest: String,
    /// Raw query string without the leading `?`
    pub query: Option<String>,
}

impl ApiRoute {
    pub const ACCEPT: &'static str = "application/json";
    pub const DEFAULT_CONTENT_TYPE: &'static str = "application/json";

    /// Backend path and query, e.g. `/api/posts?x=1`
    pub fn upstream_path(&self) -> String {
        match &self.query {
            Some(query) => format!("/api{}?{}", self.rest, query),
            None => format!("/api{}", self.rest),
        }
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::API
    }
}

/// Path predicate of a route table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMatcher {
    /// Whole path equals the value
    Exact(&'static str),
    /// First non-empty segment equals the value
    FirstSegment(&'static str),
}

impl PathMatcher {
    fn matches(&self, path: &str, first_segment: Option<&str>) -> bool {
        match self {
            PathMatcher::Exact(p) => path == *p,
            PathMatcher::FirstSegment(seg) => first_segment == Some(*seg),
        }
    }
}

/// Target kind of a route table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    Api,
    Feed(FeedKind),
}

/// A resolved proxy route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyRoute {
    Api(ApiRoute),
    Feed(FeedKind),
}

/// Ordered route table; the first matching entry wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<(PathMatcher, RouteTarget)>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            entries: vec![
                (PathMatcher::FirstSegment("api"), RouteTarget::Api),
                (PathMatcher::Exact("/rss.xml"), RouteTarget::Feed(FeedKind::Rss)),
                (
                    PathMatcher::Exact("/rss-full.xml"),
                    RouteTarget::Feed(FeedKind::RssFull),
                ),
                (
                    PathMatcher::Exact("/sitemap.xml"),
                    RouteTarget::Feed(FeedKind::Sitemap),
                ),
            ],
        }
    }
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a request path (and raw query) against the table.
    pub fn lookup(&self, path: &str, query: Option<&str>) -> Option<ProxyRoute> {
        let first_segment = path.split('/').find(|s| !s.is_empty());

        let (_, target) = self
            .entries
            .iter()
            .find(|(matcher, _)| matcher.matches(path, first_segment))?;

        Some(match target {
            RouteTarget::Api => ProxyRoute::Api(ApiRoute {
                rest: api_remainder(path).to_string(),
                query: query.filter(|q| !q.is_empty()).map(str::to_string),
            }),
            RouteTarget::Feed(kind) => ProxyRoute::Feed(*kind),
        })
    }
}

/// Everything after the leading `/api` (leading slashes before it tolerated).
fn api_remainder(path: &str) -> &str {
    let trimmed = path.trim_start_matches('/');
    trimmed.strip_prefix("api").unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_policy_headers() {
        assert_eq!(
            CachePolicy::API.header_value(),
            "public, max-age=300, s-maxage=600"
        );
        assert_eq!(
            CachePolicy::FEED.header_value(),
            "public, max-age=3600, s-maxage=7200"
        );
        assert_eq!(
            CachePolicy::BOT_RENDER.header_value(),
            "public, max-age=60, s-maxage=300"
        );
    }

    #[test]
    fn test_api_lookup_preserves_path_and_query() {
        let table = RouteTable::new();
        let route = table.lookup("/api/posts", Some("x=1")).unwrap();
        let ProxyRoute::Api(api) = route else {
            panic!("Expected Api route");
        };
        assert_eq!(api.rest, "/posts");
        assert_eq!(api.upstream_path(), "/api/posts?x=1");
    }

    #[test]
    fn test_api_lookup_nested_and_bare() {
        let table = RouteTable::new();
        let Some(ProxyRoute::Api(nested)) = table.lookup("/api/post/hello-world", None) else {
            panic!("Expected Api route");
        };
        assert_eq!(nested.upstream_path(), "/api/post/hello-world");

        let Some(ProxyRoute::Api(bare)) = table.lookup("/api", Some("")) else {
            panic!("Expected Api route");
        };
        assert_eq!(bare.upstream_path(), "/api");
    }

    #[test]
    fn test_api_prefix_requires_whole_segment() {
        let table = RouteTable::new();
        assert!(table.lookup("/apis/thing", None).is_none());
        assert!(table.lookup("/apiary", None).is_none());
    }

    #[test]
    fn test_feed_lookup() {
        let table = RouteTable::new();
        assert_eq!(
            table.lookup("/rss.xml", Some("utm=1")),
            Some(ProxyRoute::Feed(FeedKind::Rss))
        );
        assert_eq!(
            table.lookup("/rss-full.xml", None),
            Some(ProxyRoute::Feed(FeedKind::RssFull))
        );
        assert_eq!(
            table.lookup("/sitemap.xml", None),
            Some(ProxyRoute::Feed(FeedKind::Sitemap))
        );
        assert!(table.lookup("/feed/rss.xml", None).is_none());
    }

    #[test]
    fn test_content_paths_do_not_match() {
        let table = RouteTable::new();
        assert!(table.lookup("/", None).is_none());
        assert!(table.lookup("/my-post", None).is_none());
    }
}
