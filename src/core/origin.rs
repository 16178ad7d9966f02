//! Backend HTTP origin derivation.
//!
//! The hosted backend is configured by its cloud URL (the one the SPA talks to
//! over the realtime protocol). Plain HTTP endpoints live on a sibling host
//! that differs only in the domain suffix.
use std::fmt;

const CLOUD_SUFFIX: &str = ".cloud";
const SITE_SUFFIX: &str = ".site";

/// The HTTP-reachable origin of the backend, without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOrigin(String);

impl BackendOrigin {
    /// Derive the HTTP origin from a cloud origin.
    ///
    /// Replaces the first `.cloud` with `.site` and trims trailing slashes.
    /// Pure string transform: an already derived origin maps to itself.
    pub fn derive(cloud_url: &str) -> Self {
        let site = cloud_url.trim().replacen(CLOUD_SUFFIX, SITE_SUFFIX, 1);
        Self(site.trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build an absolute URL for a backend path (which must start with `/`).
    pub fn join(&self, path_and_query: &str) -> String {
        format!("{}{}", self.0, path_and_query)
    }
}

impl fmt::Display for BackendOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_replaces_cloud_suffix() {
        let origin = BackendOrigin::derive("https://happy-otter-123.convex.cloud");
        assert_eq!(origin.as_str(), "https://happy-otter-123.convex.site");
    }

    #[test]
    fn test_derive_simple_host() {
        assert_eq!(
            BackendOrigin::derive("https://foo.cloud").as_str(),
            "https://foo.site"
        );
    }

    #[test]
    fn test_derive_twice_is_noop() {
        let once = BackendOrigin::derive("https://foo.cloud");
        let twice = BackendOrigin::derive(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_derive_without_cloud_suffix_keeps_host() {
        let origin = BackendOrigin::derive("http://127.0.0.1:3210/");
        assert_eq!(origin.as_str(), "http://127.0.0.1:3210");
    }

    #[test]
    fn test_join() {
        let origin = BackendOrigin::derive("https://foo.cloud");
        assert_eq!(origin.join("/rss.xml"), "https://foo.site/rss.xml");
    }
}
