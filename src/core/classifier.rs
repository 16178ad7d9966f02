//! Request classification.
//!
//! Decides, from the path and User-Agent alone, whether a request is relayed
//! to the backend, answered with pre-rendered bot HTML, or handed to the SPA.
use std::borrow::Cow;

use crate::core::{
    bot_detector::BotDetector,
    routes::{ApiRoute, FeedKind, ProxyRoute, RouteTable},
};

/// First path segments that are never content slugs.
pub const DEFAULT_RESERVED_PREFIXES: &[&str] =
    &["api", "assets", "_next", "images", "stats", "_sitegate"];

/// Outcome of classifying one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Hand the request to the SPA shell
    PassThrough,
    /// Relay to the backend JSON API
    ApiForward(ApiRoute),
    /// Relay an XML feed
    FeedForward(FeedKind),
    /// Bot on a content page: try the pre-rendered metadata page for this slug
    BotRender(String),
}

impl Decision {
    /// Short label used in logs and the `X-Sitegate-Decision` header
    pub fn label(&self) -> &'static str {
        match self {
            Decision::PassThrough => "pass-through",
            Decision::ApiForward(_) => "api",
            Decision::FeedForward(_) => "feed",
            Decision::BotRender(_) => "bot-render",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestClassifier {
    routes: RouteTable,
    bots: BotDetector,
    reserved_prefixes: Vec<String>,
}

impl Default for RequestClassifier {
    fn default() -> Self {
        Self::new(
            RouteTable::default(),
            BotDetector::default(),
            DEFAULT_RESERVED_PREFIXES,
        )
    }
}

impl RequestClassifier {
    pub fn new<I, S>(routes: RouteTable, bots: BotDetector, reserved_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            routes,
            bots,
            reserved_prefixes: reserved_prefixes
                .into_iter()
                .map(|p| p.as_ref().to_string())
                .collect(),
        }
    }

    pub fn bot_detector(&self) -> &BotDetector {
        &self.bots
    }

    /// Classify a request by path, raw query and User-Agent.
    pub fn classify(&self, path: &str, query: Option<&str>, user_agent: Option<&str>) -> Decision {
        if let Some(route) = self.routes.lookup(path, query) {
            return match route {
                ProxyRoute::Api(api) => Decision::ApiForward(api),
                ProxyRoute::Feed(kind) => Decision::FeedForward(kind),
            };
        }

        let Some(first) = path.split('/').find(|s| !s.is_empty()) else {
            return Decision::PassThrough;
        };

        // A dot implies a static file extension
        if first.contains('.') || self.is_reserved(first) {
            return Decision::PassThrough;
        }

        if !self.bots.is_bot(user_agent) {
            return Decision::PassThrough;
        }

        Decision::BotRender(decode_slug(first).into_owned())
    }

    fn is_reserved(&self, segment: &str) -> bool {
        self.reserved_prefixes.iter().any(|p| p == segment)
    }
}

/// Percent-decode a path segment; invalid UTF-8 falls back to the raw text.
fn decode_slug(segment: &str) -> Cow<'_, str> {
    urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FB: &str = "facebookexternalhit/1.1";
    const CHROME: &str =
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

    #[test]
    fn test_home_and_static_files_pass_through_for_any_agent() {
        let classifier = RequestClassifier::default();
        for path in ["/", "", "//", "/favicon.ico", "/robots.txt", "/logo.svg/extra"] {
            for ua in [Some(FB), Some(CHROME), None] {
                assert_eq!(
                    classifier.classify(path, None, ua),
                    Decision::PassThrough,
                    "path {path:?} ua {ua:?}"
                );
            }
        }
    }

    #[test]
    fn test_reserved_prefixes_pass_through_for_bots() {
        let classifier = RequestClassifier::default();
        for path in ["/images/cover", "/stats", "/assets/index", "/_next/static"] {
            assert_eq!(classifier.classify(path, None, Some(FB)), Decision::PassThrough);
        }
    }

    #[test]
    fn test_bot_on_content_path_renders() {
        let classifier = RequestClassifier::default();
        for ua in [
            FB,
            "Twitterbot/1.0",
            "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)",
            "LinkedInBot/1.0 (compatible; Mozilla/5.0; Apache-HttpClient +http://www.linkedin.com)",
        ] {
            assert_eq!(
                classifier.classify("/my-post", None, Some(ua)),
                Decision::BotRender("my-post".to_string())
            );
        }
    }

    #[test]
    fn test_slug_is_first_segment() {
        let classifier = RequestClassifier::default();
        assert_eq!(
            classifier.classify("/setup-guide/comments/", Some("ref=x"), Some(FB)),
            Decision::BotRender("setup-guide".to_string())
        );
    }

    #[test]
    fn test_slug_is_percent_decoded() {
        let classifier = RequestClassifier::default();
        assert_eq!(
            classifier.classify("/caf%C3%A9-notes", None, Some(FB)),
            Decision::BotRender("café-notes".to_string())
        );
    }

    #[test]
    fn test_humans_pass_through_on_content() {
        let classifier = RequestClassifier::default();
        assert_eq!(classifier.classify("/my-post", None, Some(CHROME)), Decision::PassThrough);
        assert_eq!(classifier.classify("/my-post", None, Some("")), Decision::PassThrough);
        assert_eq!(classifier.classify("/my-post", None, None), Decision::PassThrough);
    }

    #[test]
    fn test_proxy_routes_ignore_user_agent() {
        let classifier = RequestClassifier::default();
        for ua in [Some(FB), Some(CHROME), None] {
            assert_eq!(
                classifier.classify("/rss.xml", None, ua),
                Decision::FeedForward(FeedKind::Rss)
            );
            assert_eq!(
                classifier.classify("/api/posts", Some("x=1"), ua),
                Decision::ApiForward(ApiRoute {
                    rest: "/posts".to_string(),
                    query: Some("x=1".to_string()),
                })
            );
        }
    }

    #[test]
    fn test_custom_reserved_prefixes() {
        let classifier =
            RequestClassifier::new(RouteTable::default(), BotDetector::default(), ["drafts"]);
        assert_eq!(classifier.classify("/drafts", None, Some(FB)), Decision::PassThrough);
        assert_eq!(
            classifier.classify("/images", None, Some(FB)),
            Decision::BotRender("images".to_string())
        );
    }

    #[test]
    fn test_decision_labels() {
        assert_eq!(Decision::PassThrough.label(), "pass-through");
        assert_eq!(Decision::FeedForward(FeedKind::Sitemap).label(), "feed");
        assert_eq!(Decision::BotRender("x".into()).label(), "bot-render");
    }
}
