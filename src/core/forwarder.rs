//! Upstream forwarding.
//!
//! Every call issues exactly one GET through the [`HttpClient`] port and turns
//! the outcome into a platform-neutral [`ProxyResponse`]. There are no retries
//! and no in-process caching; cache headers are advisory for downstream caches.
use std::sync::Arc;

use bytes::Bytes;
use hyper::{
    HeaderMap, StatusCode,
    header::{self, HeaderValue},
};

use crate::{
    core::{
        error::GatewayError,
        origin::BackendOrigin,
        routes::{ApiRoute, CachePolicy, FeedKind},
    },
    ports::http_client::{HttpClient, HttpClientError, UpstreamResponse},
};

/// Backend path serving pre-rendered Open Graph HTML for a post.
pub const META_POST_PATH: &str = "/meta/post";

const TEXT_HTML: &str = "text/html";
const TEXT_HTML_UTF8: &str = "text/html; charset=utf-8";
const TEXT_PLAIN: &str = "text/plain";
const APPLICATION_JSON: &str = "application/json";

/// A response record independent of any server framework.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyResponse {
    pub fn new(status: StatusCode, content_type: HeaderValue, body: impl Into<Bytes>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, content_type);
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// `{"error": message}` with the given status.
    pub fn json_error(status: StatusCode, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self::new(status, HeaderValue::from_static(APPLICATION_JSON), body)
    }

    pub fn plain_text(status: StatusCode, message: &str) -> Self {
        Self::new(
            status,
            HeaderValue::from_static(TEXT_PLAIN),
            message.to_string(),
        )
    }

    pub fn with_cache(mut self, policy: CachePolicy) -> Self {
        if let Ok(value) = HeaderValue::from_str(&policy.header_value()) {
            self.headers.insert(header::CACHE_CONTROL, value);
        }
        self
    }

    pub fn with_cors_any(mut self) -> Self {
        self.headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

/// Three-way outcome of a bot render attempt.
#[derive(Debug)]
pub enum BotRender {
    /// Backend produced HTML for the slug
    Rendered(ProxyResponse),
    /// Backend answered non-2xx (typically no such post)
    NotFound(StatusCode),
    /// Backend unreachable or timed out
    Failed(HttpClientError),
}

#[derive(Clone)]
pub struct Forwarder {
    client: Arc<dyn HttpClient>,
}

impl Forwarder {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }

    /// Single GET; non-2xx becomes [`GatewayError::UpstreamNonSuccess`].
    async fn fetch(
        &self,
        url: &str,
        accept: &'static str,
    ) -> Result<UpstreamResponse, GatewayError> {
        let response = self.client.get(url, accept).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(GatewayError::UpstreamNonSuccess {
                status: response.status,
            })
        }
    }

    /// Relay an `/api` request.
    pub async fn forward_api(&self, origin: &BackendOrigin, route: &ApiRoute) -> ProxyResponse {
        let url = origin.join(&route.upstream_path());

        match self.fetch(&url, ApiRoute::ACCEPT).await {
            Ok(upstream) => {
                let content_type = upstream
                    .content_type
                    .unwrap_or_else(|| HeaderValue::from_static(ApiRoute::DEFAULT_CONTENT_TYPE));
                ProxyResponse::new(StatusCode::OK, content_type, upstream.body)
                    .with_cache(route.cache_policy())
                    .with_cors_any()
            }
            Err(e) => {
                tracing::warn!("API forward to {} failed: {}", url, e);
                Self::api_error(&e)
            }
        }
    }

    /// Relay one of the XML feeds. The inbound query string is not forwarded.
    pub async fn forward_feed(&self, origin: &BackendOrigin, feed: FeedKind) -> ProxyResponse {
        let url = origin.join(feed.upstream_path());

        match self.fetch(&url, feed.accept()).await {
            Ok(upstream) => ProxyResponse::new(
                StatusCode::OK,
                HeaderValue::from_static(feed.content_type()),
                upstream.body,
            )
            .with_cache(feed.cache_policy()),
            Err(e) => {
                tracing::warn!("Feed forward to {} failed: {}", url, e);
                Self::feed_error(feed, &e)
            }
        }
    }

    /// Fetch the pre-rendered page for `slug`.
    pub async fn render_bot(&self, origin: &BackendOrigin, slug: &str) -> BotRender {
        let url = origin.join(&format!(
            "{META_POST_PATH}?slug={}",
            urlencoding::encode(slug)
        ));

        match self.client.get(&url, TEXT_HTML).await {
            Ok(upstream) if upstream.is_success() => BotRender::Rendered(
                ProxyResponse::new(
                    StatusCode::OK,
                    HeaderValue::from_static(TEXT_HTML_UTF8),
                    upstream.body,
                )
                .with_cache(CachePolicy::BOT_RENDER),
            ),
            Ok(upstream) => BotRender::NotFound(upstream.status),
            Err(e) => BotRender::Failed(e),
        }
    }

    /// JSON error envelope for a failed `/api` request.
    pub fn api_error(e: &GatewayError) -> ProxyResponse {
        match e {
            GatewayError::ConfigMissing => ProxyResponse::json_error(e.status(), &e.to_string()),
            GatewayError::UpstreamNonSuccess { .. } => {
                ProxyResponse::json_error(e.status(), "API endpoint error")
            }
            GatewayError::UpstreamUnreachable(_) => {
                ProxyResponse::json_error(e.status(), "Failed to fetch from API")
            }
        }
    }

    /// Plain-text error body for a failed feed request.
    pub fn feed_error(feed: FeedKind, e: &GatewayError) -> ProxyResponse {
        match e {
            GatewayError::ConfigMissing => {
                ProxyResponse::plain_text(e.status(), &format!("Configuration error: {e}"))
            }
            GatewayError::UpstreamNonSuccess { .. } => {
                ProxyResponse::plain_text(e.status(), feed.unavailable_message())
            }
            GatewayError::UpstreamUnreachable(_) => {
                ProxyResponse::plain_text(e.status(), feed.fetch_failed_message())
            }
        }
    }
}
