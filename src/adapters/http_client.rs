use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body as AxumBody;
use eyre::Result;
use http_body_util::BodyExt;
use hyper::{Method, Request, Version, header};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use rustls_native_certs::load_native_certs;
use tokio::time::timeout;
use tracing::Instrument;

use crate::ports::http_client::{
    HttpClient, HttpClientError, HttpClientResult, UpstreamResponse,
};

const USER_AGENT: &str = concat!("sitegate/", env!("CARGO_PKG_VERSION"));

/// HTTP client adapter using Hyper with Rustls.
///
/// Responsibilities:
/// * Sends a fixed `User-Agent` and the route's `Accept` header
/// * Bounds the whole exchange (head and body) by one timeout
/// * Buffers the upstream body so it can be relayed verbatim
///
/// Dropping the returned future aborts the in-flight request.
pub struct HttpClientAdapter {
    client: Client<HttpsConnector<HttpConnector>, AxumBody>,
    timeout: Duration,
}

impl HttpClientAdapter {
    /// Create a new HTTP client adapter.
    pub fn new(timeout: Duration) -> Result<Self> {
        // Install default crypto provider for rustls if not already set
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let mut http_connector = HttpConnector::new();
        http_connector.enforce_http(false); // Allow HTTPS URLs
        http_connector.set_connect_timeout(Some(timeout));

        let mut root_cert_store = rustls::RootCertStore::empty();
        let native_certs = load_native_certs();

        if !native_certs.certs.is_empty() {
            for cert in native_certs.certs {
                if root_cert_store.add(cert).is_err() {
                    tracing::warn!("Failed to add native certificate to rustls RootCertStore");
                }
            }
            tracing::info!("Loaded {} native root certificates.", root_cert_store.len());
        }

        if !native_certs.errors.is_empty() {
            tracing::warn!(
                "Some native certificates failed to load: {:?}",
                native_certs.errors
            );
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_cert_store)
            .with_no_client_auth();

        let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .wrap_connector(http_connector);

        let client = Client::builder(TokioExecutor::new()).build::<_, AxumBody>(https_connector);

        tracing::info!("Created upstream HTTP client (timeout {:?})", timeout);
        Ok(Self { client, timeout })
    }

    fn build_request(url: &str, accept: &'static str) -> HttpClientResult<Request<AxumBody>> {
        Request::builder()
            .method(Method::GET)
            .uri(url)
            .version(Version::HTTP_11)
            .header(header::ACCEPT, accept)
            .header(header::USER_AGENT, USER_AGENT)
            .body(AxumBody::empty())
            .map_err(|e| HttpClientError::InvalidRequest(e.to_string()))
    }

    async fn exchange(&self, request: Request<AxumBody>) -> HttpClientResult<UpstreamResponse> {
        let uri = request.uri().clone();

        let response = self.client.request(request).await.map_err(|e| {
            HttpClientError::ConnectionError(format!("Request to GET {uri} failed: {e}"))
        })?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| HttpClientError::BodyError(e.to_string()))?
            .to_bytes();

        Ok(UpstreamResponse {
            status: parts.status,
            content_type: parts.headers.get(header::CONTENT_TYPE).cloned(),
            body,
        })
    }
}

#[async_trait]
impl HttpClient for HttpClientAdapter {
    async fn get(&self, url: &str, accept: &'static str) -> HttpClientResult<UpstreamResponse> {
        let request = Self::build_request(url, accept)?;
        if request.uri().host().is_none() {
            tracing::error!("Outgoing URI has no host: {}", request.uri());
            return Err(HttpClientError::InvalidRequest(
                "Outgoing URI has no host".to_string(),
            ));
        }

        let span = tracing::info_span!(
            "backend_request",
            backend.url = %url,
            http.status_code = tracing::field::Empty,
        );
        tracing::debug!(parent: &span, "Sending upstream request: GET {}", url);

        match timeout(self.timeout, self.exchange(request))
            .instrument(span.clone())
            .await
        {
            Ok(Ok(response)) => {
                span.record("http.status_code", response.status.as_u16());
                Ok(response)
            }
            Ok(Err(e)) => {
                span.record("http.status_code", 599u16);
                tracing::error!(parent: &span, "Error making request to backend {}: {}", url, e);
                Err(e)
            }
            Err(_) => {
                span.record("http.status_code", 504u16);
                tracing::warn!(
                    parent: &span,
                    "Upstream request to {} timed out after {:?}",
                    url,
                    self.timeout
                );
                Err(HttpClientError::Timeout(self.timeout))
            }
        }
    }
}
