use std::{convert::Infallible, sync::Arc};

use axum::{
    Router,
    body::Body as AxumBody,
    extract::Request as AxumRequest,
    http::{HeaderValue, StatusCode, header},
    middleware,
    routing::any,
};
use eyre::{Result, WrapErr};
use hyper::{Request, Response};
use tower_http::trace::TraceLayer;

use crate::{
    adapters::{FileSystemAdapter, request_id_middleware, request_timing_middleware},
    config::models::SpaConfig,
    core::{GatewayService, InboundRequest, Outcome, ProxyResponse},
    ports::file_system::FileSystem,
};

/// Diagnostics path answered by the gateway itself.
pub const HEALTH_PATH: &str = "/_sitegate/health";

/// Response header naming the branch that produced the response.
pub const DECISION_HEADER: &str = "x-sitegate-decision";

const PASS_THROUGH: &str = "pass-through";

/// HTTP handler hosting the gateway behind axum
pub struct HttpHandler {
    gateway_service: Arc<GatewayService>,
    file_system: Arc<FileSystemAdapter>,
    spa: SpaConfig,
}

impl HttpHandler {
    pub fn new(
        gateway_service: Arc<GatewayService>,
        file_system: Arc<FileSystemAdapter>,
        spa: SpaConfig,
    ) -> Self {
        Self {
            gateway_service,
            file_system,
            spa,
        }
    }

    /// Main request handler that routes requests appropriately
    pub async fn handle_request(&self, req: Request<AxumBody>) -> Result<Response<AxumBody>> {
        let uri = req.uri().clone();
        let path = uri.path();

        tracing::debug!("Handling {} request to {}", req.method(), path);

        if path == HEALTH_PATH {
            return self.handle_health_check();
        }

        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let inbound = InboundRequest::new(path, uri.query(), user_agent.as_deref());

        match self.gateway_service.handle(&inbound).await {
            Outcome::Respond { decision, response } => into_response(decision, response),
            Outcome::PassThrough => self.serve_spa(req).await,
        }
    }

    /// Handle health check endpoint
    fn handle_health_check(&self) -> Result<Response<AxumBody>> {
        let backend_configured = self.gateway_service.origin().is_some();
        let health_data = serde_json::json!({
            "status": if backend_configured { "healthy" } else { "degraded" },
            "backend_configured": backend_configured,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .body(AxumBody::from(health_data.to_string()))
            .wrap_err("Failed to build health check response")
    }

    async fn serve_spa(&self, req: Request<AxumBody>) -> Result<Response<AxumBody>> {
        let mut response = self
            .file_system
            .serve_spa(&self.spa.root, &self.spa.index_file, req)
            .await
            .wrap_err_with(|| format!("Failed to serve SPA from {}", self.spa.root))?;

        response
            .headers_mut()
            .insert(DECISION_HEADER, HeaderValue::from_static(PASS_THROUGH));
        Ok(response)
    }
}

fn into_response(decision: &'static str, proxied: ProxyResponse) -> Result<Response<AxumBody>> {
    let ProxyResponse {
        status,
        headers,
        body,
    } = proxied;

    let mut response = Response::builder()
        .status(status)
        .body(AxumBody::from(body))
        .wrap_err("Failed to build proxied response")?;
    response.headers_mut().extend(headers);
    response
        .headers_mut()
        .insert(DECISION_HEADER, HeaderValue::from_static(decision));
    Ok(response)
}

/// Build the axum router serving every path through `handler`.
///
/// Adapter failures (SPA file serving) become a logged 500.
pub fn router(handler: Arc<HttpHandler>) -> Router {
    let route = any(move |req: AxumRequest| {
        let handler = handler.clone();
        async move {
            match handler.handle_request(req).await {
                Ok(response) => Ok::<Response<AxumBody>, Infallible>(response),
                Err(e) => {
                    tracing::error!("Request handling error: {:?}", e);
                    let error_response = Response::builder()
                        .status(StatusCode::INTERNAL_SERVER_ERROR)
                        .body(AxumBody::from("Internal Server Error"))
                        .unwrap_or_else(|_| Response::new(AxumBody::from("Internal Server Error")));
                    Ok(error_response)
                }
            }
        }
    });

    Router::new()
        .route("/", route.clone())
        .route("/{*path}", route)
        .layer(middleware::from_fn(request_timing_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

impl Clone for HttpHandler {
    fn clone(&self) -> Self {
        Self {
            gateway_service: self.gateway_service.clone(),
            file_system: self.file_system.clone(),
            spa: self.spa.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use tempfile::TempDir;

    use super::*;
    use crate::core::{BackendOrigin, forwarder::tests::StubClient};

    const FB: &str = "facebookexternalhit/1.1";

    fn create_test_handler(client: StubClient, configured: bool) -> (HttpHandler, TempDir) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "<div id=\"root\"></div>").unwrap();

        let origin = configured.then(|| BackendOrigin::derive("https://demo.convex.cloud"));
        let gateway_service = Arc::new(GatewayService::with_defaults(Arc::new(client), origin));
        let spa = SpaConfig {
            root: dir.path().to_str().unwrap().to_string(),
            index_file: "index.html".to_string(),
        };
        (
            HttpHandler::new(gateway_service, Arc::new(FileSystemAdapter::new()), spa),
            dir,
        )
    }

    fn request(uri: &str, user_agent: Option<&str>) -> Request<AxumBody> {
        let mut builder = Request::builder().uri(uri);
        if let Some(ua) = user_agent {
            builder = builder.header(header::USER_AGENT, ua);
        }
        builder.body(AxumBody::empty()).unwrap()
    }

    async fn body_string(response: Response<AxumBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_check_handler() {
        let (handler, _dir) = create_test_handler(StubClient::default(), false);
        let response = handler
            .handle_request(request(HEALTH_PATH, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["backend_configured"], false);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_api_response_carries_decision_and_headers() {
        let client = StubClient::default().with(
            "https://demo.convex.site/api/posts?limit=5",
            200,
            Some("application/json"),
            "[]",
        );
        let (handler, _dir) = create_test_handler(client, true);
        let response = handler
            .handle_request(request("/api/posts?limit=5", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers.get(DECISION_HEADER).unwrap(), "api");
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(
            headers.get(header::CACHE_CONTROL).unwrap(),
            "public, max-age=300, s-maxage=600"
        );
        assert_eq!(body_string(response).await, "[]");
    }

    #[tokio::test]
    async fn test_pass_through_serves_spa() {
        let (handler, _dir) = create_test_handler(StubClient::default(), true);
        let response = handler
            .handle_request(request("/my-post", Some("Mozilla/5.0")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(DECISION_HEADER).unwrap(), PASS_THROUGH);
        assert_eq!(body_string(response).await, "<div id=\"root\"></div>");
    }

    #[tokio::test]
    async fn test_bot_miss_serves_spa() {
        let (handler, _dir) = create_test_handler(StubClient::default(), true);
        let response = handler
            .handle_request(request("/missing-post", Some(FB)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(DECISION_HEADER).unwrap(), PASS_THROUGH);
    }
}
