// Dropping an in-flight request must abort the outbound backend call
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{body::Body, http::Request};
use sitegate::{
    adapters::{FileSystemAdapter, HttpHandler, http_handler},
    config::SpaConfig,
    core::{BackendOrigin, GatewayService},
    ports::http_client::{HttpClient, HttpClientResult, UpstreamResponse},
};
use tower::ServiceExt;

/// Sets the flag when the owning future is dropped.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// A backend that never answers.
#[derive(Default)]
struct HangingClient {
    started: AtomicUsize,
    aborted: Arc<AtomicBool>,
}

#[async_trait]
impl HttpClient for HangingClient {
    async fn get(&self, _url: &str, _accept: &'static str) -> HttpClientResult<UpstreamResponse> {
        let _guard = DropFlag(self.aborted.clone());
        self.started.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_dropped_request_aborts_upstream_call() {
    let client = Arc::new(HangingClient::default());
    let gateway = Arc::new(GatewayService::with_defaults(
        client.clone(),
        Some(BackendOrigin::derive("https://demo.convex.cloud")),
    ));
    let handler = HttpHandler::new(gateway, Arc::new(FileSystemAdapter::new()), SpaConfig::default());
    let app = http_handler::router(Arc::new(handler));

    let request = Request::builder()
        .uri("/api/posts")
        .body(Body::empty())
        .unwrap();

    // The client gives up before the backend answers
    let result = tokio::time::timeout(Duration::from_millis(100), app.oneshot(request)).await;
    assert!(result.is_err());

    assert_eq!(client.started.load(Ordering::SeqCst), 1);
    assert!(client.aborted.load(Ordering::SeqCst));
}
