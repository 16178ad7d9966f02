//! sitegate - an edge gateway in front of a single-page blog.
//!
//! sitegate sits between visitors and a static SPA build. For every request it
//! decides between four outcomes:
//! - `/api/*` is relayed to the hosted backend's HTTP origin as JSON
//! - `/rss.xml`, `/rss-full.xml` and `/sitemap.xml` are relayed as XML feeds
//! - A crawler asking for `/{slug}` gets pre-rendered Open Graph HTML
//! - Everything else falls through to the SPA shell
//!
//! The backend origin is derived from the deployment's cloud URL by swapping
//! `.cloud` for `.site`.
//!
//! # Quick Example
//! ```no_run
//! use std::{sync::Arc, time::Duration};
//!
//! use sitegate::{GatewayService, HttpClientAdapter, core::InboundRequest};
//!
//! # #[tokio::main] async fn main() -> eyre::Result<()> {
//! let cfg = sitegate::config::load_config("sitegate.toml", false).await?;
//! let client = Arc::new(HttpClientAdapter::new(Duration::from_secs(5))?);
//! let gateway = GatewayService::new(cfg.classifier(), client, cfg.backend.resolve_origin());
//! let outcome = gateway
//!     .handle(&InboundRequest::new("/api/posts", None, None))
//!     .await;
//! # let _ = outcome;
//! # Ok(()) }
//! ```
//!
//! # Architecture
//! The crate separates **ports** (traits) from **adapters** (implementations) while keeping
//! the decision logic inside `core`. The core never sees an axum type: it takes
//! plain request data and returns an [`core::Outcome`].
//!
//! # Error Handling
//! Seams return domain error types (`thiserror`); the binary works in
//! `eyre::Result<T>`. No request path panics: every failure becomes an explicit
//! response or a pass-through to the SPA.
pub mod config;
pub mod ports;
pub mod tracing_setup;
pub mod utils;

pub mod adapters;
pub mod core;

// Re-export the specific types needed by the binary crate
pub use crate::{
    adapters::{FileSystemAdapter, HttpClientAdapter, HttpHandler},
    core::GatewayService,
    ports::http_client::HttpClient,
    utils::GracefulShutdown,
};
