//! Core gateway orchestration service.
//!
//! The `GatewayService` ties the classifier and the forwarder to the resolved
//! backend origin. It consumes plain request data and produces a neutral
//! [`Outcome`], so any server adapter can host it:
//! * Classify the request
//! * Forward API and feed routes, or try a bot render
//! * Degrade every failure to an explicit response or a pass-through
//!
//! The service holds no mutable state and is shared behind an `Arc`.
use std::sync::Arc;

use crate::{
    core::{
        classifier::{Decision, RequestClassifier},
        error::GatewayError,
        forwarder::{BotRender, Forwarder, ProxyResponse},
        origin::BackendOrigin,
    },
    ports::http_client::HttpClient,
};

/// The parts of an inbound request the gateway looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct InboundRequest<'a> {
    pub path: &'a str,
    /// Raw query string without the leading `?`
    pub query: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

impl<'a> InboundRequest<'a> {
    pub fn new(path: &'a str, query: Option<&'a str>, user_agent: Option<&'a str>) -> Self {
        Self {
            path,
            query,
            user_agent,
        }
    }
}

/// What the hosting adapter should do with the request.
#[derive(Debug)]
pub enum Outcome {
    /// Send this response
    Respond {
        decision: &'static str,
        response: ProxyResponse,
    },
    /// Let the SPA shell handle it
    PassThrough,
}

/// Central orchestrator for classification and forwarding.
///
/// Construct with [`GatewayService::new`]. An absent origin is not an error
/// at construction time: each request then takes the configuration-missing
/// path instead.
pub struct GatewayService {
    classifier: RequestClassifier,
    forwarder: Forwarder,
    origin: Option<BackendOrigin>,
}

impl GatewayService {
    pub fn new(
        classifier: RequestClassifier,
        client: Arc<dyn HttpClient>,
        origin: Option<BackendOrigin>,
    ) -> Self {
        Self {
            classifier,
            forwarder: Forwarder::new(client),
            origin,
        }
    }

    /// Gateway with the built-in route table, signatures and reserved prefixes.
    pub fn with_defaults(client: Arc<dyn HttpClient>, origin: Option<BackendOrigin>) -> Self {
        Self::new(RequestClassifier::default(), client, origin)
    }

    pub fn origin(&self) -> Option<&BackendOrigin> {
        self.origin.as_ref()
    }

    pub fn classifier(&self) -> &RequestClassifier {
        &self.classifier
    }

    /// Handle one request. Never fails: every branch ends in a response or a
    /// pass-through.
    pub async fn handle(&self, req: &InboundRequest<'_>) -> Outcome {
        let decision = self.classifier.classify(req.path, req.query, req.user_agent);
        tracing::debug!(
            path = req.path,
            decision = decision.label(),
            "Classified request"
        );
        let label = decision.label();

        match decision {
            Decision::PassThrough => Outcome::PassThrough,
            Decision::ApiForward(route) => {
                let response = match &self.origin {
                    Some(origin) => self.forwarder.forward_api(origin, &route).await,
                    None => {
                        tracing::error!(
                            "API request for {} but backend origin is not configured",
                            req.path
                        );
                        Forwarder::api_error(&GatewayError::ConfigMissing)
                    }
                };
                Outcome::Respond {
                    decision: label,
                    response,
                }
            }
            Decision::FeedForward(feed) => {
                let response = match &self.origin {
                    Some(origin) => self.forwarder.forward_feed(origin, feed).await,
                    None => {
                        tracing::error!(
                            "Feed request for {} but backend origin is not configured",
                            feed
                        );
                        Forwarder::feed_error(feed, &GatewayError::ConfigMissing)
                    }
                };
                Outcome::Respond {
                    decision: label,
                    response,
                }
            }
            Decision::BotRender(slug) => {
                let Some(origin) = &self.origin else {
                    tracing::warn!(
                        "Bot render skipped for '{}': backend origin not configured",
                        slug
                    );
                    return Outcome::PassThrough;
                };
                match self.forwarder.render_bot(origin, &slug).await {
                    BotRender::Rendered(response) => Outcome::Respond {
                        decision: label,
                        response,
                    },
                    BotRender::NotFound(status) => {
                        tracing::info!(
                            "No pre-rendered page for '{}' (upstream {}), serving SPA",
                            slug,
                            status
                        );
                        Outcome::PassThrough
                    }
                    BotRender::Failed(e) => {
                        tracing::warn!("Bot render for '{}' failed: {}, serving SPA", slug, e);
                        Outcome::PassThrough
                    }
                }
            }
        }
    }
}
