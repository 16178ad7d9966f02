pub mod bot_detector;
pub mod classifier;
pub mod error;
pub mod forwarder;
pub mod gateway;
pub mod origin;
pub mod routes;

pub use bot_detector::BotDetector;
pub use classifier::{Decision, RequestClassifier};
pub use error::GatewayError;
pub use forwarder::{BotRender, Forwarder, ProxyResponse};
pub use gateway::{GatewayService, InboundRequest, Outcome};
pub use origin::BackendOrigin;
pub use routes::{ApiRoute, CachePolicy, FeedKind, RouteTable};
