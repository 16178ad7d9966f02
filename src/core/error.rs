use hyper::StatusCode;
use thiserror::Error;

use crate::ports::http_client::HttpClientError;

/// Failure taxonomy for a single forwarded request.
///
/// None of these ever reach the hosting server as a fault: the gateway turns
/// each one into an explicit response or a pass-through.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GatewayError {
    /// No backend origin was configured
    #[error(
        "VITE_CONVEX_URL not set. Set backend.cloud_url or the VITE_CONVEX_URL / CONVEX_URL environment variable."
    )]
    ConfigMissing,

    /// The backend answered with a non-2xx status
    #[error("Upstream returned status {status}")]
    UpstreamNonSuccess { status: StatusCode },

    /// The backend could not be reached (including timeouts)
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(#[from] HttpClientError),
}

impl GatewayError {
    /// Status to answer with for API and feed routes.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::ConfigMissing => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::UpstreamNonSuccess { status } => *status,
            GatewayError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::ConfigMissing.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::UpstreamNonSuccess {
                status: StatusCode::NOT_FOUND
            }
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::from(HttpClientError::Timeout(Duration::from_secs(5))).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_config_missing_names_the_variable() {
        assert!(
            GatewayError::ConfigMissing
                .to_string()
                .starts_with("VITE_CONVEX_URL not set.")
        );
    }
}
