//! Configuration data structures for sitegate.
//!
//! These types map directly to TOML (also JSON / YAML) configuration files and
//! to `SITEGATE__*` environment overrides. Every field has a default so that
//! an empty (or absent) config file is valid.
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{
    BackendOrigin, BotDetector, RequestClassifier, RouteTable,
    classifier::DEFAULT_RESERVED_PREFIXES,
};

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_origin_env() -> Vec<String> {
    vec!["VITE_CONVEX_URL".to_string(), "CONVEX_URL".to_string()]
}

fn default_timeout() -> String {
    "5s".to_string()
}

fn default_reserved_prefixes() -> Vec<String> {
    DEFAULT_RESERVED_PREFIXES
        .iter()
        .map(|p| p.to_string())
        .collect()
}

/// Hosted backend settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    /// Cloud URL of the backend (e.g. `https://happy-otter-123.convex.cloud`).
    /// Takes precedence over the environment variables below.
    pub cloud_url: Option<String>,
    /// Environment variables consulted in order when `cloud_url` is unset
    pub origin_env: Vec<String>,
    /// Upstream timeout, parsed by humantime (e.g. "5s", "1500ms")
    pub timeout: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            cloud_url: None,
            origin_env: default_origin_env(),
            timeout: default_timeout(),
        }
    }
}

impl BackendConfig {
    /// Parsed upstream timeout
    pub fn timeout_duration(&self) -> Result<Duration, humantime::DurationError> {
        humantime::parse_duration(&self.timeout)
    }

    /// Resolve the cloud URL from config or the process environment.
    pub fn resolve_cloud_url(&self) -> Option<String> {
        self.resolve_cloud_url_with(|name| std::env::var(name).ok())
    }

    /// Like [`resolve_cloud_url`](Self::resolve_cloud_url) with an injectable lookup.
    pub fn resolve_cloud_url_with<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.cloud_url
            .iter()
            .cloned()
            .chain(self.origin_env.iter().filter_map(|name| lookup(name)))
            .map(|url| url.trim().to_string())
            .find(|url| !url.is_empty())
    }

    /// The derived HTTP origin, if any cloud URL is available.
    pub fn resolve_origin(&self) -> Option<BackendOrigin> {
        self.resolve_cloud_url()
            .map(|url| BackendOrigin::derive(&url))
    }
}

/// Crawler detection settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BotDetectionConfig {
    /// Signatures appended to the built-in list (matched case-insensitively)
    pub extra_signatures: Vec<String>,
    /// First path segments that are never treated as content slugs
    pub reserved_prefixes: Vec<String>,
}

impl Default for BotDetectionConfig {
    fn default() -> Self {
        Self {
            extra_signatures: Vec::new(),
            reserved_prefixes: default_reserved_prefixes(),
        }
    }
}

/// Single-page app shell served for pass-through requests
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SpaConfig {
    /// Build output directory
    pub root: String,
    /// Fallback document for client-side routes
    pub index_file: String,
}

impl Default for SpaConfig {
    fn default() -> Self {
        Self {
            root: "./dist".to_string(),
            index_file: "index.html".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive; `RUST_LOG` wins when set
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub bot_detection: BotDetectionConfig,
    #[serde(default)]
    pub spa: SpaConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Create a new server configuration builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Build the request classifier described by this configuration
    pub fn classifier(&self) -> RequestClassifier {
        RequestClassifier::new(
            RouteTable::default(),
            BotDetector::with_signatures(&self.bot_detection.extra_signatures),
            &self.bot_detection.reserved_prefixes,
        )
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            backend: BackendConfig::default(),
            bot_detection: BotDetectionConfig::default(),
            spa: SpaConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Builder for ServerConfig to allow for cleaner configuration creation
#[derive(Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Set the listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the backend cloud URL
    pub fn cloud_url(mut self, url: impl Into<String>) -> Self {
        self.config.backend.cloud_url = Some(url.into());
        self
    }

    /// Set the upstream timeout (humantime syntax)
    pub fn timeout(mut self, timeout: impl Into<String>) -> Self {
        self.config.backend.timeout = timeout.into();
        self
    }

    /// Replace the environment variables consulted for the origin
    pub fn origin_env<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.backend.origin_env = names.into_iter().map(Into::into).collect();
        self
    }

    /// Add a crawler signature
    pub fn bot_signature(mut self, signature: impl Into<String>) -> Self {
        self.config
            .bot_detection
            .extra_signatures
            .push(signature.into());
        self
    }

    /// Set the SPA build directory and index file
    pub fn spa(mut self, root: impl Into<String>, index_file: impl Into<String>) -> Self {
        self.config.spa = SpaConfig {
            root: root.into(),
            index_file: index_file.into(),
        };
        self
    }

    pub fn logging(mut self, level: impl Into<String>, format: LogFormat) -> Self {
        self.config.logging = LoggingConfig {
            level: level.into(),
            format,
        };
        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.backend.origin_env, ["VITE_CONVEX_URL", "CONVEX_URL"]);
        assert_eq!(
            config.backend.timeout_duration().unwrap(),
            Duration::from_secs(5)
        );
        assert_eq!(config.spa.root, "./dist");
        assert!(
            config
                .bot_detection
                .reserved_prefixes
                .contains(&"images".to_string())
        );
    }

    #[test]
    fn test_cloud_url_precedence() {
        let env: HashMap<&str, &str> = [
            ("VITE_CONVEX_URL", "https://from-vite.convex.cloud"),
            ("CONVEX_URL", "https://from-plain.convex.cloud"),
        ]
        .into_iter()
        .collect();
        let lookup = |name: &str| env.get(name).map(|v| v.to_string());

        let explicit = ServerConfig::builder()
            .cloud_url("https://explicit.convex.cloud")
            .build();
        assert_eq!(
            explicit.backend.resolve_cloud_url_with(lookup).as_deref(),
            Some("https://explicit.convex.cloud")
        );

        let from_env = ServerConfig::default();
        assert_eq!(
            from_env.backend.resolve_cloud_url_with(lookup).as_deref(),
            Some("https://from-vite.convex.cloud")
        );

        let fallback = ServerConfig::builder().origin_env(["MISSING", "CONVEX_URL"]).build();
        assert_eq!(
            fallback.backend.resolve_cloud_url_with(lookup).as_deref(),
            Some("https://from-plain.convex.cloud")
        );
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = ServerConfig::builder().cloud_url("   ").build();
        let lookup = |name: &str| (name == "CONVEX_URL").then(|| String::new());
        assert_eq!(config.backend.resolve_cloud_url_with(lookup), None);
    }

    #[test]
    fn test_classifier_uses_extra_signatures() {
        let config = ServerConfig::builder().bot_signature("MastodonPreview").build();
        let classifier = config.classifier();
        assert!(classifier.bot_detector().is_bot(Some("mastodonpreview/4.2")));
    }
}
