use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use eyre::{Context, Result};

use crate::config::models::ServerConfig;

/// Prefix for environment overrides, e.g. `SITEGATE__BACKEND__TIMEOUT=3s`
pub const ENV_PREFIX: &str = "SITEGATE";

/// Load configuration from an optional file plus `SITEGATE__*` overrides.
/// Supports multiple formats: TOML, YAML, JSON, etc.
pub async fn load_config(config_path: &str, required: bool) -> Result<ServerConfig> {
    load_config_sync(config_path, required)
}

/// Load configuration synchronously
pub fn load_config_sync(config_path: &str, required: bool) -> Result<ServerConfig> {
    load_config_with_env(config_path, required, default_environment())
}

/// The process environment source used by [`load_config_sync`].
pub fn default_environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("backend.origin_env")
        .with_list_parse_key("bot_detection.extra_signatures")
        .with_list_parse_key("bot_detection.reserved_prefixes")
}

/// Load configuration layering defaults, the file (if present) and `env`.
pub fn load_config_with_env(
    config_path: &str,
    required: bool,
    env: Environment,
) -> Result<ServerConfig> {
    let path = Path::new(config_path);

    // Determine file format based on extension
    let format = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => FileFormat::Yaml,
        Some("json") => FileFormat::Json,
        Some("ini") => FileFormat::Ini,
        _ => FileFormat::Toml, // Default to TOML
    };

    let path_str = path
        .to_str()
        .ok_or_else(|| eyre::eyre!("Invalid UTF-8 path: {}", path.display()))?;

    if !required && !path.exists() {
        tracing::debug!(
            "No config file at {}, using defaults and environment",
            path.display()
        );
    }

    let settings = Config::builder()
        .add_source(File::new(path_str, format).required(required))
        .add_source(env)
        .build()
        .with_context(|| format!("Failed to build config from {}", path.display()))?;

    let server_config: ServerConfig = settings
        .try_deserialize()
        .with_context(|| format!("Failed to deserialize config from {}", path.display()))?;

    Ok(server_config)
}
