#![allow(clippy::collapsible_if)]

use std::{net::SocketAddr, time::Duration};

use crate::config::models::{BackendConfig, BotDetectionConfig, ServerConfig, SpaConfig};

/// Validation result type alias
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, thiserror::Error, Clone)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Invalid listen address '{address}': {reason}")]
    InvalidListenAddress { address: String, reason: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

/// Server configuration validator
pub struct ServerConfigValidator;

impl ServerConfigValidator {
    /// Validate the entire server configuration
    pub fn validate(config: &ServerConfig) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_listen_address(&config.listen_addr) {
            errors.push(e);
        }

        errors.extend(Self::validate_backend(&config.backend));
        errors.extend(Self::validate_bot_detection(&config.bot_detection));
        errors.extend(Self::validate_spa(&config.spa));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ValidationFailed {
                message: Self::format_multiple_errors(errors),
            })
        }
    }

    /// Validate listen address format
    fn validate_listen_address(address: &str) -> ValidationResult<()> {
        if address.parse::<SocketAddr>().is_err() {
            return Err(ValidationError::InvalidListenAddress {
                address: address.to_string(),
                reason: "Must be in format 'IP:PORT' (e.g., '127.0.0.1:3000' or '0.0.0.0:8080')"
                    .to_string(),
            });
        }
        Ok(())
    }

    fn validate_backend(backend: &BackendConfig) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if let Some(url) = &backend.cloud_url {
            if let Err(e) = Self::validate_url(url, "backend.cloud_url") {
                errors.push(e);
            }
        }

        match backend.timeout_duration() {
            Ok(d) if d == Duration::ZERO => errors.push(ValidationError::InvalidField {
                field: "backend.timeout".to_string(),
                message: "Upstream timeout must be greater than zero".to_string(),
            }),
            Ok(_) => {}
            Err(e) => errors.push(ValidationError::InvalidField {
                field: "backend.timeout".to_string(),
                message: format!("Invalid duration '{}': {e}", backend.timeout),
            }),
        }

        errors
    }

    fn validate_bot_detection(bots: &BotDetectionConfig) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (i, sig) in bots.extra_signatures.iter().enumerate() {
            if sig.trim().is_empty() {
                errors.push(ValidationError::InvalidField {
                    field: format!("bot_detection.extra_signatures[{i}]"),
                    message: "Signatures must not be blank".to_string(),
                });
            }
        }

        for prefix in &bots.reserved_prefixes {
            if prefix.is_empty() || prefix.contains('/') {
                errors.push(ValidationError::InvalidField {
                    field: "bot_detection.reserved_prefixes".to_string(),
                    message: format!(
                        "Reserved prefix '{prefix}' must be a single non-empty path segment"
                    ),
                });
            }
        }

        errors
    }

    fn validate_spa(spa: &SpaConfig) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if spa.root.trim().is_empty() {
            errors.push(ValidationError::MissingField {
                field: "spa.root".to_string(),
            });
        }
        if spa.index_file.trim().is_empty() {
            errors.push(ValidationError::MissingField {
                field: "spa.index_file".to_string(),
            });
        }
        errors
    }

    /// Validate URL format
    fn validate_url(url_str: &str, context: &str) -> ValidationResult<()> {
        match url::Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    return Err(ValidationError::InvalidField {
                        field: context.to_string(),
                        message: format!(
                            "URL scheme must be 'http' or 'https', got '{}'",
                            url.scheme()
                        ),
                    });
                }

                if url.host().is_none() {
                    return Err(ValidationError::InvalidField {
                        field: context.to_string(),
                        message: "URL must have a valid host".to_string(),
                    });
                }

                Ok(())
            }
            Err(e) => Err(ValidationError::InvalidField {
                field: context.to_string(),
                message: format!("Invalid URL format: {e}"),
            }),
        }
    }

    fn format_multiple_errors(errors: Vec<ValidationError>) -> String {
        if errors.len() == 1 {
            return errors[0].to_string();
        }

        let mut message = format!("Found {} validation errors:\n", errors.len());
        for (i, error) in errors.iter().enumerate() {
            message.push_str(&format!("  {}. {}\n", i + 1, error));
        }
        message
    }
}
