use eyre::{Result, WrapErr};
use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::models::LogFormat;

/// Build the filter: `RUST_LOG` when set, otherwise the configured level.
fn env_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).wrap_err_with(|| format!("Invalid log level: {level}")),
    }
}

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync + 'static>;

/// Assemble the subscriber for the configured level and output format.
fn build_subscriber(level: &str, format: LogFormat) -> Result<BoxedSubscriber> {
    let env_filter = env_filter(level)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let subscriber: BoxedSubscriber = match format {
        LogFormat::Json => Box::new(
            Registry::default().with(env_filter).with(
                fmt_layer
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            ),
        ),
        LogFormat::Pretty => Box::new(
            Registry::default()
                .with(env_filter)
                .with(fmt_layer.pretty().with_ansi(true)),
        ),
    };
    Ok(subscriber)
}

/// Initialize tracing with the configured level and output format
pub fn init_tracing_with_config(level: &str, format: LogFormat) -> Result<()> {
    build_subscriber(level, format)?
        .try_init()
        .wrap_err("Failed to install tracing subscriber")?;

    tracing::info!(
        "sitegate logging initialized (level: {}, format: {:?})",
        level,
        format
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(env_filter("sitegate=verbose").is_err());
            assert!(build_subscriber("sitegate=verbose", LogFormat::Json).is_err());
        }
    }

    #[test]
    fn test_subscriber_honours_configured_level() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }

        for format in [LogFormat::Json, LogFormat::Pretty] {
            let subscriber = build_subscriber("warn", format).unwrap();
            tracing::subscriber::with_default(subscriber, || {
                assert!(tracing::enabled!(Level::WARN));
                assert!(!tracing::enabled!(Level::INFO));
            });
        }

        // The scoped subscriber is gone again
        let subscriber = build_subscriber("debug", LogFormat::Json).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(Level::DEBUG));
            assert!(!tracing::enabled!(Level::TRACE));
        });
    }
}
