use std::{net::SocketAddr, path::Path, sync::Arc};

use clap::{Parser, Subcommand};
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use sitegate::{
    adapters::{FileSystemAdapter, HttpClientAdapter, HttpHandler, http_handler},
    config::{ServerConfig, ServerConfigValidator, load_config},
    core::GatewayService,
    ports::http_client::HttpClient,
    tracing_setup,
    utils::GracefulShutdown,
};

const DEFAULT_CONFIG_PATH: &str = "sitegate.toml";

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    #[clap(subcommand)]
    command: Option<Commands>,

    /// Configuration file (optional unless given explicitly)
    #[clap(short, long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gateway server (default)
    Serve,
    /// Validate configuration file
    Validate,
    /// Initialize a new configuration file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let required = args.config.is_some();
    let config_path = args
        .config
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Validate => validate_config_command(&config_path, required).await,
        Commands::Init => init_config_command(&config_path).await,
        Commands::Serve => serve(&config_path, required).await,
    }
}

async fn serve(config_path: &str, required: bool) -> Result<()> {
    let config: ServerConfig = load_config(config_path, required)
        .await
        .with_context(|| format!("Failed to load config from {config_path}"))?;

    tracing_setup::init_tracing_with_config(&config.logging.level, config.logging.format)
        .map_err(|e| eyre!("Failed to initialize tracing: {}", e))?;

    ServerConfigValidator::validate(&config).context("Invalid configuration")?;

    let provider = rustls::crypto::aws_lc_rs::default_provider();
    if let Err(e) = rustls::crypto::CryptoProvider::install_default(provider) {
        tracing::warn!(
            "CryptoProvider::install_default for aws-lc-rs reported an error: {:?}. \
            A provider was probably installed already.",
            e
        );
    } else {
        tracing::info!("Successfully installed aws-lc-rs as the default crypto provider.");
    }

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.listen_addr))?;

    let timeout = config
        .backend
        .timeout_duration()
        .with_context(|| format!("Invalid backend timeout: {}", config.backend.timeout))?;

    let origin = config.backend.resolve_origin();
    match &origin {
        Some(origin) => tracing::info!("Backend origin: {}", origin),
        None => tracing::warn!(
            "No backend cloud URL configured (checked backend.cloud_url and {:?}); \
            API and feed routes will answer 500",
            config.backend.origin_env
        ),
    }

    let http_client: Arc<dyn HttpClient> =
        Arc::new(HttpClientAdapter::new(timeout).context("Failed to create HTTP client adapter")?);
    let gateway_service = Arc::new(GatewayService::new(
        config.classifier(),
        http_client,
        origin,
    ));
    tracing::info!(
        "Bot detection active with {} signatures",
        gateway_service.classifier().bot_detector().signature_count()
    );

    let http_handler = Arc::new(HttpHandler::new(
        gateway_service,
        Arc::new(FileSystemAdapter::new()),
        config.spa.clone(),
    ));
    let app = http_handler::router(http_handler);

    let graceful_shutdown = Arc::new(GracefulShutdown::new());
    {
        let graceful_shutdown = graceful_shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = graceful_shutdown.run_signal_handler().await {
                tracing::error!("Signal handler error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    tracing::info!(
        "sitegate starting on {} (SPA root: {})",
        addr,
        config.spa.root
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let reason = graceful_shutdown.wait_for_shutdown_signal().await;
            tracing::info!("Draining connections ({:?})", reason);
        })
        .await
        .context("Server error")?;

    tracing::info!("Graceful shutdown completed");
    Ok(())
}

async fn validate_config_command(config_path: &str, required: bool) -> Result<()> {
    println!("🔍 Validating configuration: {config_path}");

    if !Path::new(config_path).exists() {
        if required {
            eprintln!("❌ Error: Configuration file '{config_path}' not found");
            std::process::exit(1);
        }
        println!("   (no file found, checking defaults and SITEGATE__* overrides)");
    }

    let config = match load_config(config_path, required).await {
        Ok(config) => {
            println!("✅ Configuration parsing: OK");
            config
        }
        Err(e) => {
            eprintln!("❌ Configuration parsing failed:");
            eprintln!("   {e:#}");
            std::process::exit(1);
        }
    };

    match ServerConfigValidator::validate(&config) {
        Ok(()) => {
            let origin = config.backend.resolve_origin();
            println!("✅ Configuration validation: OK");
            println!();
            println!("📋 Configuration Summary:");
            println!("   • Listen Address: {}", config.listen_addr);
            println!(
                "   • Backend Origin: {}",
                origin
                    .as_ref()
                    .map_or_else(|| "not configured".to_string(), |o| o.to_string())
            );
            println!("   • Upstream Timeout: {}", config.backend.timeout);
            println!(
                "   • Extra Bot Signatures: {}",
                config.bot_detection.extra_signatures.len()
            );
            println!("   • SPA Root: {}", config.spa.root);
            println!();
            if origin.is_none() {
                println!("⚠️  No backend origin: API and feed routes will answer 500");
            }
            println!("🎉 Configuration is valid and ready to use!");
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Configuration validation failed:");
            eprintln!("{e}");
            println!();
            println!("💡 Common fixes:");
            println!("   • Ensure backend.cloud_url starts with http:// or https://");
            println!("   • Verify listen address format (e.g., '127.0.0.1:8080')");
            println!("   • Use humantime durations for backend.timeout (e.g., '5s')");
            std::process::exit(1);
        }
    }
}

/// Initialize a new configuration file
async fn init_config_command(config_path: &str) -> Result<()> {
    let path = Path::new(config_path);
    if path.exists() {
        eprintln!("❌ Error: Configuration file '{config_path}' already exists");
        std::process::exit(1);
    }

    let default_config = r#"# sitegate configuration

# The address to listen on
listen_addr = "127.0.0.1:8080"

[backend]
# Cloud URL of the backend deployment. When unset, the environment
# variables in origin_env are tried in order.
# cloud_url = "https://happy-otter-123.convex.cloud"
origin_env = ["VITE_CONVEX_URL", "CONVEX_URL"]
timeout = "5s"

[bot_detection]
# Extra crawler signatures, matched case-insensitively against User-Agent
extra_signatures = []
reserved_prefixes = ["api", "assets", "_next", "images", "stats", "_sitegate"]

[spa]
root = "./dist"
index_file = "index.html"

[logging]
level = "info"
format = "pretty" # or "json"
"#;

    tokio::fs::write(path, default_config)
        .await
        .context("Failed to write config file")?;
    println!("✅ Created default configuration at: {config_path}");
    println!("   Run 'sitegate serve --config {config_path}' to start the server");
    Ok(())
}
