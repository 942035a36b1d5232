//! Adrelay - relays ad extension requests to a Convex backend
//!
//! This is the main entry point for the adrelay CLI.

use std::net::SocketAddr;
use std::sync::Arc;

use adrelay_api::AppState;
use adrelay_convex::ConvexHttpClient;
use adrelay_core::config::{ConfigLoader, LogFormat, LoggingConfig, RelayConfig};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(target_os = "linux")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Adrelay - extend ads through the backend mutation API
#[derive(Parser)]
#[command(name = "adrelay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay server
    Run {
        /// Path to a TOML or JSON config file
        #[arg(short, long)]
        config: Option<String>,

        /// Address to listen on, overrides the config file
        #[arg(long)]
        listen: Option<String>,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the config file
        config: String,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, listen } => {
            let mut relay_config = match ConfigLoader::load_or_default(config.as_deref()) {
                Ok(c) => c,
                Err(e) => {
                    init_tracing(&LoggingConfig::default(), cli.verbose);
                    tracing::error!("❌ Failed to load config: {}", e);
                    std::process::exit(1);
                }
            };
            init_tracing(&relay_config.logging, cli.verbose);

            if cli.verbose {
                tracing::info!("Verbose mode enabled");
            }

            if let Some(listen) = listen {
                relay_config.server.listen = listen;
            }

            run_server(relay_config)?;
        }

        Commands::Validate { config } => {
            let result = ConfigLoader::load(&config).and_then(|c| {
                let url = c.backend.resolve_url()?;
                ConvexHttpClient::new(&url)?;
                Ok(c)
            });

            match result {
                Ok(c) => {
                    println!("✅ Configuration '{}' is valid!", config);
                    println!("   listen: {}", c.server.listen);
                }
                Err(e) => {
                    eprintln!("❌ Configuration Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Version => {
            println!("Adrelay v{}", adrelay_core::VERSION);
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Logs go to stderr, stdout is left to command output
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Pretty => registry.with(fmt_layer).init(),
        LogFormat::Compact => registry.with(fmt_layer.compact()).init(),
    }
}

fn run_server(config: RelayConfig) -> anyhow::Result<()> {
    tracing::info!("🚀 Starting Adrelay v{}", adrelay_core::VERSION);

    // The backend client must exist before any request is accepted
    let client = match config
        .backend
        .resolve_url()
        .and_then(|url| ConvexHttpClient::with_client_id(&url, config.backend.client_id.clone()))
    {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("❌ {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("🔗 Backend: {}", client.url());

    let addr: SocketAddr = match config.server.listen.parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("❌ Invalid listen address '{}': {}", config.server.listen, e);
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(Arc::new(client), config.server.max_body_size));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let listener = adrelay_api::server::bind(addr).await?;
        adrelay_api::run_server(listener, state, shutdown_signal()).await
    })?;

    tracing::info!("👋 Adrelay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_run_with_overrides() {
        let cli = Cli::try_parse_from(["adrelay", "-v", "run", "--listen", "0.0.0.0:8080"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Run { config, listen } => {
                assert!(config.is_none());
                assert_eq!(listen.as_deref(), Some("0.0.0.0:8080"));
            }
            _ => panic!("expected run"),
        }
    }
}
