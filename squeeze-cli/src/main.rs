//! Squeeze CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use squeeze_config::{load_config, Config};
use squeeze_core::Pipeline;
use squeeze_gzip::Gzip;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod demo;
mod server;
mod shutdown;

use demo::DemoResponder;
use server::Server;

#[derive(Parser)]
#[command(name = "squeeze")]
#[command(about = "HTTP server with pooled gzip response compression", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Path to configuration file (defaults are used when omitted)
        #[arg(short, long, env = "SQUEEZE_CONFIG")]
        config: Option<PathBuf>,

        /// Log level (trace, debug, info, warn, error)
        #[arg(short, long, default_value = "info")]
        log_level: String,
    },

    /// Validate configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "squeeze.yaml")]
        config: PathBuf,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, log_level } => {
            init_tracing(&log_level)?;

            let config = match config {
                Some(path) => {
                    tracing::info!("Config file: {}", path.display());
                    load_config(path)?
                }
                None => {
                    tracing::info!("No config file given, using defaults");
                    Config::default()
                }
            };

            let gzip = Gzip::new(config.gzip.level, config.gzip.to_options()?)?;
            tracing::info!(
                listen = %config.server.listen,
                level = %gzip.level(),
                prewarmed = gzip.pool().idle(),
                "Configuration loaded"
            );

            let pipeline = Pipeline::builder()
                .with(gzip)
                .with(DemoResponder)
                .build();

            let server = Server::new(
                config.server.listen,
                pipeline,
                config.server.max_body_size,
            );
            tokio::spawn(server.shutdown_signal().listen_for_signals());

            server.run().await?;
            Ok(())
        }

        Commands::Validate { config } => {
            tracing_subscriber::fmt().with_target(false).init();

            tracing::info!("Validating configuration: {}", config.display());

            match load_config(&config) {
                Ok(cfg) => {
                    tracing::info!("✓ Configuration is valid");
                    tracing::info!("  Listen: {}", cfg.server.listen);
                    tracing::info!("  Level: {}", cfg.gzip.level);
                    tracing::info!("  Excluded extensions: {}", cfg.gzip.excluded_extensions.len());
                    tracing::info!("  Excluded paths: {}", cfg.gzip.excluded_paths.len());
                    tracing::info!(
                        "  Excluded path patterns: {}",
                        cfg.gzip.excluded_path_regexes.len()
                    );
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("✗ Configuration validation failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Version => {
            println!("Squeeze");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true),
        )
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(filter.into())
                .add_directive("hyper=info".parse()?),
        )
        .init();

    Ok(())
}
