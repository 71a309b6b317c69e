//! Users service CLI server
//!
//! ```sh
//! # Run with default config (~/.config/users-service/config.toml)
//! users-service
//!
//! # Custom config path and port
//! users-service --config /etc/users-service/config.toml --port 8080
//!
//! # Validate config without starting
//! users-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use users_service::config::AppConfig;
use users_service::server::{init_tracing, ServerHandle, ServerOptions};

/// Users service: registration, login and user management over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "users-service",
    version,
    about = "User registration and JWT authentication service",
    long_about = "Users service: JSON HTTP API for registering users, \
                  issuing JWTs and managing accounts.\n\n\
                  Default config: ~/.config/users-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "USERS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Do not install the Prometheus recorder or mount /metrics.
    #[arg(long)]
    no_metrics: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .unwrap_or_else(users_service::default_config_path);

    let loaded = AppConfig::load(&config_path);

    if cli.check {
        let mut config = loaded?;
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        println!("✅ Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Address     : {}", config.address());
        println!("   Token TTL   : {}h", config.security.jwt_expiration_hours);
        println!("   bcrypt cost : {}", config.security.bcrypt_cost);
        println!("   Log level   : {}", config.logging.level);
        if config.uses_default_secret() {
            println!("   ⚠️  JWT secret is the built-in default");
        }
        return Ok(());
    }

    let mut config = match loaded {
        Ok(mut cfg) => {
            if let Some(ref level) = cli.log_level {
                cfg.logging.level = level.clone();
            }
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let mut cfg = AppConfig::default();
            if let Some(ref level) = cli.log_level {
                cfg.logging.level = level.clone();
            }
            init_tracing(&cfg);
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
            cfg
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        enable_metrics: !cli.no_metrics,
    })
    .await?;

    handle.install_signal_handler();

    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
