//! Car rental reservation service, CLI server
//!
//! ```sh
//! # Run with default config (~/.config/car-rental/config.toml)
//! car-rental
//!
//! # Custom config path
//! car-rental --config /etc/car-rental/config.toml
//!
//! # Throwaway in-memory run on another port
//! car-rental --memory --port 8080
//!
//! # Validate config without starting
//! car-rental --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use car_rental::config::{AppConfig, StorageBackend};
use car_rental::server::{init_tracing, ServerHandle, ServerOptions};

/// Car rental catalogue and reservation server.
#[derive(Parser, Debug)]
#[command(
    name = "car-rental",
    version,
    about = "Vehicle catalogue and reservation service",
    long_about = "REST API for browsing the vehicle catalogue, placing draft \
                  reservations and confirming them without double booking.\n\n\
                  Default config: ~/.config/car-rental/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "RENTAL_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the directory holding cars.json and orders.json.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep all data in memory; nothing is written to disk.
    #[arg(long)]
    memory: bool,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(car_rental::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // Apply the log level override before tracing starts so it takes effect.
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            if cli.check {
                eprintln!("❌ {}", e);
                return Err(e.into());
            }
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }
    if let Some(dir) = cli.data_dir {
        info!("CLI override: data_dir = {}", dir.display());
        config.storage.data_dir = dir;
    }
    if cli.memory {
        info!("CLI override: storage backend = memory");
        config.storage.backend = StorageBackend::Memory;
    }
    if let Some(ref level) = cli.log_level {
        info!("CLI override: log_level = {}", level);
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        config.validate()?;
        println!("✅ Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.address());
        println!("   Storage     : {:?} ({})", config.storage.backend, config.storage.data_dir.display());
        println!(
            "   Rentals     : {}-{} days, drafts kept {}h, sweep every {}s",
            config.reservations.min_days,
            config.reservations.max_days,
            config.reservations.draft_retention_hours,
            config.reservations.sweep_interval_secs
        );
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        ..Default::default()
    })
    .await?;

    handle.install_signal_handler();

    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
