//! # livepipe
//!
//! Reaction server binary: loads settings, initializes telemetry, opens the
//! store and serves the HTTP API until ctrl-c.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use livepipe_hydrate::ReactionService;
use livepipe_server::{LivepipeServer, ServerConfig, SqliteSessionVerifier};
use livepipe_settings::{load_settings_from_path, settings_path, LivepipeSettings};
use livepipe_store::{run_migrations, ConnectionConfig, ConnectionPool, ConnectionProvider};
use livepipe_telemetry::{init_telemetry, TelemetryConfig};
use tracing::{info, warn};

const IN_MEMORY_PATH: &str = ":memory:";

/// Livestream reaction server.
#[derive(Parser, Debug)]
#[command(name = "livepipe", about = "Livestream reaction server")]
struct Cli {
    /// Settings file (defaults to `~/.livepipe/settings.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to bind (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database, or `:memory:` (overrides settings).
    #[arg(long)]
    db_path: Option<String>,
}

fn load(cli: &Cli) -> Result<LivepipeSettings> {
    let path = cli.config.clone().unwrap_or_else(settings_path);
    let mut settings = load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    if let Some(db_path) = &cli.db_path {
        settings.database.path.clone_from(db_path);
    }
    Ok(settings)
}

fn open_store(settings: &LivepipeSettings) -> Result<ConnectionPool> {
    let db = &settings.database;
    let config = ConnectionConfig {
        pool_size: db.pool_size,
        busy_timeout_ms: db.busy_timeout_ms,
        ..ConnectionConfig::default()
    };

    let pool = if db.path == IN_MEMORY_PATH {
        if config.pool_size != 1 {
            warn!(pool_size = config.pool_size, "in-memory database forces a single connection");
        }
        livepipe_store::new_in_memory(&config)
    } else {
        livepipe_store::new_file(&db.path, &config)
    }
    .with_context(|| format!("Failed to open database at {}", db.path))?;

    let conn = pool.acquire().context("Failed to get DB connection")?;
    let applied = run_migrations(&conn).context("Failed to run migrations")?;
    info!(path = %db.path, applied, "store ready");
    Ok(pool)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load(&cli)?;

    init_telemetry(&TelemetryConfig::from_settings(&settings.logging))
        .context("Failed to initialize telemetry")?;

    let pool = open_store(&settings)?;
    let provider: Arc<dyn ConnectionProvider> = Arc::new(pool);

    let config = ServerConfig::from_settings(&settings.server);
    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;

    let server = LivepipeServer::new(
        config,
        ReactionService::new(provider.clone()),
        Arc::new(SqliteSessionVerifier::new(provider)),
    );

    let shutdown = server.shutdown().clone();
    let _ = tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            return;
        }
        info!("ctrl-c received, shutting down");
        shutdown.shutdown();
    });

    server.serve(listener).await.context("Server error")?;
    Ok(())
}
