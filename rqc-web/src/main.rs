//! Requirement classifier web service (rqc-web) - Main entry point
//!
//! Loads configuration and the model artifact, opens the history database
//! and serves the HTML interface and JSON API until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rqc_common::config::{load_toml_config, ConfigOverrides, Settings};
use rqc_common::db::init_database_pool;
use rqc_common::model::load_model;
use rqc_web::{build_router, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for rqc-web
#[derive(Parser, Debug)]
#[command(name = "rqc-web")]
#[command(about = "Classifies software requirements as functional or non-functional")]
#[command(version)]
struct Args {
    /// Config file (default: <config_dir>/rqc/config.toml when present)
    #[arg(short, long, env = "RQC_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind to
    #[arg(long, env = "RQC_BIND")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "RQC_PORT")]
    port: Option<u16>,

    /// Model artifact (JSON)
    #[arg(short, long, env = "RQC_MODEL_PATH")]
    model: Option<PathBuf>,

    /// Folder holding the SQLite database
    #[arg(long, env = "RQC_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Require a logged-in user for uploads, predictions and deletions
    #[arg(long, env = "RQC_REQUIRE_LOGIN")]
    require_login: Option<bool>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind_address: self.bind.clone(),
            port: self.port,
            model_path: self.model.clone(),
            data_dir: self.data_dir.clone(),
            require_login: self.require_login,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Read before tracing starts so [logging] level can apply
    let loaded = load_toml_config(args.config.as_deref()).context("Failed to load configuration")?;
    let settings = Settings::resolve(&args.overrides(), &loaded.config);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter(&settings.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Requirement Classifier (rqc-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &loaded.source {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => warn!("No config file found, using defaults with CLI/ENV overrides"),
    }

    // Serving without a model is not an option
    let model = match load_model(&settings.model_path) {
        Ok(model) => model,
        Err(e) => {
            error!("Failed to load model {}: {}", settings.model_path.display(), e);
            return Err(e).context("Model artifact is required");
        }
    };

    let db_path = settings.database_path();
    info!("Database path: {}", db_path.display());
    let pool = init_database_pool(&db_path)
        .await
        .context("Failed to open database")?;
    info!("✓ Database ready");

    if !settings.require_login {
        warn!("Login not required (require_login = false): all endpoints are open");
    }

    let listen_address = settings.listen_address();
    let state = AppState::new(Arc::new(model), pool, settings);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_address)
        .await
        .with_context(|| format!("Failed to bind to {}", listen_address))?;
    info!("rqc-web listening on http://{}", listen_address);
    info!("Health check: http://{}/health", listen_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Expand a bare level ("debug") to this service's targets; pass full
/// directives ("rqc_web=debug,sqlx=warn") through unchanged
fn log_filter(level: &str) -> String {
    if level.contains('=') {
        level.to_string()
    } else {
        format!(
            "rqc_web={0},rqc_common={0},tower_http={0}",
            level.trim()
        )
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
