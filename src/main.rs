// Define data modules
mod models;   // Data structures (UserStats, Task, AppSettings, etc.)
mod error;    // AppError and its HTTP mapping
mod clock;    // Current time / calendar day
mod store;    // Key-value persistence (one JSON file per record)
mod logic;    // Day keys, streaks, list helpers, CSV
mod stats;    // Focus statistics store
mod tasks;    // Task list store
mod settings; // Timer and sound settings store
mod config;   // Command-line / environment configuration
mod app;      // Shared state and router
mod routes_stats;    // HTTP handlers for stats
mod routes_tasks;    // HTTP handlers for tasks
mod routes_settings; // HTTP handlers for settings

use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::app::AppState;
use crate::clock::SystemClock;
use crate::config::Config;
use crate::store::{JsonDirStore, KeyValueStore, MemoryStore};

// Log level: --debug, else RUST_LOG, else info
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("pomodoro_tracker=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pomodoro_tracker=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    init_tracing(config.debug);

    let kv: Arc<dyn KeyValueStore> = if config.ephemeral {
        tracing::warn!("ephemeral mode: nothing will be written to disk");
        Arc::new(MemoryStore::new())
    } else {
        let dir = JsonDirStore::new(&config.data_dir);
        tracing::info!("Data dir:     {}", dir.dir().display());
        Arc::new(dir)
    };
    let state = AppState::load(kv, Arc::new(SystemClock));
    let app = app::router(state, &config.static_dir);

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %config.addr, error = %e, "bind failed");
            return ExitCode::FAILURE;
        }
    };

    // Print the link to the server
    tracing::info!("Server running at http://{}", config.addr);
    tracing::info!("Static files: {}", config.static_dir.display());
    tracing::info!("API base:     http://{}/api", config.addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
