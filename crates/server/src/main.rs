use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skinforge_core::{
    config::{load_config, load_default_config, validate_config},
    JobStore, MojangClient, PackAssembler, PackWorker, SkinResolver, SqliteJobStore,
};

use skinforge_server::api::create_router;
use skinforge_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("skinforge {}", VERSION);

    // Determine config path
    let config_path = std::env::var("SKINFORGE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration (environment overrides still apply without a file)
    let config = if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        info!("No config file at {:?}, using defaults", config_path);
        load_default_config().context("Failed to load default config")?
    };

    validate_config(&config).context("Configuration validation failed")?;

    info!("Database path: {:?}", config.database.path);
    info!("Artifacts path: {:?}", config.storage.artifacts_path);

    // Create SQLite job store
    let store: Arc<dyn JobStore> = Arc::new(
        SqliteJobStore::new(&config.database.path).context("Failed to create job store")?,
    );
    info!("Job store initialized");

    // Create Mojang client and resolver
    let mojang = Arc::new(
        MojangClient::new(&config.mojang).context("Failed to create Mojang client")?,
    );
    let resolver = Arc::new(SkinResolver::new(
        mojang,
        std::time::Duration::from_millis(config.mojang.pacing_ms),
    ));
    info!(
        "Skin resolver initialized (pacing: {}ms)",
        config.mojang.pacing_ms
    );

    // Create pack assembler
    let assembler = Arc::new(PackAssembler::new(
        config.storage.artifacts_path.clone(),
        config.pack.item.clone(),
    ));

    // Create and start the generation worker
    let worker = Arc::new(PackWorker::new(
        config.worker.clone(),
        Arc::clone(&store),
        resolver,
        Arc::clone(&assembler),
        config.retention.clone(),
    ));
    worker.start().await;
    info!("Generation worker started");

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        assembler,
        Some(Arc::clone(&worker)),
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    // Stop worker
    info!("Stopping worker...");
    worker.stop().await;
    info!("Worker stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
