//! # Depot API server
//!
//! ```text
//! load config ──► init tracing ──► open SQLite (migrate) ──► serve :PORT
//!                                                               │
//!                                      SIGINT / SIGTERM ──► drain ──► close pool
//! ```

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{error, info};

use depot_api::{create_router, init_tracing, ApiConfig, AppState};
use depot_db::Database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env first so its RUST_LOG reaches the subscriber
    dotenvy::dotenv().ok();
    init_tracing();
    info!("Starting Depot API server...");

    let config = ApiConfig::load()?;
    info!(
        port = config.port,
        db_path = %config.database_path.display(),
        max_connections = config.db_max_connections,
        "Configuration loaded"
    );

    // Open database; migrations run on connect
    let db = Database::new(config.db_config()).await?;
    info!("Database ready");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(db.clone(), config);
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
