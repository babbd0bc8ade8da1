//! # Depot API
//!
//! REST server for the stock ledger.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Depot API                                       │
//! │                                                                         │
//! │  Admin UI ──► HTTP (5000) ──► TraceLayer ──► CorsLayer ──► Router      │
//! │                                                             │           │
//! │                   Principal (bearer JWT) ◄── mutating ──────┤           │
//! │                                                             ▼           │
//! │                                         StockLedger / Repositories     │
//! │                                                             │           │
//! │                                                             ▼           │
//! │                                                     SQLite (depot.db)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`ApiConfig::load`]):
//! - `PORT` - HTTP port (default: 5000)
//! - `DATABASE_PATH` - SQLite file (default: ./depot.db)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `JWT_SECRET_KEY` - Secret for verifying bearer tokens
//! - `CORS_ALLOWED_ORIGINS` - Comma separated allow-list (default: any)
//! - `DEFAULT_ACTOR` - Fallback `addedBy` (default: admin)
//! - `RUST_LOG` - Log filter

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::extract::FromRef;
use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use depot_db::Database;

pub use auth::{JwtManager, Principal};
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// Wires the JWT verifier from configuration.
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_access_lifetime_secs);
        AppState {
            db,
            jwt: Arc::new(jwt),
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for Arc<JwtManager> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

/// Builds the full application: routes, tracing and CORS.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    routes::routes()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origins = if config.cors_allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(config.cors_allowed_origins.clone())
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,depot=debug,sqlx=warn,tower_http=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
