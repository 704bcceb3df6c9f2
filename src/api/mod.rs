//! REST API over the loss pipeline.
//!
//! Provides two endpoints:
//! - `POST /loss`: compute a loss for the server defaults overridden by the
//!   JSON body
//! - `GET /presets`: built-in studies and the timezone menu

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::config::StudyConfig;

pub use types::{ErrorResponse, LossQuery, LossResponse};

/// Immutable application state shared across all request handlers.
///
/// Every request builds its own pipeline request from these defaults, so
/// no locks are needed.
pub struct AppState {
    /// Study used for every field a request leaves out.
    pub defaults: StudyConfig,
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/loss", post(handlers::post_loss))
        .route("/presets", get(handlers::get_presets))
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `addr` - Socket address to bind to
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
