//! `api` crate: HTTP REST API layer.
//!
//! Exposes:
//!   POST   /workers
//!   GET    /workers
//!   GET    /workers/{id}

pub mod dto;
pub mod handlers;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use db::DbPool;
pub use handlers::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/workers",
            get(handlers::workers::list).post(handlers::workers::create),
        )
        .route("/workers/:id", get(handlers::workers::get))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `bind` and serve the API until the process is stopped.
pub async fn serve(bind: &str, pool: DbPool) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!("API listening on {}", listener.local_addr()?);
    axum::serve(listener, router(AppState { pool })).await
}
