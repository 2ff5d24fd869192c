pub mod openapi;
pub mod routes;

use axum::Router;
use bb_core::{BackboardError, StateStore};
use bb_db::DbStore;
use bb_db::schema;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub db_path: PathBuf,
    pub states: Arc<StateStore>,
}

/// Opens a connection for the current request. Connections are not shared
/// between handlers.
pub fn open_store(state: &AppState) -> Result<DbStore, BackboardError> {
    let conn = schema::open_and_migrate(&state.db_path).map_err(|err| BackboardError::Internal {
        message: err.to_string(),
    })?;
    Ok(DbStore::new(conn))
}

pub fn app(state: AppState) -> Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app(state)).await
}
