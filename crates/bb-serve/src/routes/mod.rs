pub mod comments;
pub mod error;
pub mod exclusions;
pub mod repos;

use crate::{AppState, openapi};
use axum::Router;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(repos::router(state.clone()))
        .merge(exclusions::router(state.clone()))
        .merge(comments::router(state))
        .merge(openapi::router());

    Router::new().nest("/api", api)
}
