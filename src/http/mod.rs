use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

use crate::AppState;

mod auth;
mod error;
mod handlers;
mod routes;

pub use auth::AuthUser;
pub use error::AppError;

pub fn router(state: AppState) -> Router {
    let upload_max_bytes = state.upload_max_bytes;
    Router::new()
        .merge(routes::health())
        .merge(routes::users())
        .merge(routes::posts())
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(upload_max_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
