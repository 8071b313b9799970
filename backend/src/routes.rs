use std::path::Path;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::{handlers, request_context::trace_request, state::AppState};

pub fn create_router(state: AppState, images_dir: &Path) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/views/:view_id", get(handlers::listing_view))
        .route("/views/:view_id/more", post(handlers::load_more))
        .route("/post/:slug", get(handlers::article))
        .route("/healthz", get(handlers::healthz))
        .nest_service("/images", ServeDir::new(images_dir))
        .with_state(state)
        .layer(middleware::from_fn(trace_request))
}
