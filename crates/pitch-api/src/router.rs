use std::path::Path;

use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::detail;
use crate::listing;
use crate::middleware::load_session;

/// All page, auth and asset routes, with the session layer applied.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(listing::home))
        .route("/startup/{id}", get(detail::show))
        .route("/auth/signin", get(auth::signin))
        .route("/auth/callback/github", get(auth::callback))
        .route("/auth/signout", post(auth::signout))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(middleware::from_fn_with_state(state.clone(), load_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
