pub mod health;

use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Screening API
        .route("/api/v1/screenings", post(handlers::handle_create_screening))
        .route(
            "/api/v1/screenings/upload",
            post(handlers::handle_upload_screening),
        )
        .route(
            "/api/v1/screenings/:id",
            get(handlers::handle_get_screening),
        )
        .route(
            "/api/v1/screenings/:id/export",
            get(handlers::handle_export_screening),
        )
        .layer(body_limit)
        .with_state(state)
}
