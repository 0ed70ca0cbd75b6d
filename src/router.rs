use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::modules::auth::router::init_auth_router;
use crate::modules::pages::router::init_pages_router;
use crate::modules::students::router::init_students_router;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::{Router, middleware};
use tower_http::services::ServeDir;

/// Room for the text fields sent alongside an upload.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn init_router(state: AppState) -> Router {
    let media_path = format!("/{}", state.media_config.url.trim_matches('/'));
    let body_limit = state.media_config.max_upload_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .merge(init_pages_router())
        .merge(init_auth_router())
        .merge(init_students_router())
        .nest_service(&media_path, ServeDir::new(&state.media_config.root))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
