use crate::state::AppState;
use axum::{Router, routing::get};

use super::controller::{about, contact, home, profile};

pub fn init_pages_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/about/", get(about))
        .route("/contact/", get(contact))
        .route("/profile/", get(profile))
}
