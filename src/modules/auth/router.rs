use crate::state::AppState;
use axum::{Router, routing::get};

use super::controller::{login, login_page, logout, register, register_page};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register/", get(register_page).post(register))
        .route("/login/", get(login_page).post(login))
        .route("/logout/", get(logout).post(logout))
}
