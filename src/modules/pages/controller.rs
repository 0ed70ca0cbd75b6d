use axum::{extract::State, response::Html};
use schoolportal_core::AppError;

use crate::middleware::auth::CurrentSession;
use crate::state::AppState;
use crate::templates::page_context;

pub async fn home(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Html<String>, AppError> {
    state
        .templates
        .render("home.html", &page_context(session.username()))
}

pub async fn about() -> Html<&'static str> {
    Html("<h1>About the Student Portal</h1>")
}

pub async fn contact() -> Html<&'static str> {
    Html("<h1>Contact Us at support@gmail.com")
}

pub async fn profile() -> Html<&'static str> {
    Html("<h1>Student Profile Page</h1>")
}
