use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use schoolportal_core::AppError;
use schoolportal_models::auth::{INVALID_LOGIN, safe_next_path};
use schoolportal_models::{FormErrors, LoginForm, RegisterForm};
use tracing::instrument;

use crate::middleware::auth::{CurrentSession, end_session, start_session};
use crate::modules::auth::model::{
    LOGIN_FORM_FIELDS, NextQuery, REGISTER_FORM_FIELDS, RegisterError,
};
use crate::modules::auth::service::AuthService;
use crate::state::AppState;
use crate::templates::{errors_context, page_context};
use crate::validator::FormData;

fn render_register(
    state: &AppState,
    session: &CurrentSession,
    form: &RegisterForm,
    errors: &FormErrors,
) -> Result<Html<String>, AppError> {
    let mut context = page_context(session.username());
    context.insert("form", form);
    context.insert("errors", &errors_context(errors, &REGISTER_FORM_FIELDS));
    state.templates.render("register.html", &context)
}

fn render_login(
    state: &AppState,
    session: &CurrentSession,
    form: &LoginForm,
    errors: &FormErrors,
) -> Result<Html<String>, AppError> {
    let mut context = page_context(session.username());
    context.insert("form", &serde_json::json!({
        "username": form.username,
        "next": form.next.as_deref().unwrap_or_default(),
    }));
    context.insert("errors", &errors_context(errors, &LOGIN_FORM_FIELDS));
    state.templates.render("login.html", &context)
}

#[instrument(skip(state))]
pub async fn register_page(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Html<String>, AppError> {
    render_register(&state, &session, &RegisterForm::default(), &FormErrors::new())
}

#[instrument(skip(state, jar, form))]
pub async fn register(
    State(state): State<AppState>,
    session: CurrentSession,
    jar: CookieJar,
    FormData(form): FormData<RegisterForm>,
) -> Result<Response, AppError> {
    match AuthService::register(&state.db, &form).await {
        Ok(account) => {
            let jar = start_session(jar, &state.session_config, account.id, &account.username)?;
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(RegisterError::Invalid(errors)) => {
            Ok(render_register(&state, &session, &form, &errors)?.into_response())
        }
        Err(RegisterError::Failed(e)) => Err(e),
    }
}

#[instrument(skip(state))]
pub async fn login_page(
    State(state): State<AppState>,
    session: CurrentSession,
    Query(query): Query<NextQuery>,
) -> Result<Html<String>, AppError> {
    let form = LoginForm {
        next: query.next,
        ..Default::default()
    };
    render_login(&state, &session, &form, &FormErrors::new())
}

#[instrument(skip(state, jar, form))]
pub async fn login(
    State(state): State<AppState>,
    session: CurrentSession,
    jar: CookieJar,
    FormData(form): FormData<LoginForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate_fields() {
        return Ok(render_login(&state, &session, &form, &errors)?.into_response());
    }

    let Some(account) = AuthService::login(&state.db, &form).await? else {
        let mut errors = FormErrors::new();
        errors.add_non_field(INVALID_LOGIN);
        return Ok(render_login(&state, &session, &form, &errors)?.into_response());
    };

    let jar = start_session(jar, &state.session_config, account.id, &account.username)?;
    let target = safe_next_path(form.next.as_deref()).unwrap_or("/");

    Ok((jar, Redirect::to(target)).into_response())
}

#[instrument(skip(state, jar))]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (end_session(jar, &state.session_config), Redirect::to("/"))
}
