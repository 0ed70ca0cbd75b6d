use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;

use schoolportal_auth::{create_session_token, verify_session_token};
use schoolportal_config::SessionConfig;
use schoolportal_core::AppError;
use schoolportal_models::AccountId;

use crate::modules::accounts::service::AccountService;
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/login/";

/// The account behind a valid session cookie.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub account_id: AccountId,
    pub username: String,
}

/// Optional caller identity. Never rejects an anonymous request.
///
/// A missing, invalid or expired token, or one naming an account that no
/// longer exists, yields an anonymous session.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<SessionUser>);

impl CurrentSession {
    pub fn username(&self) -> Option<&str> {
        self.0.as_ref().map(|user| user.username.as_str())
    }
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(&state.session_config.cookie_name) else {
            return Ok(Self(None));
        };

        let claims = match verify_session_token(cookie.value(), &state.session_config) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e.error, "Ignoring session cookie");
                return Ok(Self(None));
            }
        };

        let Ok(account_id) = claims.sub.parse::<AccountId>() else {
            return Ok(Self(None));
        };

        let account = AccountService::find_by_id(&state.db, account_id).await?;

        Ok(Self(account.map(|account| SessionUser {
            account_id: account.id,
            username: account.username,
        })))
    }
}

/// Caller identity for pages that need a login.
///
/// Anonymous requests are redirected to the login page with the requested
/// path as `next`.
#[derive(Debug, Clone)]
pub struct RequireSession(pub SessionUser);

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentSession(user) = CurrentSession::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match user {
            Some(user) => Ok(RequireSession(user)),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/");
                Err(login_redirect(next).into_response())
            }
        }
    }
}

/// Redirect to the login page, keeping `/` readable in the `next` parameter.
pub fn login_redirect(next: &str) -> Redirect {
    match serde_urlencoded::to_string([("next", next)]) {
        Ok(query) => Redirect::to(&format!("{}?{}", LOGIN_PATH, query.replace("%2F", "/"))),
        Err(_) => Redirect::to(LOGIN_PATH),
    }
}

/// Adds a session cookie for the account to the jar.
pub fn start_session(
    jar: CookieJar,
    config: &SessionConfig,
    account_id: AccountId,
    username: &str,
) -> Result<CookieJar, AppError> {
    let token = create_session_token(account_id.into_inner(), username, config)?;

    let cookie = Cookie::build((config.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure);

    Ok(jar.add(cookie))
}

/// Removes the session cookie, whether or not one was set.
pub fn end_session(jar: CookieJar, config: &SessionConfig) -> CookieJar {
    jar.remove(Cookie::build((config.cookie_name.clone(), "")).path("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    fn test_session_config() -> SessionConfig {
        SessionConfig {
            secret: "test-secret-key-for-testing-purposes-only".to_string(),
            expiry: 3600,
            cookie_name: "sessionid".to_string(),
            cookie_secure: false,
        }
    }

    #[test]
    fn test_login_redirect_keeps_slashes() {
        let response = login_redirect("/student_list/").into_response();
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/login/?next=/student_list/"
        );
    }

    #[test]
    fn test_login_redirect_encodes_query() {
        let response = login_redirect("/student_list/?a=1&b=2").into_response();
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/login/?next=/student_list/%3Fa%3D1%26b%3D2"
        );
    }

    #[test]
    fn test_start_and_end_session() {
        let config = test_session_config();
        let account_id = AccountId::new();

        let jar = start_session(CookieJar::new(), &config, account_id, "annlee").unwrap();
        let cookie = jar.get("sessionid").unwrap();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));

        let claims = verify_session_token(cookie.value(), &config).unwrap();
        assert_eq!(claims.sub, account_id.to_string());

        let jar = end_session(jar, &config);
        assert!(jar.get("sessionid").is_none());
    }
}
