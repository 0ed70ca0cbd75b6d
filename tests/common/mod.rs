#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use http_body_util::BodyExt;
use schoolportal::modules::teachers::service::TeacherService;
use schoolportal::router::init_router;
use schoolportal::state::AppState;
use schoolportal_config::{AccountConfig, MediaConfig, SessionConfig};
use schoolportal_models::{Email, NewTeacher, Subject, Teacher};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn test_session_config() -> SessionConfig {
    SessionConfig {
        secret: "test-secret-key-for-testing-purposes-only".to_string(),
        expiry: 3600,
        cookie_name: "sessionid".to_string(),
        cookie_secure: false,
    }
}

pub fn test_media_config() -> MediaConfig {
    MediaConfig {
        root: std::env::temp_dir().join(format!("schoolportal-media-{}", Uuid::new_v4())),
        url: "/media".to_string(),
        max_upload_bytes: 1024,
    }
}

pub fn test_state(pool: PgPool) -> AppState {
    AppState::new(
        pool,
        test_session_config(),
        test_media_config(),
        AccountConfig::default(),
    )
    .unwrap()
}

pub fn setup_test_app(pool: PgPool) -> Router {
    init_router(test_state(pool))
}

pub async fn create_test_teacher(pool: &PgPool, name: &str) -> Teacher {
    let new_teacher = NewTeacher {
        name: name.to_string(),
        subject: Subject::Math,
        email: Email::new(format!("teacher-{}@school.edu", Uuid::new_v4())).unwrap(),
    };
    TeacherService::create_teacher(pool, new_teacher).await.unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, fields: &[(&str, &str)], cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
        .unwrap()
}

pub fn student_fields<'a>(
    name: &'a str,
    age: &'a str,
    grade: &'a str,
    teacher: &'a str,
) -> Vec<(&'static str, &'a str)> {
    vec![
        ("name", name),
        ("age", age),
        ("grade", grade),
        ("teacher", teacher),
    ]
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

/// `name=value` part of the response's Set-Cookie header.
pub fn session_cookie(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("missing Set-Cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

/// Registers a fresh account and returns its session cookie.
pub async fn register_and_login(app: &Router) -> String {
    let username = format!("user{}", &Uuid::new_v4().simple().to_string()[..12]);
    let response = app
        .clone()
        .oneshot(post_form(
            "/register/",
            &[
                ("username", username.as_str()),
                ("email", ""),
                ("password1", TEST_PASSWORD),
                ("password2", TEST_PASSWORD),
            ],
            None,
        ))
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    session_cookie(&response)
}

pub async fn count_students(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM students")
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn account_exists(pool: &PgPool, username: &str) -> bool {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE username = $1)")
        .bind(username)
        .fetch_one(pool)
        .await
        .unwrap()
}
