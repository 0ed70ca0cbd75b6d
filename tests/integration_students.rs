mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{
    account_exists, body_text, count_students, create_test_teacher, get, location, post_form,
    register_and_login, setup_test_app, student_fields, test_state,
};
use schoolportal::router::init_router;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

const AGE_TOO_LOW: &str = "Age must be at least 18.";
const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

async fn student_id(pool: &PgPool, name: &str) -> Uuid {
    sqlx::query_scalar("SELECT id FROM students WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

fn multipart_request(
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> Request<Body> {
    let boundary = "schoolportal-test-boundary";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                boundary, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"profile_picture\"; filename=\"pic\"\r\nContent-Type: {}\r\n\r\n",
                boundary, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_student_and_account(pool: PgPool) {
    let teacher = create_test_teacher(&pool, "Grace Hopper").await;
    let app = setup_test_app(pool.clone());
    let teacher_id = teacher.id.to_string();

    let response = app
        .clone()
        .oneshot(post_form(
            "/student_model_form/",
            &student_fields("Ann Lee", "19", "12", &teacher_id),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/student_list/");
    assert_eq!(count_students(&pool).await, 1);
    assert!(account_exists(&pool, "annlee").await);

    let id = student_id(&pool, "Ann Lee").await;
    let response = app
        .oneshot(get(&format!("/student_detail/{}/", id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Ann Lee"));
    assert!(body.contains(teacher.email.as_str()));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_list_is_ordered_by_name(pool: PgPool) {
    let teacher = create_test_teacher(&pool, "Grace Hopper").await;
    let app = setup_test_app(pool.clone());
    let teacher_id = teacher.id.to_string();

    for name in ["Zoe Young", "Amy Adams", "Mia Moss"] {
        let response = app
            .clone()
            .oneshot(post_form(
                "/student_model_form/",
                &student_fields(name, "20", "11", &teacher_id),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    let cookie = register_and_login(&app).await;
    let response = app
        .oneshot(get("/student_list/", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    let amy = body.find("Amy Adams").unwrap();
    let mia = body.find("Mia Moss").unwrap();
    let zoe = body.find("Zoe Young").unwrap();
    assert!(amy < mia && mia < zoe);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_empty_student_list(pool: PgPool) {
    let app = setup_test_app(pool);
    let cookie = register_and_login(&app).await;

    let response = app
        .oneshot(get("/student_list/", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("No students yet."));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_list_requires_login(pool: PgPool) {
    let teacher = create_test_teacher(&pool, "Grace Hopper").await;
    let app = setup_test_app(pool.clone());

    let response = app
        .clone()
        .oneshot(get("/student_list/", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login/?next=/student_list/");

    app.clone()
        .oneshot(post_form(
            "/student_model_form/",
            &student_fields("Ann Lee", "19", "12", &teacher.id.to_string()),
            None,
        ))
        .await
        .unwrap();
    let id = student_id(&pool, "Ann Lee").await;

    let response = app
        .oneshot(get(&format!("/student_detail/{}/", id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_stale_session_is_anonymous(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let cookie = register_and_login(&app).await;

    sqlx::query("DELETE FROM accounts")
        .execute(&pool)
        .await
        .unwrap();

    let response = app
        .oneshot(get("/student_list/", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_underage_student_is_rejected(pool: PgPool) {
    let teacher = create_test_teacher(&pool, "Grace Hopper").await;
    let app = setup_test_app(pool.clone());

    let response = app
        .oneshot(post_form(
            "/student_model_form/",
            &student_fields("Ann Lee", "17", "12", &teacher.id.to_string()),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(AGE_TOO_LOW));
    assert!(body.contains("value=\"Ann Lee\""));
    assert_eq!(count_students(&pool).await, 0);
    assert!(!account_exists(&pool, "annlee").await);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_teacher_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let response = app
        .oneshot(post_form(
            "/student_model_form/",
            &student_fields("Ann Lee", "17", "12", &Uuid::new_v4().to_string()),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(INVALID_CHOICE));
    assert!(body.contains(AGE_TOO_LOW));
    assert_eq!(count_students(&pool).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_account_collision_rolls_back(pool: PgPool) {
    let teacher = create_test_teacher(&pool, "Grace Hopper").await;
    let app = setup_test_app(pool.clone());
    let teacher_id = teacher.id.to_string();

    let response = app
        .clone()
        .oneshot(post_form(
            "/student_model_form/",
            &student_fields("Ann Lee", "19", "12", &teacher_id),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .oneshot(post_form(
            "/student_model_form/",
            &student_fields("ann lee", "22", "10", &teacher_id),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(body_text(response).await.contains("already exists"));
    assert_eq!(count_students(&pool).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_student(pool: PgPool) {
    let teacher = create_test_teacher(&pool, "Grace Hopper").await;
    let other = create_test_teacher(&pool, "Alan Turing").await;
    let app = setup_test_app(pool.clone());

    app.clone()
        .oneshot(post_form(
            "/student_model_form/",
            &student_fields("Ann Lee", "19", "12", &teacher.id.to_string()),
            None,
        ))
        .await
        .unwrap();
    let id = student_id(&pool, "Ann Lee").await;
    let uri = format!("/update_student/{}/", id);

    let response = app.clone().oneshot(get(&uri, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("value=\"Ann Lee\""));

    let response = app
        .oneshot(post_form(
            &uri,
            &student_fields("Ann Smith", "20", "12B", &other.id.to_string()),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let (name, age, teacher_id): (String, i32, Uuid) =
        sqlx::query_as("SELECT name, age, teacher_id FROM students WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(name, "Ann Smith");
    assert_eq!(age, 20);
    assert_eq!(teacher_id, other.id.into_inner());

    // Update never touches accounts.
    assert!(account_exists(&pool, "annlee").await);
    assert!(!account_exists(&pool, "annsmith").await);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_underage_update_is_rejected(pool: PgPool) {
    let teacher = create_test_teacher(&pool, "Grace Hopper").await;
    let app = setup_test_app(pool.clone());
    let teacher_id = teacher.id.to_string();

    app.clone()
        .oneshot(post_form(
            "/student_model_form/",
            &student_fields("Ann Lee", "19", "12", &teacher_id),
            None,
        ))
        .await
        .unwrap();
    let id = student_id(&pool, "Ann Lee").await;

    let response = app
        .oneshot(post_form(
            &format!("/update_student/{}/", id),
            &student_fields("Ann Lee", "16", "12", &teacher_id),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(AGE_TOO_LOW));

    let age: i32 = sqlx::query_scalar("SELECT age FROM students WHERE id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(age, 19);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_student_removes_account(pool: PgPool) {
    let teacher = create_test_teacher(&pool, "Grace Hopper").await;
    let app = setup_test_app(pool.clone());

    app.clone()
        .oneshot(post_form(
            "/student_model_form/",
            &student_fields("Ann Lee", "19", "12", &teacher.id.to_string()),
            None,
        ))
        .await
        .unwrap();
    let id = student_id(&pool, "Ann Lee").await;
    let uri = format!("/delete_student/{}", id);

    let response = app.clone().oneshot(get(&uri, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Delete Ann Lee?"));
    assert_eq!(count_students(&pool).await, 1);

    let response = app.oneshot(post_form(&uri, &[], None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/student_list/");
    assert_eq!(count_students(&pool).await, 0);
    assert!(!account_exists(&pool, "annlee").await);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_renamed_student_tolerates_missing_account(pool: PgPool) {
    let teacher = create_test_teacher(&pool, "Grace Hopper").await;
    let app = setup_test_app(pool.clone());
    let teacher_id = teacher.id.to_string();

    app.clone()
        .oneshot(post_form(
            "/student_model_form/",
            &student_fields("Ann Lee", "19", "12", &teacher_id),
            None,
        ))
        .await
        .unwrap();
    let id = student_id(&pool, "Ann Lee").await;

    app.clone()
        .oneshot(post_form(
            &format!("/update_student/{}/", id),
            &student_fields("Ann Smith", "19", "12", &teacher_id),
            None,
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(post_form(&format!("/delete_student/{}", id), &[], None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(count_students(&pool).await, 0);
    // The account follows the original name, so it outlives the student.
    assert!(account_exists(&pool, "annlee").await);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_student_is_not_found(pool: PgPool) {
    let app = setup_test_app(pool);
    let missing = Uuid::new_v4();

    for uri in [
        format!("/student_detail/{}/", missing),
        format!("/update_student/{}/", missing),
        format!("/delete_student/{}", missing),
        "/student_detail/not-a-uuid/".to_string(),
    ] {
        let response = app.clone().oneshot(get(&uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {}", uri);
    }

    let response = app
        .oneshot(post_form(&format!("/delete_student/{}", missing), &[], None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_plain_form_validates_without_saving(pool: PgPool) {
    let teacher = create_test_teacher(&pool, "Grace Hopper").await;
    let app = setup_test_app(pool.clone());
    let teacher_id = teacher.id.to_string();

    let response = app
        .clone()
        .oneshot(post_form(
            "/student_form/",
            &student_fields("Ann Lee", "18", "12", &teacher_id),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Thank you, Ann Lee!"));
    assert_eq!(count_students(&pool).await, 0);
    assert!(!account_exists(&pool, "annlee").await);

    let long_name = "x".repeat(101);
    let response = app
        .clone()
        .oneshot(post_form(
            "/student_form/",
            &student_fields(&long_name, "17", "12", &teacher_id),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(AGE_TOO_LOW));
    assert!(body.contains("at most 100 characters"));

    // The record form allows longer names.
    let response = app
        .oneshot(post_form(
            "/student_model_form/",
            &student_fields(&long_name, "20", "12", &teacher_id),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_profile_picture_lifecycle(pool: PgPool) {
    let teacher = create_test_teacher(&pool, "Grace Hopper").await;
    let state = test_state(pool.clone());
    let media_root = state.media_config.root.clone();
    let app = init_router(state);
    let teacher_id = teacher.id.to_string();

    let response = app
        .clone()
        .oneshot(multipart_request(
            "/student_model_form/",
            &student_fields("Ann Lee", "19", "12", &teacher_id),
            Some(("image/png", &b"\x89PNG fake image"[..])),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let id = student_id(&pool, "Ann Lee").await;
    let key: Option<String> =
        sqlx::query_scalar("SELECT profile_picture FROM students WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    let key = key.unwrap();
    assert!(key.starts_with("profile_pics/"));
    assert!(key.ends_with(".png"));
    assert!(media_root.join(&key).exists());

    let response = app
        .clone()
        .oneshot(get(&format!("/media/{}", key), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut fields = student_fields("Ann Lee", "19", "12", &teacher_id);
    fields.push(("profile_picture-clear", "on"));
    let response = app
        .clone()
        .oneshot(multipart_request(
            &format!("/update_student/{}/", id),
            &fields,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let cleared: Option<String> =
        sqlx::query_scalar("SELECT profile_picture FROM students WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(cleared.is_none());
    assert!(!media_root.join(&key).exists());

    let _ = std::fs::remove_dir_all(&media_root);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invalid_profile_picture_is_rejected(pool: PgPool) {
    let teacher = create_test_teacher(&pool, "Grace Hopper").await;
    let app = setup_test_app(pool.clone());
    let teacher_id = teacher.id.to_string();

    let response = app
        .clone()
        .oneshot(multipart_request(
            "/student_model_form/",
            &student_fields("Ann Lee", "19", "12", &teacher_id),
            Some(("application/pdf", &b"%PDF-1.4"[..])),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Upload a valid image"));

    let too_big = vec![0u8; 2048];
    let response = app
        .oneshot(multipart_request(
            "/student_model_form/",
            &student_fields("Ann Lee", "19", "12", &teacher_id),
            Some(("image/png", too_big.as_slice())),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("The file is too large"));

    assert_eq!(count_students(&pool).await, 0);
}
