use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use schoolportal_core::{AppError, FileStorage};
use schoolportal_models::{EntryPath, FormErrors, StudentFields, StudentId};
use tracing::instrument;

use crate::middleware::auth::{CurrentSession, RequireSession};
use crate::modules::students::model::{
    STUDENT_FORM_FIELDS, SaveStudentError, StudentFormValues, StudentView,
};
use crate::modules::students::service::StudentService;
use crate::modules::teachers::service::TeacherService;
use crate::state::AppState;
use crate::templates::{errors_context, page_context};
use crate::validator::StudentSubmission;

const STUDENT_LIST_PATH: &str = "/student_list/";

/// A malformed id can never match a student, so it is a not-found too.
fn parse_student_id(raw: &str) -> Result<StudentId, AppError> {
    raw.parse::<StudentId>()
        .map_err(|_| AppError::not_found(anyhow::anyhow!("Student not found")))
}

/// Everything needed to (re-)render one of the student forms.
struct FormPage<'a, 'e> {
    entry: EntryPath,
    fields: &'a StudentFields,
    errors: &'e FormErrors,
    heading: &'a str,
    action: String,
    current_picture: Option<String>,
}

impl<'a, 'e> FormPage<'a, 'e> {
    fn plain(fields: &'a StudentFields, errors: &'e FormErrors) -> Self {
        Self {
            entry: EntryPath::Plain,
            fields,
            errors,
            heading: "Student form",
            action: "/student_form/".to_string(),
            current_picture: None,
        }
    }

    fn create(fields: &'a StudentFields, errors: &'e FormErrors) -> Self {
        Self {
            entry: EntryPath::Record,
            fields,
            errors,
            heading: "Add student",
            action: "/student_model_form/".to_string(),
            current_picture: None,
        }
    }

    fn update(
        state: &AppState,
        id: StudentId,
        picture_key: Option<&str>,
        fields: &'a StudentFields,
        errors: &'e FormErrors,
    ) -> Self {
        Self {
            entry: EntryPath::Record,
            fields,
            errors,
            heading: "Edit student",
            action: format!("/update_student/{}/", id),
            current_picture: picture_key.and_then(|key| state.storage.get_url(key).ok()),
        }
    }
}

async fn render_form(
    state: &AppState,
    session: &CurrentSession,
    page: FormPage<'_, '_>,
) -> Result<Html<String>, AppError> {
    let teachers = TeacherService::teacher_choices(&state.db).await?;

    let mut context = page_context(session.username());
    context.insert("form", &StudentFormValues::from(page.fields));
    context.insert("errors", &errors_context(page.errors, &STUDENT_FORM_FIELDS));
    context.insert("teachers", &teachers);
    context.insert("name_max_length", &page.entry.name_max_length());
    context.insert("heading", page.heading);
    context.insert("action", &page.action);
    context.insert("current_picture", &page.current_picture);

    let template = match page.entry {
        EntryPath::Plain => "student_form.html",
        EntryPath::Record => "add_student.html",
    };
    state.templates.render(template, &context)
}

/// Maps a failed save onto the re-rendered form or an error page.
async fn form_failure<'a>(
    state: &AppState,
    session: &CurrentSession,
    error: SaveStudentError,
    page: impl FnOnce(&FormErrors) -> FormPage<'a, '_>,
) -> Result<Response, AppError> {
    let (status, errors) = match error {
        SaveStudentError::Invalid(errors) => (StatusCode::OK, errors),
        SaveStudentError::AccountConflict(errors) => (StatusCode::CONFLICT, errors),
        SaveStudentError::Failed(e) => return Err(e),
    };

    let html = render_form(state, session, page(&errors)).await?;
    Ok((status, html).into_response())
}

#[instrument(skip(state))]
pub async fn student_list(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
) -> Result<Html<String>, AppError> {
    let students: Vec<StudentView> = StudentService::list_students(&state.db)
        .await?
        .into_iter()
        .map(|student| StudentView::new(student, &state.storage))
        .collect();

    let mut context = page_context(Some(&user.username));
    context.insert("all_students", &students);
    state.templates.render("student_list.html", &context)
}

#[instrument(skip(state))]
pub async fn student_detail(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = parse_student_id(&id)?;
    let student = StudentService::get_student_with_teacher(&state.db, id).await?;

    let mut context = page_context(session.username());
    context.insert("student", &StudentView::new(student, &state.storage));
    state.templates.render("student_detail.html", &context)
}

#[instrument(skip(state))]
pub async fn student_form_page(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Html<String>, AppError> {
    let fields = StudentFields::default();
    render_form(&state, &session, FormPage::plain(&fields, &FormErrors::new())).await
}

/// Validates the plain form without saving anything.
#[instrument(skip(state, submission))]
pub async fn student_form_submit(
    State(state): State<AppState>,
    session: CurrentSession,
    submission: StudentSubmission,
) -> Result<Response, AppError> {
    let fields = submission.fields;

    match StudentService::check_student(&state.db, &fields, EntryPath::Plain).await {
        Ok(input) => {
            let mut context = page_context(session.username());
            context.insert("name", &input.name);
            Ok(state.templates.render("success.html", &context)?.into_response())
        }
        Err(e) => form_failure(&state, &session, e, |errors| FormPage::plain(&fields, errors)).await,
    }
}

#[instrument(skip(state))]
pub async fn add_student_page(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Html<String>, AppError> {
    let fields = StudentFields::default();
    render_form(&state, &session, FormPage::create(&fields, &FormErrors::new())).await
}

#[instrument(skip(state, submission))]
pub async fn add_student(
    State(state): State<AppState>,
    session: CurrentSession,
    submission: StudentSubmission,
) -> Result<Response, AppError> {
    let StudentSubmission {
        fields, picture, ..
    } = submission;

    let result = StudentService::create_student(
        &state.db,
        &state.storage,
        &state.default_password_hash,
        &fields,
        picture,
    )
    .await;

    match result {
        Ok(_) => Ok(Redirect::to(STUDENT_LIST_PATH).into_response()),
        Err(e) => form_failure(&state, &session, e, |errors| FormPage::create(&fields, errors)).await,
    }
}

#[instrument(skip(state))]
pub async fn update_student_page(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = parse_student_id(&id)?;
    let student = StudentService::get_student(&state.db, id).await?;
    let fields = StudentFields::from(&student);
    let errors = FormErrors::new();

    let page = FormPage::update(
        &state,
        id,
        student.profile_picture.as_deref(),
        &fields,
        &errors,
    );
    render_form(&state, &session, page).await
}

#[instrument(skip(state, submission))]
pub async fn update_student(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
    submission: StudentSubmission,
) -> Result<Response, AppError> {
    let id = parse_student_id(&id)?;
    let fields = submission.fields.clone();

    let result = StudentService::update_student(
        &state.db,
        &state.storage,
        id,
        &fields,
        submission.picture_change(),
    )
    .await;

    match result {
        Ok(_) => Ok(Redirect::to(STUDENT_LIST_PATH).into_response()),
        Err(e) => {
            let current = StudentService::get_student(&state.db, id).await?;
            let picture_key = current.profile_picture;
            form_failure(&state, &session, e, |errors| {
                FormPage::update(&state, id, picture_key.as_deref(), &fields, errors)
            })
            .await
        }
    }
}

#[instrument(skip(state))]
pub async fn delete_student_page(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = parse_student_id(&id)?;
    let student = StudentService::get_student_with_teacher(&state.db, id).await?;

    let mut context = page_context(session.username());
    context.insert("student", &StudentView::new(student, &state.storage));
    state.templates.render("confirm_delete.html", &context)
}

#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let id = parse_student_id(&id)?;
    StudentService::delete_student(&state.db, &state.storage, id).await?;
    Ok(Redirect::to(STUDENT_LIST_PATH))
}
