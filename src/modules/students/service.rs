use anyhow::{Context, anyhow};
use schoolportal_core::{AppError, FileStorage, StorageError};
use schoolportal_models::validation::INVALID_CHOICE;
use schoolportal_models::{
    EntryPath, FormErrors, PictureChange, PictureUpload, Student, StudentFields, StudentId,
    StudentInput, StudentWithTeacher, TeacherId, username_for_student, validate_student,
};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::metrics::{track_student_created, track_students_deleted};
use crate::modules::accounts::sync::{on_student_created, on_student_deleted};
use crate::modules::students::model::SaveStudentError;
use crate::modules::teachers::service::TeacherService;

const STUDENT_COLUMNS: &str =
    "id, name, age, grade, teacher_id, profile_picture, created_at, updated_at";

pub struct StudentService;

impl StudentService {
    /// All students with their teacher, ordered by name.
    #[instrument(skip(db))]
    pub async fn list_students(db: &PgPool) -> Result<Vec<StudentWithTeacher>, AppError> {
        sqlx::query_as::<_, StudentWithTeacher>(
            r#"
            SELECT s.id, s.name, s.age, s.grade, s.teacher_id, s.profile_picture,
                   t.name AS teacher_name, t.email AS teacher_email, t.subject AS teacher_subject
            FROM students s
            JOIN teachers t ON t.id = s.teacher_id
            ORDER BY s.name, s.id
            "#,
        )
        .fetch_all(db)
        .await
        .context("Failed to fetch students")
        .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_student(db: &PgPool, id: StudentId) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {} FROM students WHERE id = $1",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch student by ID")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_student_with_teacher(
        db: &PgPool,
        id: StudentId,
    ) -> Result<StudentWithTeacher, AppError> {
        sqlx::query_as::<_, StudentWithTeacher>(
            r#"
            SELECT s.id, s.name, s.age, s.grade, s.teacher_id, s.profile_picture,
                   t.name AS teacher_name, t.email AS teacher_email, t.subject AS teacher_subject
            FROM students s
            JOIN teachers t ON t.id = s.teacher_id
            WHERE s.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch student by ID")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }

    /// Validates submitted fields, including that the teacher exists.
    #[instrument(skip(db))]
    pub async fn check_student(
        db: &PgPool,
        fields: &StudentFields,
        entry: EntryPath,
    ) -> Result<StudentInput, SaveStudentError> {
        let validated = validate_student(fields, entry);

        let teacher_id = fields
            .teacher
            .as_deref()
            .and_then(|raw| raw.parse::<TeacherId>().ok());
        let unknown_teacher = match teacher_id {
            Some(id) => !TeacherService::teacher_exists(db, id).await?,
            None => false,
        };

        match validated {
            Ok(input) if !unknown_teacher => Ok(input),
            Ok(_) => {
                let mut errors = FormErrors::new();
                errors.add("teacher", INVALID_CHOICE);
                Err(SaveStudentError::Invalid(errors))
            }
            Err(mut errors) => {
                if unknown_teacher {
                    errors.add("teacher", INVALID_CHOICE);
                }
                Err(SaveStudentError::Invalid(errors))
            }
        }
    }

    /// Creates a student and its account in one transaction.
    #[instrument(skip(db, storage, password_hash, picture))]
    pub async fn create_student(
        db: &PgPool,
        storage: &dyn FileStorage,
        password_hash: &str,
        fields: &StudentFields,
        picture: Option<PictureUpload>,
    ) -> Result<Student, SaveStudentError> {
        let input = Self::check_with_picture(db, storage, fields, picture.as_ref()).await?;

        let picture_key = match &picture {
            Some(upload) => Some(store_picture(storage, upload).await?),
            None => None,
        };

        let result = Self::insert_with_account(db, password_hash, &input, picture_key.as_deref()).await;

        match result {
            Ok(student) => {
                info!(student_id = %student.id, "Student created");
                track_student_created();
                Ok(student)
            }
            Err(e) => {
                if let Some(key) = &picture_key {
                    remove_picture(storage, key).await;
                }
                Err(e)
            }
        }
    }

    async fn insert_with_account(
        db: &PgPool,
        password_hash: &str,
        input: &StudentInput,
        picture_key: Option<&str>,
    ) -> Result<Student, SaveStudentError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let student = sqlx::query_as::<_, Student>(&format!(
            r#"
            INSERT INTO students (name, age, grade, teacher_id, profile_picture)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        ))
        .bind(&input.name)
        .bind(input.age)
        .bind(&input.grade)
        .bind(input.teacher_id)
        .bind(picture_key)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        match on_student_created(&mut tx, &student.name, password_hash).await {
            Ok(_) => {}
            Err(e) if e.is_conflict() => {
                warn!(error = %e.error, "Account-sync conflict, student not created");
                let mut errors = FormErrors::new();
                errors.add_non_field(format!(
                    "A login account named \"{}\" already exists, so this student cannot be added.",
                    username_for_student(&student.name)
                ));
                return Err(SaveStudentError::AccountConflict(errors));
            }
            Err(e) => return Err(e.into()),
        }

        tx.commit()
            .await
            .context("Failed to commit transaction")
            .map_err(AppError::database)?;

        Ok(student)
    }

    /// Overwrites a student's fields. Accounts are left untouched.
    #[instrument(skip(db, storage, change))]
    pub async fn update_student(
        db: &PgPool,
        storage: &dyn FileStorage,
        id: StudentId,
        fields: &StudentFields,
        change: PictureChange,
    ) -> Result<Student, SaveStudentError> {
        let existing = Self::get_student(db, id).await?;

        let upload = match &change {
            PictureChange::Replace(upload) => Some(upload),
            _ => None,
        };
        let input = Self::check_with_picture(db, storage, fields, upload).await?;

        let (picture_key, stored_key) = match change {
            PictureChange::Keep => (existing.profile_picture.clone(), None),
            PictureChange::Clear => (None, None),
            PictureChange::Replace(upload) => {
                let key = store_picture(storage, &upload).await?;
                (Some(key.clone()), Some(key))
            }
        };

        let result = sqlx::query_as::<_, Student>(&format!(
            r#"
            UPDATE students
            SET name = $1, age = $2, grade = $3, teacher_id = $4, profile_picture = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        ))
        .bind(&input.name)
        .bind(input.age)
        .bind(&input.grade)
        .bind(input.teacher_id)
        .bind(picture_key.as_deref())
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(map_write_error)
        .and_then(|row| {
            row.ok_or_else(|| AppError::not_found(anyhow!("Student not found")).into())
        });

        let student = match result {
            Ok(student) => student,
            Err(e) => {
                if let Some(key) = &stored_key {
                    remove_picture(storage, key).await;
                }
                return Err(e);
            }
        };

        if let Some(old_key) = existing.profile_picture.as_deref() {
            if student.profile_picture.as_deref() != Some(old_key) {
                remove_picture(storage, old_key).await;
            }
        }

        info!(student_id = %student.id, "Student updated");
        Ok(student)
    }

    /// Deletes a student and its account in one transaction.
    #[instrument(skip(db, storage))]
    pub async fn delete_student(
        db: &PgPool,
        storage: &dyn FileStorage,
        id: StudentId,
    ) -> Result<Student, AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let student = sqlx::query_as::<_, Student>(&format!(
            "DELETE FROM students WHERE id = $1 RETURNING {}",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to delete student")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        on_student_deleted(&mut tx, &student.name).await?;

        tx.commit()
            .await
            .context("Failed to commit transaction")
            .map_err(AppError::database)?;

        info!(student_id = %student.id, "Student deleted");
        track_students_deleted(1);

        if let Some(key) = student.profile_picture.as_deref() {
            remove_picture(storage, key).await;
        }

        Ok(student)
    }

    async fn check_with_picture(
        db: &PgPool,
        storage: &dyn FileStorage,
        fields: &StudentFields,
        picture: Option<&PictureUpload>,
    ) -> Result<StudentInput, SaveStudentError> {
        let checked = Self::check_student(db, fields, EntryPath::Record).await;

        let mut picture_errors = FormErrors::new();
        if let Some(upload) = picture {
            if let Err(e) = storage.check_upload(upload.content_type.as_deref(), upload.bytes.len())
            {
                picture_errors.add("profile_picture", picture_error_message(&e));
            }
        }

        match checked {
            Ok(input) if picture_errors.is_empty() => Ok(input),
            Ok(_) => Err(SaveStudentError::Invalid(picture_errors)),
            Err(SaveStudentError::Invalid(mut errors)) => {
                errors.merge(picture_errors);
                Err(SaveStudentError::Invalid(errors))
            }
            Err(e) => Err(e),
        }
    }
}

fn picture_error_message(error: &StorageError) -> String {
    match error {
        StorageError::InvalidFileSize { max_bytes } => format!(
            "The file is too large. Profile pictures may be at most {} bytes.",
            max_bytes
        ),
        _ => "Upload a valid image. Allowed types are PNG, JPEG, GIF and WebP.".to_string(),
    }
}

async fn store_picture(
    storage: &dyn FileStorage,
    upload: &PictureUpload,
) -> Result<String, SaveStudentError> {
    storage
        .store_profile_picture(upload.content_type.as_deref(), &upload.bytes)
        .await
        .map_err(|e| {
            if e.is_client_error() {
                let mut errors = FormErrors::new();
                errors.add("profile_picture", picture_error_message(&e));
                SaveStudentError::Invalid(errors)
            } else {
                SaveStudentError::Failed(AppError::internal(e))
            }
        })
}

/// Removes a stored picture, logging instead of failing.
pub async fn remove_picture(storage: &dyn FileStorage, key: &str) {
    if let Err(e) = storage.delete(key).await {
        warn!(key = %key, error = %e, "Failed to remove profile picture");
    }
}

/// A teacher removed between validation and insert surfaces as an FK violation.
fn map_write_error(e: sqlx::Error) -> SaveStudentError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            let mut errors = FormErrors::new();
            errors.add("teacher", INVALID_CHOICE);
            return SaveStudentError::Invalid(errors);
        }
    }
    SaveStudentError::Failed(AppError::database(anyhow::Error::from(e)))
}
