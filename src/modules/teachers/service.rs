use anyhow::{Context, anyhow};
use schoolportal_core::{AppError, FileStorage};
use schoolportal_models::{NewTeacher, Teacher, TeacherChoice, TeacherId};
use sqlx::{FromRow, PgPool};
use tracing::{info, instrument};
use validator::Validate;

use crate::metrics::track_students_deleted;
use crate::modules::accounts::sync::on_student_deleted;
use crate::modules::students::service::remove_picture;

#[derive(Debug, FromRow)]
struct CascadedStudent {
    name: String,
    profile_picture: Option<String>,
}

pub struct TeacherService;

impl TeacherService {
    #[instrument(skip(db, new_teacher), fields(email = %new_teacher.email))]
    pub async fn create_teacher(db: &PgPool, new_teacher: NewTeacher) -> Result<Teacher, AppError> {
        new_teacher
            .validate()
            .map_err(|e| AppError::bad_request(anyhow!("Validation failed: {}", e)))?;

        sqlx::query_as::<_, Teacher>(
            r#"
            INSERT INTO teachers (name, subject, email)
            VALUES ($1, $2, $3)
            RETURNING id, name, subject, email, joined_date
            "#,
        )
        .bind(new_teacher.name.trim())
        .bind(new_teacher.subject)
        .bind(&new_teacher.email)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow!(
                        "Teacher with email {} already exists",
                        new_teacher.email
                    ));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })
    }

    #[instrument(skip(db))]
    pub async fn list_teachers(db: &PgPool) -> Result<Vec<Teacher>, AppError> {
        sqlx::query_as::<_, Teacher>(
            "SELECT id, name, subject, email, joined_date FROM teachers ORDER BY name, id",
        )
        .fetch_all(db)
        .await
        .context("Failed to fetch teachers")
        .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_teacher(db: &PgPool, id: TeacherId) -> Result<Teacher, AppError> {
        sqlx::query_as::<_, Teacher>(
            "SELECT id, name, subject, email, joined_date FROM teachers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch teacher by ID")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow!("Teacher not found")))
    }

    #[instrument(skip(db))]
    pub async fn teacher_exists(db: &PgPool, id: TeacherId) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM teachers WHERE id = $1)")
            .bind(id)
            .fetch_one(db)
            .await
            .context("Failed to check teacher")
            .map_err(AppError::database)
    }

    /// Options for the teacher field of student forms, labelled by email.
    pub async fn teacher_choices(db: &PgPool) -> Result<Vec<TeacherChoice>, AppError> {
        let teachers = Self::list_teachers(db).await?;
        Ok(teachers.iter().map(TeacherChoice::from).collect())
    }

    /// Deletes a teacher together with all of its students.
    ///
    /// Each cascaded student's account is removed in the same transaction
    /// before the foreign key cascade deletes the rows. Returns the number of
    /// students removed.
    #[instrument(skip(db, storage))]
    pub async fn delete_teacher(
        db: &PgPool,
        storage: &dyn FileStorage,
        id: TeacherId,
    ) -> Result<u64, AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        // Student inserts referencing this teacher wait on this lock.
        let locked =
            sqlx::query_scalar::<_, i32>("SELECT 1 FROM teachers WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .context("Failed to lock teacher")
                .map_err(AppError::database)?;

        if locked.is_none() {
            return Err(AppError::not_found(anyhow!("Teacher not found")));
        }

        let students = sqlx::query_as::<_, CascadedStudent>(
            "SELECT name, profile_picture FROM students WHERE teacher_id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .context("Failed to fetch students of teacher")
        .map_err(AppError::database)?;

        for student in &students {
            on_student_deleted(&mut tx, &student.name).await?;
        }

        sqlx::query("DELETE FROM teachers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete teacher")
            .map_err(AppError::database)?;

        tx.commit()
            .await
            .context("Failed to commit transaction")
            .map_err(AppError::database)?;

        let removed = students.len() as u64;
        info!(teacher_id = %id, students = removed, "Teacher deleted");
        track_students_deleted(removed);

        for key in students.iter().filter_map(|s| s.profile_picture.as_deref()) {
            remove_picture(storage, key).await;
        }

        Ok(removed)
    }
}
