use schoolportal_core::FileStorage;
use schoolportal_models::{Email, NewTeacher, Subject, Teacher, TeacherId};
use sqlx::PgPool;

use crate::modules::teachers::service::TeacherService;

pub async fn create_teacher(
    db: &PgPool,
    name: &str,
    subject: Subject,
    email: Email,
) -> anyhow::Result<Teacher> {
    let new_teacher = NewTeacher {
        name: name.to_string(),
        subject,
        email,
    };

    TeacherService::create_teacher(db, new_teacher)
        .await
        .map_err(|e| e.error)
}

pub async fn list_teachers(db: &PgPool) -> anyhow::Result<Vec<Teacher>> {
    TeacherService::list_teachers(db).await.map_err(|e| e.error)
}

/// Deletes a teacher and its students. Returns the deleted teacher and how
/// many students went with it.
pub async fn delete_teacher(
    db: &PgPool,
    storage: &dyn FileStorage,
    id: TeacherId,
) -> anyhow::Result<(Teacher, u64)> {
    let teacher = TeacherService::get_teacher(db, id)
        .await
        .map_err(|e| e.error)?;
    let removed = TeacherService::delete_teacher(db, storage, id)
        .await
        .map_err(|e| e.error)?;

    Ok((teacher, removed))
}
