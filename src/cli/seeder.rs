use anyhow::anyhow;
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName, Name};
use schoolportal_core::FileStorage;
use schoolportal_models::{Email, NewTeacher, StudentFields, Subject, Teacher};
use sqlx::PgPool;
use std::time::Instant;

use crate::modules::students::model::SaveStudentError;
use crate::modules::students::service::StudentService;
use crate::modules::teachers::service::TeacherService;

#[derive(Debug, Default)]
pub struct SeedSummary {
    pub teachers: usize,
    pub students: usize,
    /// Students skipped because their derived username was already taken.
    pub skipped: usize,
}

fn fake_teacher() -> anyhow::Result<NewTeacher> {
    let subject = Subject::ALL[(0..Subject::ALL.len()).fake::<usize>()];
    let email: String = SafeEmail().fake();

    Ok(NewTeacher {
        name: Name().fake(),
        subject,
        email: Email::new(email)?,
    })
}

fn fake_student(teacher: &Teacher) -> StudentFields {
    let first: String = FirstName().fake();
    let last: String = LastName().fake();

    StudentFields {
        name: Some(format!("{} {}", first, last)),
        age: Some((18..26).fake::<i32>().to_string()),
        grade: Some((9..13).fake::<u8>().to_string()),
        teacher: Some(teacher.id.to_string()),
    }
}

/// Creates fake teachers and students.
///
/// Students go through the regular create path, so each one gets its
/// account. A fake name that collides with an existing account is skipped.
pub async fn seed_database(
    db: &PgPool,
    storage: &dyn FileStorage,
    password_hash: &str,
    num_teachers: usize,
    students_per_teacher: usize,
) -> anyhow::Result<SeedSummary> {
    let start_time = Instant::now();
    let mut summary = SeedSummary::default();

    println!("🌱 Seeding {} teachers with {} students each...", num_teachers, students_per_teacher);

    for _ in 0..num_teachers {
        let teacher = match TeacherService::create_teacher(db, fake_teacher()?).await {
            Ok(teacher) => teacher,
            Err(e) if e.is_conflict() => continue,
            Err(e) => return Err(e.error),
        };
        summary.teachers += 1;

        for _ in 0..students_per_teacher {
            let fields = fake_student(&teacher);
            match StudentService::create_student(db, storage, password_hash, &fields, None).await {
                Ok(_) => summary.students += 1,
                Err(SaveStudentError::AccountConflict(_)) => summary.skipped += 1,
                Err(SaveStudentError::Invalid(errors)) => {
                    return Err(anyhow!("Generated student was rejected: {:?}", errors.fields));
                }
                Err(SaveStudentError::Failed(e)) => return Err(e.error),
            }
        }
    }

    println!(
        "✅ Created {} teachers and {} students ({} skipped) in {:?}",
        summary.teachers,
        summary.students,
        summary.skipped,
        start_time.elapsed()
    );

    Ok(summary)
}
