//! Student records.
//!
//! Students are listed by name. Each student belongs to exactly one teacher and
//! is removed with it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::ids::{StudentId, TeacherId};
use crate::validation::StudentFields;
use crate::value_types::{Email, Subject};

/// A student row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub age: i32,
    pub grade: String,
    pub teacher_id: TeacherId,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A student joined with the teacher it references.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StudentWithTeacher {
    pub id: StudentId,
    pub name: String,
    pub age: i32,
    pub grade: String,
    pub teacher_id: TeacherId,
    pub teacher_name: String,
    pub teacher_email: Email,
    pub teacher_subject: Subject,
    pub profile_picture: Option<String>,
}

/// Pre-fills the record form when editing an existing student.
impl From<&Student> for StudentFields {
    fn from(student: &Student) -> Self {
        Self {
            name: Some(student.name.clone()),
            age: Some(student.age.to_string()),
            grade: Some(student.grade.clone()),
            teacher: Some(student.teacher_id.to_string()),
        }
    }
}

/// An uploaded profile picture, not yet stored.
#[derive(Debug, Clone)]
pub struct PictureUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// What to do with the stored picture when a student is updated.
#[derive(Debug, Clone, Default)]
pub enum PictureChange {
    #[default]
    Keep,
    Clear,
    Replace(PictureUpload),
}
