//! Teacher records.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use validator::Validate;

use crate::ids::TeacherId;
use crate::value_types::{Email, Subject};

/// A teacher. `joined_date` is set by the store on insert and never changes.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    pub subject: Subject,
    pub email: Email,
    pub joined_date: NaiveDate,
}

impl Teacher {
    /// Label used wherever a teacher is offered as a choice.
    pub fn display_label(&self) -> &str {
        self.email.as_str()
    }
}

/// Data needed to create a teacher.
#[derive(Debug, Clone, Validate)]
pub struct NewTeacher {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub subject: Subject,
    pub email: Email,
}

/// A `<select>` option for the teacher field of student forms.
#[derive(Debug, Clone, Serialize)]
pub struct TeacherChoice {
    pub id: TeacherId,
    pub label: String,
}

impl From<&Teacher> for TeacherChoice {
    fn from(teacher: &Teacher) -> Self {
        Self {
            id: teacher.id,
            label: teacher.display_label().to_string(),
        }
    }
}
