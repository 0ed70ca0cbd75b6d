use serde::Serialize;

use schoolportal_core::{AppError, FileStorage};
use schoolportal_models::{FormErrors, StudentFields, StudentId, StudentWithTeacher};

/// Field names of the student forms, in display order.
pub const STUDENT_FORM_FIELDS: [&str; 5] = ["name", "age", "grade", "teacher", "profile_picture"];

/// A student as shown on the list, detail and delete pages.
#[derive(Debug, Clone, Serialize)]
pub struct StudentView {
    pub id: StudentId,
    pub name: String,
    pub age: i32,
    pub grade: String,
    pub teacher_name: String,
    pub teacher_email: String,
    pub teacher_subject: &'static str,
    pub picture_url: Option<String>,
}

impl StudentView {
    pub fn new(student: StudentWithTeacher, storage: &dyn FileStorage) -> Self {
        let picture_url = student
            .profile_picture
            .as_deref()
            .and_then(|key| storage.get_url(key).ok());

        Self {
            id: student.id,
            name: student.name,
            age: student.age,
            grade: student.grade,
            teacher_name: student.teacher_name,
            teacher_email: student.teacher_email.into_inner(),
            teacher_subject: student.teacher_subject.label(),
            picture_url,
        }
    }
}

/// Submitted values echoed back into a re-rendered form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StudentFormValues {
    pub name: String,
    pub age: String,
    pub grade: String,
    pub teacher: String,
}

impl From<&StudentFields> for StudentFormValues {
    fn from(fields: &StudentFields) -> Self {
        let value = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            name: value(&fields.name),
            age: value(&fields.age),
            grade: value(&fields.grade),
            teacher: value(&fields.teacher).trim().to_string(),
        }
    }
}

/// Why a student could not be saved.
#[derive(Debug)]
pub enum SaveStudentError {
    /// The submitted data failed validation; nothing was written.
    Invalid(FormErrors),
    /// The derived account username is taken; the write was rolled back.
    AccountConflict(FormErrors),
    Failed(AppError),
}

impl From<AppError> for SaveStudentError {
    fn from(err: AppError) -> Self {
        Self::Failed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_values_default_to_empty() {
        let fields = StudentFields {
            name: Some("Ann".to_string()),
            teacher: Some(" 42 ".to_string()),
            ..Default::default()
        };
        let values = StudentFormValues::from(&fields);
        assert_eq!(values.name, "Ann");
        assert_eq!(values.age, "");
        assert_eq!(values.teacher, "42");
    }
}
