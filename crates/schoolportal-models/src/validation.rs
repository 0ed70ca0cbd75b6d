//! Field-level form errors and the student validation rule.
//!
//! Student data arrives through two entry points: the plain student form and
//! the record-backed form used for create/update. Both normalize their input
//! into [`StudentFields`] and call [`validate_student`]; the only difference is
//! the name length limit carried by [`EntryPath`].
//!
//! The teacher reference is checked for shape here. Whether the teacher
//! actually exists needs the store and is checked by the student service,
//! which adds [`INVALID_CHOICE`] to the same [`FormErrors`].

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use validator::{Validate, ValidationErrors};

use crate::ids::TeacherId;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_A_NUMBER: &str = "Enter a whole number.";
pub const AGE_TOO_LOW: &str = "Age must be at least 18.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

pub const STORED_NAME_MAX: usize = 250;
pub const FORM_NAME_MAX: usize = 100;
pub const GRADE_MAX: usize = 10;

/// Validation messages keyed by field name, plus errors not tied to a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub fields: BTreeMap<String, Vec<String>>,
    pub non_field: Vec<String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    /// Merge errors reported by a `validator` derive.
    pub fn extend_from_validation(&mut self, errors: &ValidationErrors) {
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| match error.params.get("max") {
                        Some(max) if error.code == "length" => {
                            format!("Ensure this value has at most {} characters.", max)
                        }
                        _ => format!("{} is invalid", field),
                    });
                self.add(&field.to_string(), message);
            }
        }
    }

    pub fn merge(&mut self, other: FormErrors) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_default().extend(messages);
        }
        self.non_field.extend(other.non_field);
    }

    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Max-length message reporting the submitted length.
pub fn too_long(max: usize, actual: usize) -> String {
    format!(
        "Ensure this value has at most {} characters (it has {}).",
        max, actual
    )
}

/// Which form the student data came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPath {
    /// The plain form; validated but never persisted.
    Plain,
    /// The record-backed form used for create and update.
    Record,
}

impl EntryPath {
    pub fn name_max_length(&self) -> usize {
        match self {
            Self::Plain => FORM_NAME_MAX,
            Self::Record => STORED_NAME_MAX,
        }
    }
}

/// Raw student fields as submitted, before any parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudentFields {
    pub name: Option<String>,
    pub age: Option<String>,
    pub grade: Option<String>,
    pub teacher: Option<String>,
}

impl StudentFields {
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        Self {
            name: map.get("name").cloned(),
            age: map.get("age").cloned(),
            grade: map.get("grade").cloned(),
            teacher: map.get("teacher").cloned(),
        }
    }
}

/// Student data that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentInput {
    pub name: String,
    pub age: i32,
    pub grade: String,
    pub teacher_id: TeacherId,
}

/// Domain rule on age, applied on top of the store's non-negative column.
#[derive(Debug, Validate)]
struct AgeRule {
    #[validate(range(min = 18, message = "Age must be at least 18."))]
    age: i32,
}

fn required(value: &Option<String>, field: &str, errors: &mut FormErrors) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.add(field, REQUIRED);
            None
        }
    }
}

/// Validate raw student fields for the given entry path.
///
/// Every field is checked so the form can show all problems at once.
pub fn validate_student(
    fields: &StudentFields,
    entry: EntryPath,
) -> Result<StudentInput, FormErrors> {
    let mut errors = FormErrors::new();

    let name = required(&fields.name, "name", &mut errors);
    if let Some(name) = &name {
        let len = name.chars().count();
        if len > entry.name_max_length() {
            errors.add("name", too_long(entry.name_max_length(), len));
        }
    }

    let age = required(&fields.age, "age", &mut errors).and_then(|raw| match raw.parse::<i32>() {
        Ok(age) => Some(age),
        Err(_) => {
            errors.add("age", NOT_A_NUMBER);
            None
        }
    });

    let grade = required(&fields.grade, "grade", &mut errors);
    if let Some(grade) = &grade {
        let len = grade.chars().count();
        if len > GRADE_MAX {
            errors.add("grade", too_long(GRADE_MAX, len));
        }
    }

    let teacher_id = required(&fields.teacher, "teacher", &mut errors).and_then(|raw| {
        match raw.parse::<TeacherId>() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add("teacher", INVALID_CHOICE);
                None
            }
        }
    });

    if let Some(age) = age {
        if let Err(validation) = (AgeRule { age }).validate() {
            errors.extend_from_validation(&validation);
        }
    }

    match (name, age, grade, teacher_id) {
        (Some(name), Some(age), Some(grade), Some(teacher_id)) if errors.is_empty() => {
            Ok(StudentInput {
                name,
                age,
                grade,
                teacher_id,
            })
        }
        _ => Err(errors),
    }
}
