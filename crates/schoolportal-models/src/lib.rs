//! # School Portal Models
//!
//! Domain records, forms, and validation rules:
//!
//! - [`teachers`]: Teacher records
//! - [`students`]: Student records and picture uploads
//! - [`accounts`]: Login accounts and the student username rule
//! - [`auth`]: Registration and login forms
//! - [`validation`]: Form errors and the student validation rule
//! - [`ids`]: Typed record IDs
//! - [`value_types`]: Email and subject values

pub mod accounts;
pub mod auth;
pub mod ids;
pub mod students;
pub mod teachers;
pub mod validation;
pub mod value_types;

pub use accounts::{Account, AccountCredentials, username_for_student};
pub use auth::{LoginForm, RegisterForm, Registration};
pub use ids::{AccountId, StudentId, TeacherId};
pub use students::{PictureChange, PictureUpload, Student, StudentWithTeacher};
pub use teachers::{NewTeacher, Teacher, TeacherChoice};
pub use validation::{EntryPath, FormErrors, StudentFields, StudentInput, validate_student};
pub use value_types::{Email, Subject};
