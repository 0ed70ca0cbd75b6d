use schoolportal_core::AppError;
use schoolportal_models::FormErrors;
use serde::Deserialize;

pub const LOGIN_FORM_FIELDS: [&str; 2] = ["username", "password"];
pub const REGISTER_FORM_FIELDS: [&str; 4] = ["username", "email", "password1", "password2"];

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug)]
pub enum RegisterError {
    Invalid(FormErrors),
    Failed(AppError),
}

impl From<AppError> for RegisterError {
    fn from(err: AppError) -> Self {
        Self::Failed(err)
    }
}
