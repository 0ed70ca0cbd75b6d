use std::env;

/// Placeholder password given to every account created for a student record.
pub const DEFAULT_STUDENT_PASSWORD: &str = "defaultpassword123";

/// Credentials issued to accounts derived from student records.
///
/// Every derived account shares the same placeholder password. This is a known
/// weakness kept until a credential-issuance policy is decided.
#[derive(Clone, Debug)]
pub struct AccountConfig {
    pub default_password: String,
}

impl AccountConfig {
    pub fn from_env() -> Self {
        Self {
            default_password: env::var("STUDENT_ACCOUNT_DEFAULT_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_STUDENT_PASSWORD.to_string()),
        }
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            default_password: DEFAULT_STUDENT_PASSWORD.to_string(),
        }
    }
}
