//! Login accounts.
//!
//! Accounts are created by self-registration and, for every student record,
//! by account-sync. A student's account is found by a username derived from
//! the student's name, not by a stored reference.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::ids::AccountId;

/// A login account. The password hash never leaves the service layer.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Account row including the password hash, used for credential checks.
#[derive(Debug, Clone, FromRow)]
pub struct AccountCredentials {
    pub id: AccountId,
    pub username: String,
    pub password_hash: String,
}

/// Username of the account belonging to a student.
///
/// Lowercases the name and removes space characters. Other whitespace is kept,
/// and distinct names can map to the same username ("Ann Lee", "ann lee").
pub fn username_for_student(name: &str) -> String {
    name.replace(' ', "").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_for_student() {
        assert_eq!(username_for_student("Ann Lee"), "annlee");
        assert_eq!(username_for_student("  Mary Jane  Watson "), "maryjanewatson");
        assert_eq!(username_for_student("ÉLODIE Roux"), "élodieroux");
    }

    #[test]
    fn test_normalized_names_collide() {
        assert_eq!(
            username_for_student("Ann Lee"),
            username_for_student("ann lee")
        );
        assert_eq!(username_for_student("AnnLee"), username_for_student("ann lee"));
    }

    #[test]
    fn test_only_spaces_are_removed() {
        assert_eq!(username_for_student("Ann\tLee"), "ann\tlee");
    }
}
