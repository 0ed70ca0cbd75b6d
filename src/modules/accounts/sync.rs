//! Account-sync: every student record owns a login account.
//!
//! The account is found by [`username_for_student`], so both operations take
//! the student's name rather than an account id. They run on the caller's
//! transaction; a failure here rolls back the student write as well.

use anyhow::anyhow;
use schoolportal_core::AppError;
use schoolportal_models::{Account, username_for_student};
use sqlx::{Postgres, Transaction};
use tracing::{info, instrument};

use crate::metrics::track_account_synced;

/// Creates the account of a newly inserted student.
///
/// A taken username returns a conflict error; the caller must roll back.
#[instrument(skip(tx, password_hash))]
pub async fn on_student_created(
    tx: &mut Transaction<'_, Postgres>,
    student_name: &str,
    password_hash: &str,
) -> Result<Account, AppError> {
    let username = username_for_student(student_name);

    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (username, password_hash)
        VALUES ($1, $2)
        RETURNING id, username, email, created_at
        "#,
    )
    .bind(&username)
    .bind(password_hash)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::conflict(anyhow!(
                    "Account {} already exists for another student",
                    username
                ));
            }
        }
        AppError::database(anyhow::Error::from(e))
    })?;

    info!(username = %account.username, "Account created for student");
    track_account_synced("created");

    Ok(account)
}

/// Deletes the account of a deleted student. Returns whether one existed.
#[instrument(skip(tx))]
pub async fn on_student_deleted(
    tx: &mut Transaction<'_, Postgres>,
    student_name: &str,
) -> Result<bool, AppError> {
    let username = username_for_student(student_name);

    let result = sqlx::query("DELETE FROM accounts WHERE username = $1")
        .bind(&username)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(anyhow::Error::from(e)))?;

    if result.rows_affected() == 0 {
        info!(username = %username, "No account found for deleted student");
        return Ok(false);
    }

    info!(username = %username, "Account deleted for student");
    track_account_synced("deleted");

    Ok(true)
}
