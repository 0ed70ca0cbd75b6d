use anyhow::{Context, anyhow};
use schoolportal_core::{AppError, hash_password, verify_password};
use schoolportal_models::{Account, AccountCredentials, AccountId};
use sqlx::PgPool;
use tracing::instrument;

pub struct AccountService;

impl AccountService {
    /// Creates a self-registered account. A taken username is a conflict.
    #[instrument(skip(db, password))]
    pub async fn create_account(
        db: &PgPool,
        username: &str,
        email: Option<&str>,
        password: &str,
    ) -> Result<Account, AppError> {
        let password_hash = hash_password(password)?;

        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(&password_hash)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow!("Account {} already exists", username));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })
    }

    #[instrument(skip(db))]
    pub async fn username_exists(db: &PgPool, username: &str) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE username = $1)")
            .bind(username)
            .fetch_one(db)
            .await
            .context("Failed to check username")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn find_by_id(db: &PgPool, id: AccountId) -> Result<Option<Account>, AppError> {
        sqlx::query_as::<_, Account>(
            "SELECT id, username, email, created_at FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch account by ID")
        .map_err(AppError::database)
    }

    /// Returns the account when the credentials match, `None` otherwise.
    #[instrument(skip(db, password))]
    pub async fn authenticate(
        db: &PgPool,
        username: &str,
        password: &str,
    ) -> Result<Option<AccountCredentials>, AppError> {
        let credentials = sqlx::query_as::<_, AccountCredentials>(
            "SELECT id, username, password_hash FROM accounts WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(db)
        .await
        .context("Failed to fetch account credentials")
        .map_err(AppError::database)?;

        match credentials {
            Some(credentials) if verify_password(password, &credentials.password_hash)? => {
                Ok(Some(credentials))
            }
            _ => Ok(None),
        }
    }
}
