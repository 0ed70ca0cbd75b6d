use schoolportal_core::AppError;
use schoolportal_models::auth::USERNAME_TAKEN;
use schoolportal_models::{Account, AccountCredentials, FormErrors, LoginForm, RegisterForm};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::metrics::{track_user_login_failure, track_user_login_success};
use crate::modules::accounts::service::AccountService;
use crate::modules::auth::model::RegisterError;

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, form), fields(username = %form.username))]
    pub async fn register(db: &PgPool, form: &RegisterForm) -> Result<Account, RegisterError> {
        let registration = form.validate_fields().map_err(RegisterError::Invalid)?;

        let taken = || {
            let mut errors = FormErrors::new();
            errors.add("username", USERNAME_TAKEN);
            RegisterError::Invalid(errors)
        };

        if AccountService::username_exists(db, &registration.username).await? {
            return Err(taken());
        }

        let account = AccountService::create_account(
            db,
            &registration.username,
            registration.email.as_deref(),
            &registration.password,
        )
        .await
        .map_err(|e| if e.is_conflict() { taken() } else { e.into() })?;

        info!(account_id = %account.id, "Account registered");
        Ok(account)
    }

    /// Checks credentials. `None` means the username or password is wrong.
    #[instrument(skip(db, form), fields(username = %form.username))]
    pub async fn login(
        db: &PgPool,
        form: &LoginForm,
    ) -> Result<Option<AccountCredentials>, AppError> {
        let account = AccountService::authenticate(db, form.username.trim(), &form.password).await?;

        match &account {
            Some(account) => {
                info!(account_id = %account.id, "Login succeeded");
                track_user_login_success();
            }
            None => {
                warn!("Login failed");
                track_user_login_failure();
            }
        }

        Ok(account)
    }
}
