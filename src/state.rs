use anyhow::Context;
use schoolportal_config::{AccountConfig, MediaConfig, SessionConfig};
use schoolportal_core::{LocalFileStorage, hash_password};
use schoolportal_db::init_db_pool;
use sqlx::PgPool;

use crate::templates::Templates;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub session_config: SessionConfig,
    pub media_config: MediaConfig,
    /// Hash of the placeholder password given to student accounts, computed once.
    pub default_password_hash: String,
    pub templates: Templates,
    pub storage: LocalFileStorage,
}

impl AppState {
    pub fn new(
        db: PgPool,
        session_config: SessionConfig,
        media_config: MediaConfig,
        account_config: AccountConfig,
    ) -> anyhow::Result<Self> {
        let default_password_hash = hash_password(&account_config.default_password)
            .map_err(|e| e.error)
            .context("Failed to hash the student account password")?;
        let templates = Templates::new().context("Failed to load templates")?;
        let storage = LocalFileStorage::with_max_size(
            media_config.root.clone(),
            media_config.url.clone(),
            media_config.max_upload_bytes,
        );

        Ok(Self {
            db,
            session_config,
            media_config,
            default_password_hash,
            templates,
            storage,
        })
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    AppState::new(
        init_db_pool().await,
        SessionConfig::from_env(),
        MediaConfig::from_env(),
        AccountConfig::from_env(),
    )
}
