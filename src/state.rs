use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::auth::{
    jwt::JwtKeys,
    repo::{PgUserStore, UserStore},
    reset::ResetTokenIssuer,
};
use crate::config::AppConfig;
use crate::email::{EmailClient, HttpEmailClient};
use crate::projects::repo::{PgProjectStore, ProjectStore};
use crate::storage::{ImageStorage, S3ImageStorage};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub storage: Arc<dyn ImageStorage>,
    pub mailer: Arc<dyn EmailClient>,
    pub jwt: Arc<JwtKeys>,
    pub reset_tokens: Arc<ResetTokenIssuer>,
}

impl AppState {
    /// Connects every external collaborator described by `config`.
    pub async fn init(config: AppConfig) -> anyhow::Result<(Self, PgPool)> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let storage = Arc::new(S3ImageStorage::new(&config.storage).await?) as Arc<dyn ImageStorage>;
        let mailer = Arc::new(HttpEmailClient::new(&config.email)?) as Arc<dyn EmailClient>;

        let state = Self::from_parts(
            config,
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgProjectStore::new(db.clone())),
            storage,
            mailer,
        );
        Ok((state, db))
    }

    pub fn from_parts(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        projects: Arc<dyn ProjectStore>,
        storage: Arc<dyn ImageStorage>,
        mailer: Arc<dyn EmailClient>,
    ) -> Self {
        let jwt = Arc::new(JwtKeys::new(&config.jwt));
        let reset_tokens = Arc::new(ResetTokenIssuer::from_minutes(config.reset_token_ttl_minutes));
        Self {
            config: Arc::new(config),
            users,
            projects,
            storage,
            mailer,
            jwt,
            reset_tokens,
        }
    }
}
