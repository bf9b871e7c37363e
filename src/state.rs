use std::sync::Arc;

use crate::config::AppConfig;
use crate::mailer::{Mailer, ResendMailer};
use crate::participants::repo::{init_store, ParticipantStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ParticipantStore>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = init_store(config.store.as_ref()).await?;
        let mailer = Arc::new(ResendMailer::new(&config.mail)?) as Arc<dyn Mailer>;

        if config.mail.api_key.is_none() {
            tracing::warn!("RESEND_API_KEY missing; every submission will fail to notify");
        }

        Ok(Self::from_parts(config, store, mailer))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn ParticipantStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            config,
            store,
            mailer,
        }
    }
}
