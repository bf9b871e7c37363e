use std::fmt;

use serde::Deserialize;

pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com/emails";
pub const DEFAULT_MAIL_FROM: &str = "Giveaway Bot <onboarding@resend.dev>";
pub const DEFAULT_MAIL_TO: &str = "giveaway-operator@example.com";

const REDACTED: &str = "<redacted>";

/// Participant store credentials. Only built when both values are present.
#[derive(Clone, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub key: String,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("key", &REDACTED)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct MailConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub from: String,
    pub to: String,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .field("api_url", &self.api_url)
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: Option<StoreConfig>,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // empty values count as unset
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("APP_PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("APP_PORT {p:?}: {e}"))?,
            None => 8080,
        };

        let store = match (var("STORE_URL"), var("STORE_KEY")) {
            (Some(url), Some(key)) => Some(StoreConfig { url, key }),
            _ => None,
        };

        let mail = MailConfig {
            api_key: var("RESEND_API_KEY"),
            api_url: var("RESEND_API_URL").unwrap_or_else(|| DEFAULT_RESEND_API_URL.into()),
            from: var("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.into()),
            to: var("MAIL_TO").unwrap_or_else(|| DEFAULT_MAIL_TO.into()),
        };

        Ok(Self {
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            store,
            mail,
        })
    }
}
