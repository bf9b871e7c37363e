use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::MailConfig;
use crate::html::escape;
use crate::participants::repo_types::NewParticipant;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("email provider api key is not configured")]
    NotConfigured,
    #[error("email transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("email provider rejected message ({status}): {body}")]
    Provider { status: u16, body: String },
}

/// One outgoing message in the shape the provider API accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Sends through the Resend HTTP API.
#[derive(Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl ResendMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    #[instrument(skip(self, email), fields(subject = %email.subject))]
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let api_key = self.api_key.as_deref().ok_or(MailError::NotConfigured)?;

        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(email)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(MailError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        debug!(%status, "email accepted by provider");
        Ok(())
    }
}

fn or_na(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => escape(v),
        _ => "N/A".to_string(),
    }
}

/// Builds the operator notification for a new entry.
pub fn entry_email(config: &MailConfig, entry: &NewParticipant) -> Email {
    let html = format!(
        "\n<h2>New participant!</h2>\
         \n<p><strong>Name:</strong> {name}</p>\
         \n<p><strong>Email:</strong> {email}</p>\
         \n<p><strong>Phone:</strong> {phone}</p>\
         \n<p><strong>Kick:</strong> {kick}</p>\
         \n<p><strong>Serial #:</strong> <code>{serial}</code></p>\n",
        name = escape(&entry.name),
        email = escape(&entry.email),
        phone = or_na(entry.phone.as_deref()),
        kick = or_na(entry.kick_username.as_deref()),
        serial = escape(&entry.serial_number),
    );

    Email {
        from: config.from.clone(),
        to: vec![config.to.clone()],
        subject: format!("🎮 New Giveaway Entry – {}", entry.serial_number),
        html,
    }
}

/// Sends the notification for `entry` to the configured operator address.
pub async fn notify_entry(
    mailer: &dyn Mailer,
    config: &MailConfig,
    entry: &NewParticipant,
) -> Result<(), MailError> {
    mailer.send(&entry_email(config, entry)).await
}
