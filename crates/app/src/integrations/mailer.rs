//! Transactional email delivery.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::SecretString;

/// A rendered email ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Mail delivery failures.
#[derive(Debug, Error)]
pub enum MailerError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response from mail provider: {0}")]
    UnexpectedResponse(String),
}

/// Transactional email delivery.
#[automock]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailerError>;
}

/// Configuration for an HTTP transactional email API.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Endpoint accepting `POST` requests with a JSON message.
    pub api_url: String,

    pub api_key: SecretString,

    /// Sender address, e.g. `"ScholarLink <no-reply@scholarlink.app>"`.
    pub sender: String,
}

/// Mailer backed by a JSON-over-HTTP provider.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    config: MailerConfig,
    http: Client,
}

impl HttpMailer {
    #[must_use]
    pub fn new(config: MailerConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailerError> {
        let body = SendEmailBody {
            from: &self.config.sender,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(self.config.api_key.expose())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(MailerError::UnexpectedResponse(format!(
                "send request failed with status {status}: {text}"
            )));
        }

        debug!(subject = %message.subject, "email accepted by provider");

        Ok(())
    }
}
