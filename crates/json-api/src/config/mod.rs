//! Server configuration module

use clap::Parser;
use jiff::SignedDuration;
use scholarlink_app::{
    context::AppSettings,
    domain::invites::InviteSettings,
    integrations::{MailerConfig, ObjectStorageConfig, PaystackConfig, SecretString},
};

use crate::config::{
    db::DatabaseConfig,
    mail::MailConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    payments::PaymentsConfig,
    scheduler::SchedulerConfig,
    server::ServerRuntimeConfig,
    session::SessionConfig,
    storage::StorageConfig,
};

pub(crate) mod db;
pub(crate) mod mail;
pub(crate) mod observability;
pub(crate) mod payments;
pub(crate) mod scheduler;
pub(crate) mod server;
pub(crate) mod session;
pub(crate) mod storage;

pub(crate) use observability::LogFormat;

/// ScholarLink JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "scholarlink-json", about = "ScholarLink JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Tracing export and request logging settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Session token and cookie settings.
    #[command(flatten)]
    pub session: SessionConfig,

    /// Transactional email and invite link settings.
    #[command(flatten)]
    pub mail: MailConfig,

    /// Profile image storage settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Payment gateway settings.
    #[command(flatten)]
    pub payments: PaymentsConfig,

    /// Subscription expiry sweep settings.
    #[command(flatten)]
    pub scheduler: SchedulerConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Service settings derived from the flattened groups.
    #[must_use]
    pub fn app_settings(&self) -> AppSettings {
        AppSettings {
            session_secret: SecretString::new(self.session.session_secret.clone()),
            session_ttl: SignedDuration::from_hours(i64::from(self.session.session_ttl_hours)),
            mailer: MailerConfig {
                api_url: self.mail.mail_api_url.clone(),
                api_key: SecretString::new(self.mail.mail_api_key.clone()),
                sender: self.mail.mail_sender.clone(),
            },
            storage: ObjectStorageConfig {
                upload_url: self.storage.storage_upload_url.clone(),
                api_key: SecretString::new(self.storage.storage_api_key.clone()),
                public_base_url: self.storage.public_base_url().to_string(),
            },
            paystack: PaystackConfig {
                base_url: self.payments.paystack_base_url.clone(),
                secret_key: SecretString::new(self.payments.paystack_secret_key.clone()),
                callback_url: self.payments.paystack_callback_url.clone(),
            },
            invites: InviteSettings {
                signup_url: self.mail.invite_signup_url.clone(),
                ttl: SignedDuration::from_hours(i64::from(self.mail.invite_ttl_hours)),
            },
        }
    }
}
