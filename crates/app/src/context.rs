//! App Context

use std::sync::Arc;

use jiff::SignedDuration;
use sqlx::PgPool;
use thiserror::Error;

use crate::{
    auth::{AuthService, PgAuthService, SessionSigningKey},
    database,
    domain::{
        accounts::{AccountsService, PgAccountsService},
        audit::{AuditService, PgAuditService},
        courses::{CoursesService, PgCoursesService},
        invites::{InviteCollaborators, InviteSettings, InvitesService, PgInvitesService},
        results::{PgResultsService, ResultsService},
        subscriptions::{PgSubscriptionsService, SubscriptionsService},
    },
    integrations::{
        HttpMailer, HttpObjectStorage, MailerConfig, ObjectStorageConfig, PaystackClient,
        PaystackConfig, SecretString, WebhookSigner,
    },
};

/// Failures while building the application context.
#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),
}

/// Everything the services need besides the database.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub session_secret: SecretString,
    pub session_ttl: SignedDuration,
    pub mailer: MailerConfig,
    pub storage: ObjectStorageConfig,
    pub paystack: PaystackConfig,
    pub invites: InviteSettings,
}

/// Every service the HTTP layer depends on, behind trait objects.
#[derive(Clone)]
pub struct AppContext {
    pub auth: Arc<dyn AuthService>,
    pub accounts: Arc<dyn AccountsService>,
    pub invites: Arc<dyn InvitesService>,
    pub subscriptions: Arc<dyn SubscriptionsService>,
    pub courses: Arc<dyn CoursesService>,
    pub results: Arc<dyn ResultsService>,
    pub audit: Arc<dyn AuditService>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or applying
    /// migrations fails.
    pub async fn from_database_url(
        url: &str,
        run_migrations: bool,
        settings: AppSettings,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        if run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrate)?;
        }

        Ok(Self::from_pool(pool, settings))
    }

    /// Wire every Postgres-backed service over an existing pool.
    #[must_use]
    pub fn from_pool(pool: PgPool, settings: AppSettings) -> Self {
        let audit = PgAuditService::new(pool.clone());

        let mailer = Arc::new(HttpMailer::new(settings.mailer));
        let storage = Arc::new(HttpObjectStorage::new(settings.storage));
        let signer = WebhookSigner::new(settings.paystack.secret_key.clone());
        let gateway = Arc::new(PaystackClient::new(settings.paystack));

        Self {
            auth: Arc::new(PgAuthService::new(
                pool.clone(),
                SessionSigningKey::new(settings.session_secret),
                settings.session_ttl,
            )),
            accounts: Arc::new(PgAccountsService::new(
                pool.clone(),
                mailer.clone(),
                audit.trail(),
            )),
            invites: Arc::new(PgInvitesService::new(
                pool.clone(),
                InviteCollaborators {
                    mailer,
                    storage,
                    audit: audit.trail(),
                },
                settings.invites,
            )),
            subscriptions: Arc::new(PgSubscriptionsService::new(pool.clone(), gateway, signer)),
            courses: Arc::new(PgCoursesService::new(pool.clone(), audit.trail())),
            results: Arc::new(PgResultsService::new(pool, audit.trail())),
            audit: Arc::new(audit),
        }
    }
}
