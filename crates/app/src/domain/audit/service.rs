//! Audit service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;
use tracing::warn;

use crate::domain::{
    audit::{
        AuditServiceError,
        records::{AuditLogRecord, AuditLogUuid, NewAuditLog},
        repository::{AuditLogsRepository, PgAuditLogsRepository},
    },
    pagination::{Page, page_size},
    users::records::Actor,
};

/// Best-effort writer for audit entries.
///
/// A failed write is logged and never reaches the caller.
#[derive(Clone)]
pub struct AuditTrail {
    repository: Arc<dyn AuditLogsRepository>,
}

impl std::fmt::Debug for AuditTrail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditTrail").finish_non_exhaustive()
    }
}

impl AuditTrail {
    #[must_use]
    pub fn new(repository: Arc<dyn AuditLogsRepository>) -> Self {
        Self { repository }
    }

    /// Write `entry`, logging instead of failing when storage is down.
    pub async fn record(&self, entry: NewAuditLog) {
        let action = entry.action.clone();
        let actor = entry.actor_uuid;

        if let Err(error) = self.repository.create_log(entry).await {
            warn!(%actor, %action, %error, "failed to write audit log entry");
        }
    }
}

/// Audit log listing over Postgres.
#[derive(Clone)]
pub struct PgAuditService {
    repository: Arc<dyn AuditLogsRepository>,
}

impl std::fmt::Debug for PgAuditService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgAuditService").finish_non_exhaustive()
    }
}

impl PgAuditService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self::from_parts(Arc::new(PgAuditLogsRepository::new(pool)))
    }

    #[must_use]
    pub fn from_parts(repository: Arc<dyn AuditLogsRepository>) -> Self {
        Self { repository }
    }

    /// Best-effort writer sharing this service's repository.
    #[must_use]
    pub fn trail(&self) -> AuditTrail {
        AuditTrail::new(Arc::clone(&self.repository))
    }
}

#[async_trait]
impl AuditService for PgAuditService {
    async fn list_logs(
        &self,
        actor: Actor,
        before: Option<AuditLogUuid>,
        limit: Option<usize>,
    ) -> Result<Page<AuditLogRecord, AuditLogUuid>, AuditServiceError> {
        if !actor.role.is_school_admin() {
            return Err(AuditServiceError::Forbidden);
        }

        let size = page_size(limit);
        let fetch = i64::try_from(size + 1).unwrap_or(i64::MAX);

        let rows = self
            .repository
            .list_logs(actor.school, before, fetch)
            .await?;

        Ok(Page::from_overfetch(rows, size, |log| log.uuid))
    }
}

/// Audit log queries.
#[automock]
#[async_trait]
pub trait AuditService: Send + Sync {
    /// Audit entries of the actor's school, newest first.
    async fn list_logs(
        &self,
        actor: Actor,
        before: Option<AuditLogUuid>,
        limit: Option<usize>,
    ) -> Result<Page<AuditLogRecord, AuditLogUuid>, AuditServiceError>;
}
