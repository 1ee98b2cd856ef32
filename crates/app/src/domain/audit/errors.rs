//! Audit service errors.

use sqlx::Error;
use thiserror::Error;

/// Errors returned by [`AuditService`](crate::domain::audit::AuditService).
#[derive(Debug, Error)]
pub enum AuditServiceError {
    #[error("only school administrators can read the audit log")]
    Forbidden,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for AuditServiceError {
    fn from(error: Error) -> Self {
        Self::Sql(error)
    }
}
