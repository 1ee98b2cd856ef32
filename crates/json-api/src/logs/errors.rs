//! Audit Log Errors

use scholarlink_app::domain::audit::AuditServiceError;

use crate::errors::ApiError;

pub(crate) fn into_api_error(error: AuditServiceError) -> ApiError {
    match error {
        AuditServiceError::Forbidden => {
            ApiError::forbidden("Only school administrators can read the audit log")
        }
        AuditServiceError::Sql(source) => ApiError::internal("audit log query failed", &source),
    }
}
