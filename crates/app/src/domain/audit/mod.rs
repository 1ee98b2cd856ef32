//! Audit Log

pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::AuditServiceError;
pub use repository::{AuditLogsRepository, MockAuditLogsRepository, PgAuditLogsRepository};
pub use service::*;
