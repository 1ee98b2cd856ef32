//! Audit Logs Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::{
    audit::records::{AuditLogRecord, AuditLogUuid, NewAuditLog},
    schools::records::SchoolUuid,
    users::records::UserUuid,
};

const CREATE_AUDIT_LOG_SQL: &str = include_str!("sql/create_audit_log.sql");
const LIST_AUDIT_LOGS_SQL: &str = include_str!("sql/list_audit_logs.sql");

/// Audit log rows in Postgres.
#[derive(Debug, Clone)]
pub struct PgAuditLogsRepository {
    pool: PgPool,
}

impl PgAuditLogsRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogsRepository for PgAuditLogsRepository {
    async fn create_log(&self, entry: NewAuditLog) -> Result<(), sqlx::Error> {
        query(CREATE_AUDIT_LOG_SQL)
            .bind(AuditLogUuid::new().into_uuid())
            .bind(entry.actor_uuid.into_uuid())
            .bind(entry.school_uuid.map(SchoolUuid::into_uuid))
            .bind(&entry.action)
            .bind(&entry.details)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_logs(
        &self,
        school: SchoolUuid,
        before: Option<AuditLogUuid>,
        limit: i64,
    ) -> Result<Vec<AuditLogRecord>, sqlx::Error> {
        query_as::<Postgres, AuditLogRecord>(LIST_AUDIT_LOGS_SQL)
            .bind(school.into_uuid())
            .bind(before.map(AuditLogUuid::into_uuid))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
    }
}

/// Append-only audit log storage.
#[automock]
#[async_trait]
pub trait AuditLogsRepository: Send + Sync {
    async fn create_log(&self, entry: NewAuditLog) -> Result<(), sqlx::Error>;

    /// Newest first, strictly older than `before` when given.
    async fn list_logs(
        &self,
        school: SchoolUuid,
        before: Option<AuditLogUuid>,
        limit: i64,
    ) -> Result<Vec<AuditLogRecord>, sqlx::Error>;
}

impl<'r> FromRow<'r, PgRow> for AuditLogRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: AuditLogUuid::from_uuid(row.try_get("uuid")?),
            actor_uuid: UserUuid::from_uuid(row.try_get("actor_uuid")?),
            school_uuid: row
                .try_get::<Option<Uuid>, _>("school_uuid")?
                .map(SchoolUuid::from_uuid),
            action: row.try_get("action")?,
            details: row.try_get("details")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
