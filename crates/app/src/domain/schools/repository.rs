//! Schools Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::domain::{
    academic::AcademicSession,
    schools::records::{NewSchool, SchoolRecord, SchoolUuid},
    users::{create_user, data::NewUser, decode_error, records::UserRecord},
};

const FIND_SCHOOL_SQL: &str = include_str!("sql/find_school.sql");
const CREATE_SCHOOL_SQL: &str = include_str!("sql/create_school.sql");
const MARK_SCHOOL_PAID_SQL: &str = include_str!("sql/mark_school_paid.sql");
const EXPIRE_SUBSCRIPTIONS_SQL: &str = include_str!("sql/expire_subscriptions.sql");

/// School rows in Postgres.
#[derive(Debug, Clone)]
pub struct PgSchoolsRepository {
    pool: PgPool,
}

impl PgSchoolsRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchoolsRepository for PgSchoolsRepository {
    async fn find_school(&self, school: SchoolUuid) -> Result<Option<SchoolRecord>, sqlx::Error> {
        query_as::<Postgres, SchoolRecord>(FIND_SCHOOL_SQL)
            .bind(school.into_uuid())
            .fetch_optional(&self.pool)
            .await
    }

    async fn register_school(
        &self,
        school: NewSchool,
        admin: NewUser,
    ) -> Result<(SchoolRecord, UserRecord), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let created_school = query_as::<Postgres, SchoolRecord>(CREATE_SCHOOL_SQL)
            .bind(school.uuid.into_uuid())
            .bind(&school.code)
            .bind(&school.name)
            .bind(&school.address)
            .bind(school.current_session.as_ref().map(AcademicSession::as_str))
            .fetch_one(&mut *tx)
            .await?;

        let created_admin = create_user(&mut *tx, &admin).await?;

        tx.commit().await?;

        Ok((created_school, created_admin))
    }

    async fn mark_school_paid(
        &self,
        school: SchoolUuid,
        paid_at: Timestamp,
        expires_at: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MARK_SCHOOL_PAID_SQL)
            .bind(school.into_uuid())
            .bind(SqlxTimestamp::from(paid_at))
            .bind(SqlxTimestamp::from(expires_at))
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn expire_subscriptions(&self, now: Timestamp) -> Result<u64, sqlx::Error> {
        let rows_affected = query(EXPIRE_SUBSCRIPTIONS_SQL)
            .bind(SqlxTimestamp::from(now))
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

/// School persistence and subscription state.
#[automock]
#[async_trait]
pub trait SchoolsRepository: Send + Sync {
    async fn find_school(&self, school: SchoolUuid) -> Result<Option<SchoolRecord>, sqlx::Error>;

    /// Create a school and its first admin atomically.
    async fn register_school(
        &self,
        school: NewSchool,
        admin: NewUser,
    ) -> Result<(SchoolRecord, UserRecord), sqlx::Error>;

    /// Returns the number of rows updated; zero when the school does not exist.
    async fn mark_school_paid(
        &self,
        school: SchoolUuid,
        paid_at: Timestamp,
        expires_at: Timestamp,
    ) -> Result<u64, sqlx::Error>;

    /// Flip every paid school whose subscription ended at or before `now` to unpaid.
    async fn expire_subscriptions(&self, now: Timestamp) -> Result<u64, sqlx::Error>;
}

impl<'r> FromRow<'r, PgRow> for SchoolRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let current_session = row
            .try_get::<Option<String>, _>("current_session")?
            .map(|raw| raw.parse::<AcademicSession>())
            .transpose()
            .map_err(|error| decode_error("current_session", error))?;

        Ok(Self {
            uuid: SchoolUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            current_session,
            image_url: row.try_get("image_url")?,
            paid: row.try_get("paid")?,
            payment_date: row
                .try_get::<Option<SqlxTimestamp>, _>("payment_date")?
                .map(SqlxTimestamp::to_jiff),
            subscription_expires_at: row
                .try_get::<Option<SqlxTimestamp>, _>("subscription_expires_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
