//! OTP Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as, query_scalar};

use crate::domain::{
    accounts::records::{NewOtp, OtpRecord},
    users::mark_user_verified,
};

const REPLACE_OTP_SQL: &str = include_str!("sql/replace_otp.sql");
const FIND_OTP_SQL: &str = include_str!("sql/find_otp.sql");
const CONSUME_OTP_SQL: &str = include_str!("sql/consume_otp.sql");

/// One-time password rows in Postgres.
#[derive(Debug, Clone)]
pub struct PgOtpsRepository {
    pool: PgPool,
}

impl PgOtpsRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpsRepository for PgOtpsRepository {
    async fn replace_otp(&self, otp: NewOtp) -> Result<OtpRecord, sqlx::Error> {
        query_as::<Postgres, OtpRecord>(REPLACE_OTP_SQL)
            .bind(&otp.email)
            .bind(&otp.code_hash)
            .bind(SqlxTimestamp::from(otp.expires_at))
            .fetch_one(&self.pool)
            .await
    }

    async fn find_otp(&self, email: &str) -> Result<Option<OtpRecord>, sqlx::Error> {
        query_as::<Postgres, OtpRecord>(FIND_OTP_SQL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn consume_otp(
        &self,
        email: &str,
        code_hash: &str,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let consumed: Option<String> = query_scalar(CONSUME_OTP_SQL)
            .bind(email)
            .bind(code_hash)
            .bind(SqlxTimestamp::from(now))
            .fetch_optional(&mut *tx)
            .await?;

        if consumed.is_none() {
            tx.rollback().await?;

            return Ok(false);
        }

        mark_user_verified(&mut *tx, email).await?;

        tx.commit().await?;

        Ok(true)
    }
}

/// One-time password storage.
#[automock]
#[async_trait]
pub trait OtpsRepository: Send + Sync {
    /// Store a code for the email, replacing whatever code it had.
    async fn replace_otp(&self, otp: NewOtp) -> Result<OtpRecord, sqlx::Error>;

    async fn find_otp(&self, email: &str) -> Result<Option<OtpRecord>, sqlx::Error>;

    /// Delete a matching live code and mark its user verified in one transaction.
    ///
    /// `false` when no live code with that hash exists.
    async fn consume_otp(
        &self,
        email: &str,
        code_hash: &str,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error>;
}

impl<'r> FromRow<'r, PgRow> for OtpRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            email: row.try_get("email")?,
            code_hash: row.try_get("code_hash")?,
            expires_at: row.try_get::<SqlxTimestamp, _>("expires_at")?.to_jiff(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
