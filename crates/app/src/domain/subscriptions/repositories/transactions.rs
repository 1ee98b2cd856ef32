//! Transactions Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::domain::{
    schools::records::SchoolUuid,
    subscriptions::records::{NewTransaction, TransactionRecord, TransactionUuid},
    users::records::UserUuid,
};

const UPSERT_TRANSACTION_SQL: &str = include_str!("../sql/upsert_transaction.sql");
const FIND_TRANSACTION_BY_REFERENCE_SQL: &str =
    include_str!("../sql/find_transaction_by_reference.sql");

/// Payment transaction rows in Postgres.
#[derive(Debug, Clone)]
pub struct PgTransactionsRepository {
    pool: PgPool,
}

impl PgTransactionsRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionsRepository for PgTransactionsRepository {
    async fn upsert_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<TransactionRecord, sqlx::Error> {
        query_as::<Postgres, TransactionRecord>(UPSERT_TRANSACTION_SQL)
            .bind(transaction.uuid.into_uuid())
            .bind(&transaction.reference)
            .bind(transaction.school_uuid.map(SchoolUuid::into_uuid))
            .bind(transaction.user_uuid.map(UserUuid::into_uuid))
            .bind(transaction.payment_type.as_deref())
            .bind(transaction.email.as_deref())
            .bind(transaction.amount)
            .bind(&transaction.currency)
            .bind(&transaction.status)
            .bind(&transaction.metadata)
            .bind(transaction.paid_at.map(SqlxTimestamp::from))
            .fetch_one(&self.pool)
            .await
    }

    async fn find_transaction_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<TransactionRecord>, sqlx::Error> {
        query_as::<Postgres, TransactionRecord>(FIND_TRANSACTION_BY_REFERENCE_SQL)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await
    }
}

/// Payment transaction storage keyed by reference.
#[automock]
#[async_trait]
pub trait TransactionsRepository: Send + Sync {
    /// Insert the charge, or update it in place when its reference was seen before.
    async fn upsert_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<TransactionRecord, sqlx::Error>;

    async fn find_transaction_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<TransactionRecord>, sqlx::Error>;
}

impl<'r> FromRow<'r, PgRow> for TransactionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: TransactionUuid::from_uuid(row.try_get("uuid")?),
            reference: row.try_get("reference")?,
            school_uuid: row
                .try_get::<Option<Uuid>, _>("school_uuid")?
                .map(SchoolUuid::from_uuid),
            user_uuid: row
                .try_get::<Option<Uuid>, _>("user_uuid")?
                .map(UserUuid::from_uuid),
            payment_type: row.try_get("payment_type")?,
            email: row.try_get("email")?,
            amount: row.try_get("amount")?,
            currency: row.try_get("currency")?,
            status: row.try_get("status")?,
            metadata: row.try_get("metadata")?,
            paid_at: row
                .try_get::<Option<SqlxTimestamp>, _>("paid_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
