//! Plans Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as};

use crate::domain::{
    subscriptions::records::{NewPlan, PaymentType, PlanRecord},
    users::decode_error,
};

const UPSERT_PLAN_SQL: &str = include_str!("../sql/upsert_plan.sql");
const FIND_PLAN_SQL: &str = include_str!("../sql/find_plan.sql");
const LIST_PLANS_SQL: &str = include_str!("../sql/list_plans.sql");

/// Plan rows in Postgres.
#[derive(Debug, Clone)]
pub struct PgPlansRepository {
    pool: PgPool,
}

impl PgPlansRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlansRepository for PgPlansRepository {
    async fn upsert_plan(&self, plan: NewPlan) -> Result<PlanRecord, sqlx::Error> {
        query_as::<Postgres, PlanRecord>(UPSERT_PLAN_SQL)
            .bind(plan.payment_type.as_str())
            .bind(plan.amount)
            .bind(&plan.currency)
            .bind(plan.period_days)
            .fetch_one(&self.pool)
            .await
    }

    async fn find_plan(&self, payment_type: PaymentType) -> Result<Option<PlanRecord>, sqlx::Error> {
        query_as::<Postgres, PlanRecord>(FIND_PLAN_SQL)
            .bind(payment_type.as_str())
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_plans(&self) -> Result<Vec<PlanRecord>, sqlx::Error> {
        query_as::<Postgres, PlanRecord>(LIST_PLANS_SQL)
            .fetch_all(&self.pool)
            .await
    }
}

/// Plan persistence.
#[automock]
#[async_trait]
pub trait PlansRepository: Send + Sync {
    /// Insert or replace the price of a payment type.
    async fn upsert_plan(&self, plan: NewPlan) -> Result<PlanRecord, sqlx::Error>;

    async fn find_plan(&self, payment_type: PaymentType) -> Result<Option<PlanRecord>, sqlx::Error>;

    async fn list_plans(&self) -> Result<Vec<PlanRecord>, sqlx::Error>;
}

impl<'r> FromRow<'r, PgRow> for PlanRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            payment_type: row
                .try_get::<String, _>("payment_type")?
                .parse()
                .map_err(|error| decode_error("payment_type", error))?,
            amount: row.try_get("amount")?,
            currency: row.try_get("currency")?,
            period_days: row.try_get("period_days")?,
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
