//! Invites Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::like_pattern,
    domain::{
        invites::{
            data::{NewInvite, ValidatedInvite},
            records::{InviteRecord, InviteUuid},
        },
        schools::records::SchoolUuid,
        users::{
            create_user,
            data::NewUser,
            records::{UserRecord, UserUuid},
            role_details_from_row,
        },
    },
};

const CREATE_INVITE_SQL: &str = include_str!("sql/create_invite.sql");
const FIND_INVITE_SQL: &str = include_str!("sql/find_invite.sql");
const FIND_INVITE_BY_TOKEN_SQL: &str = include_str!("sql/find_invite_by_token.sql");
const LIST_INVITES_SQL: &str = include_str!("sql/list_invites.sql");
const UPDATE_INVITE_SQL: &str = include_str!("sql/update_invite.sql");
const DELETE_INVITE_SQL: &str = include_str!("sql/delete_invite.sql");
const MARK_INVITE_USED_SQL: &str = include_str!("sql/mark_invite_used.sql");

/// Storage-level listing query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InviteQuery {
    pub matric_number: Option<String>,
    pub created_from: Option<Timestamp>,
    pub created_to: Option<Timestamp>,
    pub before: Option<InviteUuid>,
    pub limit: i64,
}

/// Invite rows in Postgres.
#[derive(Debug, Clone)]
pub struct PgInvitesRepository {
    pool: PgPool,
}

impl PgInvitesRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitesRepository for PgInvitesRepository {
    async fn create_invite(&self, invite: NewInvite) -> Result<InviteRecord, sqlx::Error> {
        let columns = invite.details.columns();

        query_as::<Postgres, InviteRecord>(CREATE_INVITE_SQL)
            .bind(invite.uuid.into_uuid())
            .bind(&invite.token)
            .bind(invite.school_uuid.into_uuid())
            .bind(invite.created_by.into_uuid())
            .bind(&invite.email)
            .bind(&invite.name)
            .bind(invite.details.role().as_str())
            .bind(columns.matric_number)
            .bind(columns.department)
            .bind(columns.program)
            .bind(columns.academic_session)
            .bind(columns.class_name)
            .bind(SqlxTimestamp::from(invite.expires_at))
            .fetch_one(&self.pool)
            .await
    }

    async fn find_invite(
        &self,
        school: SchoolUuid,
        invite: InviteUuid,
    ) -> Result<Option<InviteRecord>, sqlx::Error> {
        query_as::<Postgres, InviteRecord>(FIND_INVITE_SQL)
            .bind(school.into_uuid())
            .bind(invite.into_uuid())
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_invite_by_token(&self, token: &str) -> Result<Option<InviteRecord>, sqlx::Error> {
        query_as::<Postgres, InviteRecord>(FIND_INVITE_BY_TOKEN_SQL)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_invites(
        &self,
        school: SchoolUuid,
        filter: InviteQuery,
    ) -> Result<Vec<InviteRecord>, sqlx::Error> {
        query_as::<Postgres, InviteRecord>(LIST_INVITES_SQL)
            .bind(school.into_uuid())
            .bind(filter.matric_number.as_deref().map(like_pattern))
            .bind(filter.created_from.map(SqlxTimestamp::from))
            .bind(filter.created_to.map(SqlxTimestamp::from))
            .bind(filter.before.map(InviteUuid::into_uuid))
            .bind(filter.limit)
            .fetch_all(&self.pool)
            .await
    }

    async fn update_invite(
        &self,
        invite: InviteUuid,
        fields: ValidatedInvite,
    ) -> Result<Option<InviteRecord>, sqlx::Error> {
        let columns = fields.details.columns();

        query_as::<Postgres, InviteRecord>(UPDATE_INVITE_SQL)
            .bind(invite.into_uuid())
            .bind(&fields.name)
            .bind(&fields.email)
            .bind(columns.matric_number)
            .bind(columns.department)
            .bind(columns.program)
            .bind(columns.academic_session)
            .bind(columns.class_name)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_invite(&self, invite: InviteUuid) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_INVITE_SQL)
            .bind(invite.into_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn redeem_invite(
        &self,
        invite: InviteUuid,
        user: NewUser,
    ) -> Result<Option<UserRecord>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let marked: Option<Uuid> = query_scalar(MARK_INVITE_USED_SQL)
            .bind(invite.into_uuid())
            .fetch_optional(&mut *tx)
            .await?;

        if marked.is_none() {
            tx.rollback().await?;

            return Ok(None);
        }

        let created = create_user(&mut *tx, &user).await?;

        tx.commit().await?;

        Ok(Some(created))
    }
}

/// Invite persistence and redemption.
#[automock]
#[async_trait]
pub trait InvitesRepository: Send + Sync {
    async fn create_invite(&self, invite: NewInvite) -> Result<InviteRecord, sqlx::Error>;

    /// An invite of `school`; invites of other schools are not visible.
    async fn find_invite(
        &self,
        school: SchoolUuid,
        invite: InviteUuid,
    ) -> Result<Option<InviteRecord>, sqlx::Error>;

    async fn find_invite_by_token(&self, token: &str) -> Result<Option<InviteRecord>, sqlx::Error>;

    /// Newest first.
    async fn list_invites(
        &self,
        school: SchoolUuid,
        filter: InviteQuery,
    ) -> Result<Vec<InviteRecord>, sqlx::Error>;

    /// `None` when the invite is gone or was used in the meantime.
    async fn update_invite(
        &self,
        invite: InviteUuid,
        fields: ValidatedInvite,
    ) -> Result<Option<InviteRecord>, sqlx::Error>;

    /// Deletes only an unused invite.
    async fn delete_invite(&self, invite: InviteUuid) -> Result<u64, sqlx::Error>;

    /// Mark the invite used and create its user in one transaction.
    ///
    /// `None` when the invite was already used.
    async fn redeem_invite(
        &self,
        invite: InviteUuid,
        user: NewUser,
    ) -> Result<Option<UserRecord>, sqlx::Error>;
}

impl<'r> FromRow<'r, PgRow> for InviteRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: InviteUuid::from_uuid(row.try_get("uuid")?),
            token: row.try_get("token")?,
            school_uuid: SchoolUuid::from_uuid(row.try_get("school_uuid")?),
            created_by: UserUuid::from_uuid(row.try_get("created_by")?),
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            details: role_details_from_row(row)?,
            expires_at: row.try_get::<SqlxTimestamp, _>("expires_at")?.to_jiff(),
            used: row.try_get("used")?,
            used_at: row
                .try_get::<Option<SqlxTimestamp>, _>("used_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
