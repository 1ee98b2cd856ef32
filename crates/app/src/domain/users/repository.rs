//! Users Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Row, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    auth::PasswordHash,
    domain::{
        academic::AcademicSession,
        schools::records::SchoolUuid,
        users::{
            data::NewUser,
            records::{OwnedRoleColumns, Role, RoleDetails, UserRecord, UserUuid},
        },
    },
};

const FIND_USER_SQL: &str = include_str!("sql/find_user.sql");
const FIND_USER_BY_EMAIL_SQL: &str = include_str!("sql/find_user_by_email.sql");
const FIND_SCHOOL_USERS_SQL: &str = include_str!("sql/find_school_users.sql");
const EXISTING_EMAILS_SQL: &str = include_str!("sql/existing_emails.sql");
const EXISTING_MATRIC_NUMBERS_SQL: &str = include_str!("sql/existing_matric_numbers.sql");
const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const MARK_USER_VERIFIED_SQL: &str = include_str!("sql/mark_user_verified.sql");

/// Unique index on `users (school_uuid, matric_number)`.
pub(crate) const MATRIC_NUMBER_CONSTRAINT: &str = "users_school_matric_number_key";

/// User rows in Postgres.
#[derive(Debug, Clone)]
pub struct PgUsersRepository {
    pool: PgPool,
}

impl PgUsersRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsersRepository for PgUsersRepository {
    async fn find_user(&self, user: UserUuid) -> Result<Option<UserRecord>, sqlx::Error> {
        query_as::<Postgres, UserRecord>(FIND_USER_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        query_as::<Postgres, UserRecord>(FIND_USER_BY_EMAIL_SQL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_school_users(
        &self,
        school: SchoolUuid,
        users: Vec<UserUuid>,
    ) -> Result<Vec<UserRecord>, sqlx::Error> {
        let users: Vec<Uuid> = users.into_iter().map(UserUuid::into_uuid).collect();

        query_as::<Postgres, UserRecord>(FIND_SCHOOL_USERS_SQL)
            .bind(school.into_uuid())
            .bind(users)
            .fetch_all(&self.pool)
            .await
    }

    async fn existing_emails(&self, emails: Vec<String>) -> Result<Vec<String>, sqlx::Error> {
        query_scalar(EXISTING_EMAILS_SQL)
            .bind(emails)
            .fetch_all(&self.pool)
            .await
    }

    async fn existing_matric_numbers(
        &self,
        school: SchoolUuid,
        matric_numbers: Vec<String>,
    ) -> Result<Vec<String>, sqlx::Error> {
        query_scalar(EXISTING_MATRIC_NUMBERS_SQL)
            .bind(school.into_uuid())
            .bind(matric_numbers)
            .fetch_all(&self.pool)
            .await
    }
}

/// User lookups and updates.
#[automock]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_user(&self, user: UserUuid) -> Result<Option<UserRecord>, sqlx::Error>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, sqlx::Error>;

    /// Users of `school` among `users`; unknown or foreign identifiers are skipped.
    async fn find_school_users(
        &self,
        school: SchoolUuid,
        users: Vec<UserUuid>,
    ) -> Result<Vec<UserRecord>, sqlx::Error>;

    /// The subset of `emails` already registered.
    async fn existing_emails(&self, emails: Vec<String>) -> Result<Vec<String>, sqlx::Error>;

    /// The subset of `matric_numbers` already held by a user of `school`.
    async fn existing_matric_numbers(
        &self,
        school: SchoolUuid,
        matric_numbers: Vec<String>,
    ) -> Result<Vec<String>, sqlx::Error>;
}

/// Insert a user on an open connection, usually inside a workflow transaction.
pub(crate) async fn create_user(
    conn: &mut PgConnection,
    user: &NewUser,
) -> Result<UserRecord, sqlx::Error> {
    let columns = user.details.columns();

    query_as::<Postgres, UserRecord>(CREATE_USER_SQL)
        .bind(user.uuid.into_uuid())
        .bind(user.school_uuid.into_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.password_hash.as_str())
        .bind(user.details.role().as_str())
        .bind(user.verified)
        .bind(columns.matric_number)
        .bind(columns.department)
        .bind(columns.program)
        .bind(columns.academic_session)
        .bind(columns.class_name)
        .bind(user.image_url.as_deref())
        .fetch_one(conn)
        .await
}

pub(crate) async fn mark_user_verified(
    conn: &mut PgConnection,
    email: &str,
) -> Result<u64, sqlx::Error> {
    let rows_affected = query(MARK_USER_VERIFIED_SQL)
        .bind(email)
        .execute(conn)
        .await?
        .rows_affected();

    Ok(rows_affected)
}

/// Decode the role column and its role-specific columns into [`RoleDetails`].
pub(crate) fn role_details_from_row(row: &PgRow) -> sqlx::Result<RoleDetails> {
    let role: Role = row
        .try_get::<String, _>("role")?
        .parse()
        .map_err(|error| decode_error("role", error))?;

    let academic_session = row
        .try_get::<Option<String>, _>("academic_session")?
        .map(|raw| raw.parse::<AcademicSession>())
        .transpose()
        .map_err(|error| decode_error("academic_session", error))?;

    let columns = OwnedRoleColumns {
        matric_number: row.try_get("matric_number")?,
        department: row.try_get("department")?,
        program: row.try_get("program")?,
        academic_session,
        class_name: row.try_get("class_name")?,
    };

    RoleDetails::from_columns(role, columns).map_err(|error| decode_error("class_name", error))
}

pub(crate) fn decode_error<E>(column: &str, error: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(error),
    }
}

impl<'r> FromRow<'r, PgRow> for UserRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: UserUuid::from_uuid(row.try_get("uuid")?),
            school_uuid: SchoolUuid::from_uuid(row.try_get("school_uuid")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: PasswordHash::from_phc(row.try_get("password_hash")?),
            details: role_details_from_row(row)?,
            verified: row.try_get("verified")?,
            image_url: row.try_get("image_url")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
