//! Courses Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::{
    courses::records::{CourseRecord, CourseUuid, NewCourse},
    schools::records::SchoolUuid,
    users::records::UserUuid,
};

const CREATE_COURSE_SQL: &str = include_str!("sql/create_course.sql");
const FIND_COURSE_SQL: &str = include_str!("sql/find_course.sql");
const LIST_COURSES_SQL: &str = include_str!("sql/list_courses.sql");
const ADD_COURSE_ADMIN_SQL: &str = include_str!("sql/add_course_admin.sql");
const REMOVE_COURSE_ADMIN_SQL: &str = include_str!("sql/remove_course_admin.sql");
const DELETE_COURSE_SQL: &str = include_str!("sql/delete_course.sql");

/// Course and course admin rows in Postgres.
#[derive(Debug, Clone)]
pub struct PgCoursesRepository {
    pool: PgPool,
}

impl PgCoursesRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CoursesRepository for PgCoursesRepository {
    async fn create_course(&self, course: NewCourse) -> Result<CourseRecord, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        query(CREATE_COURSE_SQL)
            .bind(course.uuid.into_uuid())
            .bind(course.school_uuid.into_uuid())
            .bind(&course.code)
            .bind(&course.title)
            .bind(&course.description)
            .bind(course.created_by.into_uuid())
            .execute(&mut *tx)
            .await?;

        query(ADD_COURSE_ADMIN_SQL)
            .bind(course.uuid.into_uuid())
            .bind(course.created_by.into_uuid())
            .execute(&mut *tx)
            .await?;

        let created = query_as::<Postgres, CourseRecord>(FIND_COURSE_SQL)
            .bind(course.school_uuid.into_uuid())
            .bind(course.uuid.into_uuid())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn find_course(
        &self,
        school: SchoolUuid,
        course: CourseUuid,
    ) -> Result<Option<CourseRecord>, sqlx::Error> {
        query_as::<Postgres, CourseRecord>(FIND_COURSE_SQL)
            .bind(school.into_uuid())
            .bind(course.into_uuid())
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_courses(&self, school: SchoolUuid) -> Result<Vec<CourseRecord>, sqlx::Error> {
        query_as::<Postgres, CourseRecord>(LIST_COURSES_SQL)
            .bind(school.into_uuid())
            .fetch_all(&self.pool)
            .await
    }

    async fn add_course_admin(&self, course: CourseUuid, user: UserUuid) -> Result<u64, sqlx::Error> {
        let rows_affected = query(ADD_COURSE_ADMIN_SQL)
            .bind(course.into_uuid())
            .bind(user.into_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn remove_course_admin(
        &self,
        course: CourseUuid,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(REMOVE_COURSE_ADMIN_SQL)
            .bind(course.into_uuid())
            .bind(user.into_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn delete_course(&self, school: SchoolUuid, course: CourseUuid) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_COURSE_SQL)
            .bind(school.into_uuid())
            .bind(course.into_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

/// Course persistence.
#[automock]
#[async_trait]
pub trait CoursesRepository: Send + Sync {
    /// Create a course with its creator as the first admin.
    async fn create_course(&self, course: NewCourse) -> Result<CourseRecord, sqlx::Error>;

    async fn find_course(
        &self,
        school: SchoolUuid,
        course: CourseUuid,
    ) -> Result<Option<CourseRecord>, sqlx::Error>;

    async fn list_courses(&self, school: SchoolUuid) -> Result<Vec<CourseRecord>, sqlx::Error>;

    /// Zero when the user already was an admin.
    async fn add_course_admin(&self, course: CourseUuid, user: UserUuid) -> Result<u64, sqlx::Error>;

    async fn remove_course_admin(
        &self,
        course: CourseUuid,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error>;

    async fn delete_course(&self, school: SchoolUuid, course: CourseUuid) -> Result<u64, sqlx::Error>;
}

impl<'r> FromRow<'r, PgRow> for CourseRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CourseUuid::from_uuid(row.try_get("uuid")?),
            school_uuid: SchoolUuid::from_uuid(row.try_get("school_uuid")?),
            code: row.try_get("code")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            created_by: UserUuid::from_uuid(row.try_get("created_by")?),
            admins: row
                .try_get::<Vec<Uuid>, _>("admins")?
                .into_iter()
                .map(UserUuid::from_uuid)
                .collect(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
