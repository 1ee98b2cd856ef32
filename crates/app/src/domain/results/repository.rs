//! Results Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as};

use crate::domain::{
    academic::{AcademicSession, Term},
    courses::records::CourseUuid,
    results::records::{NewResult, ResultRecord, ResultUuid},
    schools::records::SchoolUuid,
    users::{decode_error, records::UserUuid},
};

const UPSERT_RESULT_SQL: &str = include_str!("sql/upsert_result.sql");
const LIST_RESULTS_SQL: &str = include_str!("sql/list_results.sql");

/// Result rows in Postgres.
#[derive(Debug, Clone)]
pub struct PgResultsRepository {
    pool: PgPool,
}

impl PgResultsRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultsRepository for PgResultsRepository {
    async fn upsert_results(&self, results: Vec<NewResult>) -> Result<Vec<ResultRecord>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(results.len());

        for result in &results {
            let record = query_as::<Postgres, ResultRecord>(UPSERT_RESULT_SQL)
                .bind(result.uuid.into_uuid())
                .bind(result.school_uuid.into_uuid())
                .bind(result.student_uuid.into_uuid())
                .bind(result.course_uuid.into_uuid())
                .bind(result.academic_session.as_str())
                .bind(result.term.as_str())
                .bind(result.test_score)
                .bind(result.exam_score)
                .bind(result.uploaded_by.into_uuid())
                .bind(result.teacher_uuid.into_uuid())
                .fetch_one(&mut *tx)
                .await?;

            stored.push(record);
        }

        tx.commit().await?;

        Ok(stored)
    }

    async fn list_results(
        &self,
        school: SchoolUuid,
        course: CourseUuid,
    ) -> Result<Vec<ResultRecord>, sqlx::Error> {
        query_as::<Postgres, ResultRecord>(LIST_RESULTS_SQL)
            .bind(school.into_uuid())
            .bind(course.into_uuid())
            .fetch_all(&self.pool)
            .await
    }
}

/// Result persistence.
#[automock]
#[async_trait]
pub trait ResultsRepository: Send + Sync {
    /// Upsert every row by its natural key in one transaction, in order.
    async fn upsert_results(&self, results: Vec<NewResult>) -> Result<Vec<ResultRecord>, sqlx::Error>;

    async fn list_results(
        &self,
        school: SchoolUuid,
        course: CourseUuid,
    ) -> Result<Vec<ResultRecord>, sqlx::Error>;
}

impl<'r> FromRow<'r, PgRow> for ResultRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ResultUuid::from_uuid(row.try_get("uuid")?),
            school_uuid: SchoolUuid::from_uuid(row.try_get("school_uuid")?),
            student_uuid: UserUuid::from_uuid(row.try_get("student_uuid")?),
            course_uuid: CourseUuid::from_uuid(row.try_get("course_uuid")?),
            academic_session: row
                .try_get::<String, _>("academic_session")?
                .parse::<AcademicSession>()
                .map_err(|error| decode_error("academic_session", error))?,
            term: row
                .try_get::<String, _>("term")?
                .parse::<Term>()
                .map_err(|error| decode_error("term", error))?,
            test_score: row.try_get("test_score")?,
            exam_score: row.try_get("exam_score")?,
            uploaded_by: UserUuid::from_uuid(row.try_get("uploaded_by")?),
            teacher_uuid: UserUuid::from_uuid(row.try_get("teacher_uuid")?),
            approved: row.try_get("approved")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
