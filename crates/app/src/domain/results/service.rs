//! Results service.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;
use tracing::info;

use crate::domain::{
    academic::{AcademicSession, Term},
    audit::{
        AuditTrail,
        records::{AuditAction, NewAuditLog},
    },
    courses::{
        CoursesRepository, PgCoursesRepository,
        records::{CourseRecord, CourseUuid},
    },
    results::{
        errors::{ResultValidationError, ResultsServiceError},
        records::{MAX_SCORE, NewResult, ResultEntry, ResultRecord, ResultUuid},
        repository::{PgResultsRepository, ResultsRepository},
    },
    users::{
        PgUsersRepository, UsersRepository,
        records::{Actor, Role, UserUuid},
    },
};

/// Result upload and listing over Postgres.
#[derive(Clone)]
pub struct PgResultsService {
    results: Arc<dyn ResultsRepository>,
    courses: Arc<dyn CoursesRepository>,
    users: Arc<dyn UsersRepository>,
    audit: AuditTrail,
}

impl std::fmt::Debug for PgResultsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgResultsService").finish_non_exhaustive()
    }
}

impl PgResultsService {
    #[must_use]
    pub fn new(pool: PgPool, audit: AuditTrail) -> Self {
        Self::from_parts(
            Arc::new(PgResultsRepository::new(pool.clone())),
            Arc::new(PgCoursesRepository::new(pool.clone())),
            Arc::new(PgUsersRepository::new(pool)),
            audit,
        )
    }

    /// Build the service from explicit repositories.
    #[must_use]
    pub fn from_parts(
        results: Arc<dyn ResultsRepository>,
        courses: Arc<dyn CoursesRepository>,
        users: Arc<dyn UsersRepository>,
        audit: AuditTrail,
    ) -> Self {
        Self {
            results,
            courses,
            users,
            audit,
        }
    }

    async fn administered_course(
        &self,
        actor: Actor,
        course: CourseUuid,
    ) -> Result<CourseRecord, ResultsServiceError> {
        let course = self
            .courses
            .find_course(actor.school, course)
            .await?
            .ok_or(ResultsServiceError::NotFound)?;

        if !course.is_admin(actor.user) {
            return Err(ResultsServiceError::Forbidden);
        }

        Ok(course)
    }

    /// Resolve every referenced student and teacher against the actor's school.
    async fn check_people(
        &self,
        actor: Actor,
        rows: &[NewResult],
    ) -> Result<(), ResultsServiceError> {
        let mut wanted: Vec<UserUuid> = rows
            .iter()
            .flat_map(|row| [row.student_uuid, row.teacher_uuid])
            .collect();

        wanted.sort_unstable_by_key(|uuid| uuid.into_uuid());
        wanted.dedup();

        let roles: HashMap<UserUuid, Role> = self
            .users
            .find_school_users(actor.school, wanted)
            .await?
            .into_iter()
            .map(|user| (user.uuid, user.role()))
            .collect();

        for (row, result) in rows.iter().enumerate() {
            if roles.get(&result.student_uuid) != Some(&Role::Student) {
                return Err(ResultValidationError::UnknownStudent {
                    row,
                    student: result.student_uuid,
                }
                .into());
            }

            let credited = roles.get(&result.teacher_uuid).copied();
            let uploader = result.teacher_uuid == actor.user;

            if !uploader && credited != Some(Role::Teacher) {
                return Err(ResultValidationError::UnknownTeacher {
                    row,
                    teacher: result.teacher_uuid,
                }
                .into());
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ResultsService for PgResultsService {
    async fn upload_results(
        &self,
        actor: Actor,
        course: CourseUuid,
        entries: Vec<ResultEntry>,
    ) -> Result<Vec<ResultRecord>, ResultsServiceError> {
        let course = self.administered_course(actor, course).await?;

        if entries.is_empty() {
            return Err(ResultValidationError::EmptyBatch.into());
        }

        let rows = entries
            .into_iter()
            .enumerate()
            .map(|(row, entry)| validate_entry(actor, &course, row, entry))
            .collect::<Result<Vec<_>, _>>()?;

        self.check_people(actor, &rows).await?;

        let stored = self.results.upsert_results(rows).await?;

        self.audit
            .record(
                NewAuditLog::new(actor.user)
                    .school(actor.school)
                    .action(AuditAction::ResultsUploaded)
                    .details(format!("uploaded {} results for {}", stored.len(), course.code)),
            )
            .await;

        info!(course = %course.uuid, count = stored.len(), "results uploaded");

        Ok(stored)
    }

    async fn list_results(
        &self,
        actor: Actor,
        course: CourseUuid,
    ) -> Result<Vec<ResultRecord>, ResultsServiceError> {
        let course = self.administered_course(actor, course).await?;

        Ok(self.results.list_results(actor.school, course.uuid).await?)
    }
}

/// Result upload and listing per course.
#[automock]
#[async_trait]
pub trait ResultsService: Send + Sync {
    /// Validate the whole batch, then upsert it atomically.
    ///
    /// Rows are keyed by student, course, session and term; a later row for
    /// the same key overwrites an earlier one.
    async fn upload_results(
        &self,
        actor: Actor,
        course: CourseUuid,
        entries: Vec<ResultEntry>,
    ) -> Result<Vec<ResultRecord>, ResultsServiceError>;

    async fn list_results(
        &self,
        actor: Actor,
        course: CourseUuid,
    ) -> Result<Vec<ResultRecord>, ResultsServiceError>;
}

fn validate_entry(
    actor: Actor,
    course: &CourseRecord,
    row: usize,
    entry: ResultEntry,
) -> Result<NewResult, ResultValidationError> {
    let academic_session = entry.session.parse::<AcademicSession>().map_err(|_error| {
        ResultValidationError::InvalidSession {
            row,
            value: entry.session.clone(),
        }
    })?;

    let term = entry
        .term
        .parse::<Term>()
        .map_err(|_error| ResultValidationError::InvalidTerm {
            row,
            value: entry.term.clone(),
        })?;

    Ok(NewResult {
        uuid: ResultUuid::new(),
        school_uuid: actor.school,
        student_uuid: entry.student,
        course_uuid: course.uuid,
        academic_session,
        term,
        test_score: score(row, "test", entry.test_score)?,
        exam_score: score(row, "exam", entry.exam_score)?,
        uploaded_by: actor.user,
        teacher_uuid: entry.teacher.unwrap_or(actor.user),
    })
}

fn score(row: usize, field: &'static str, value: i64) -> Result<i16, ResultValidationError> {
    i16::try_from(value)
        .ok()
        .filter(|score| (0..=MAX_SCORE).contains(score))
        .ok_or(ResultValidationError::ScoreOutOfRange {
            row,
            field,
            score: value,
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use jiff::Timestamp;
    use testresult::TestResult;

    use super::*;
    use crate::{
        domain::{
            audit::MockAuditLogsRepository,
            courses::MockCoursesRepository,
            results::repository::MockResultsRepository,
            schools::records::SchoolRecord,
            users::{
                MockUsersRepository,
                records::{RoleDetails, UserRecord},
            },
        },
        test::helpers::{school_record, student_details, user_record},
    };

    struct Harness {
        school: SchoolRecord,
        admin: UserRecord,
        student: UserRecord,
        course: CourseRecord,
    }

    impl Harness {
        fn new() -> Self {
            let school = school_record(true);
            let admin = user_record(&school, RoleDetails::Teacher { department: None });
            let student = user_record(&school, student_details("JSS1"));
            let course = CourseRecord {
                uuid: CourseUuid::new(),
                school_uuid: school.uuid,
                code: "MTH101".to_string(),
                title: "Mathematics".to_string(),
                description: String::new(),
                created_by: admin.uuid,
                admins: vec![admin.uuid],
                created_at: Timestamp::now(),
                updated_at: Timestamp::now(),
            };

            Self {
                school,
                admin,
                student,
                course,
            }
        }

        fn entry(&self, term: &str, test_score: i64, exam_score: i64) -> ResultEntry {
            ResultEntry {
                student: self.student.uuid,
                session: "2024/2025".to_string(),
                term: term.to_string(),
                test_score,
                exam_score,
                teacher: None,
            }
        }

        fn courses(&self) -> MockCoursesRepository {
            let course = self.course.clone();
            let mut courses = MockCoursesRepository::new();
            courses
                .expect_find_course()
                .returning(move |_, _| Ok(Some(course.clone())));

            courses
        }

        fn users(&self) -> MockUsersRepository {
            let people = vec![self.admin.clone(), self.student.clone()];
            let mut users = MockUsersRepository::new();
            users
                .expect_find_school_users()
                .returning(move |_, wanted| {
                    Ok(people
                        .iter()
                        .filter(|user| wanted.contains(&user.uuid))
                        .cloned()
                        .collect())
                });

            users
        }

        fn service(&self, results: MockResultsRepository) -> PgResultsService {
            let mut audit = MockAuditLogsRepository::new();
            audit.expect_create_log().returning(|_| Ok(()));

            PgResultsService::from_parts(
                Arc::new(results),
                Arc::new(self.courses()),
                Arc::new(self.users()),
                AuditTrail::new(Arc::new(audit)),
            )
        }
    }

    fn stored(result: &NewResult) -> ResultRecord {
        ResultRecord {
            uuid: result.uuid,
            school_uuid: result.school_uuid,
            student_uuid: result.student_uuid,
            course_uuid: result.course_uuid,
            academic_session: result.academic_session.clone(),
            term: result.term,
            test_score: result.test_score,
            exam_score: result.exam_score,
            uploaded_by: result.uploaded_by,
            teacher_uuid: result.teacher_uuid,
            approved: false,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn one_bad_score_rejects_the_whole_batch() {
        let harness = Harness::new();

        let mut results = MockResultsRepository::new();
        results.expect_upsert_results().never();

        let service = harness.service(results);

        let outcome = service
            .upload_results(
                harness.admin.actor(),
                harness.course.uuid,
                vec![
                    harness.entry("first", 20, 60),
                    harness.entry("second", 20, 101),
                ],
            )
            .await;

        assert!(matches!(
            outcome,
            Err(ResultsServiceError::Validation(
                ResultValidationError::ScoreOutOfRange {
                    row: 1,
                    field: "exam",
                    score: 101,
                }
            ))
        ));
    }

    #[tokio::test]
    async fn unknown_session_term_or_student_rejects_the_batch() {
        let harness = Harness::new();

        let mut results = MockResultsRepository::new();
        results.expect_upsert_results().never();

        let service = harness.service(results);

        let mut bad_session = harness.entry("first", 10, 10);
        bad_session.session = "2024".to_string();

        let mut stranger = harness.entry("first", 10, 10);
        stranger.student = UserUuid::new();

        let mut teacher_as_student = harness.entry("first", 10, 10);
        teacher_as_student.student = harness.admin.uuid;

        let session = service
            .upload_results(harness.admin.actor(), harness.course.uuid, vec![bad_session])
            .await;
        let term = service
            .upload_results(
                harness.admin.actor(),
                harness.course.uuid,
                vec![harness.entry("fourth", 10, 10)],
            )
            .await;
        let unknown = service
            .upload_results(harness.admin.actor(), harness.course.uuid, vec![stranger])
            .await;
        let wrong_role = service
            .upload_results(
                harness.admin.actor(),
                harness.course.uuid,
                vec![teacher_as_student],
            )
            .await;

        assert!(matches!(
            session,
            Err(ResultsServiceError::Validation(ResultValidationError::InvalidSession { row: 0, .. }))
        ));
        assert!(matches!(
            term,
            Err(ResultsServiceError::Validation(ResultValidationError::InvalidTerm { row: 0, .. }))
        ));
        assert!(matches!(
            unknown,
            Err(ResultsServiceError::Validation(ResultValidationError::UnknownStudent { row: 0, .. }))
        ));
        assert!(matches!(
            wrong_role,
            Err(ResultsServiceError::Validation(ResultValidationError::UnknownStudent { row: 0, .. }))
        ));
    }

    #[tokio::test]
    async fn only_course_admins_upload() {
        let harness = Harness::new();
        let outsider = user_record(&harness.school, RoleDetails::Teacher { department: None });

        let mut results = MockResultsRepository::new();
        results.expect_upsert_results().never();

        let service = harness.service(results);

        let outcome = service
            .upload_results(
                outsider.actor(),
                harness.course.uuid,
                vec![harness.entry("first", 10, 10)],
            )
            .await;

        assert!(matches!(outcome, Err(ResultsServiceError::Forbidden)));
    }

    #[tokio::test]
    async fn reupload_overwrites_by_natural_key() -> TestResult {
        let harness = Harness::new();

        type Key = (UserUuid, CourseUuid, String, Term);

        let table: Arc<Mutex<HashMap<Key, ResultRecord>>> = Arc::default();
        let writer = Arc::clone(&table);

        let mut results = MockResultsRepository::new();
        results.expect_upsert_results().times(2).returning(move |rows| {
            let mut table = writer.lock().map_err(|_error| sqlx::Error::PoolClosed)?;

            Ok(rows
                .iter()
                .map(|row| {
                    let key = (
                        row.student_uuid,
                        row.course_uuid,
                        row.academic_session.as_str().to_string(),
                        row.term,
                    );
                    let record = stored(row);
                    table.insert(key, record.clone());
                    record
                })
                .collect())
        });

        let service = harness.service(results);

        service
            .upload_results(
                harness.admin.actor(),
                harness.course.uuid,
                vec![harness.entry("first", 10, 40)],
            )
            .await?;

        let second = service
            .upload_results(
                harness.admin.actor(),
                harness.course.uuid,
                vec![harness.entry("first", 25, 65)],
            )
            .await?;

        let rows: Vec<ResultRecord> = table
            .lock()
            .map_err(|_error| "poisoned")?
            .values()
            .cloned()
            .collect();

        assert_eq!(rows.len(), 1, "same key should hold one row");
        assert_eq!(rows.first().map(ResultRecord::total), Some(90));
        assert_eq!(second.first().map(|row| row.teacher_uuid), Some(harness.admin.uuid));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs a docker daemon"]
    async fn reupload_against_postgres_keeps_one_row_per_key() -> TestResult {
        use crate::{
            domain::courses::{CoursesService, records::CourseInput},
            test::TestContext,
        };

        let ctx = TestContext::new().await;

        let course = ctx
            .courses
            .create_course(
                ctx.admin.actor(),
                CourseInput {
                    code: "bio201".to_string(),
                    title: "Biology".to_string(),
                    description: String::new(),
                },
            )
            .await?;

        let entry = |test_score, exam_score| ResultEntry {
            student: ctx.student.uuid,
            session: "2024/2025".to_string(),
            term: "second".to_string(),
            test_score,
            exam_score,
            teacher: Some(ctx.teacher.uuid),
        };

        ctx.results
            .upload_results(ctx.admin.actor(), course.uuid, vec![entry(10, 20), entry(15, 25)])
            .await?;
        ctx.results
            .upload_results(ctx.admin.actor(), course.uuid, vec![entry(30, 60)])
            .await?;

        let listed = ctx.results.list_results(ctx.admin.actor(), course.uuid).await?;

        assert_eq!(listed.len(), 1, "one row per student, course, session and term");
        assert_eq!(listed.first().map(ResultRecord::total), Some(90));
        assert_eq!(listed.first().map(|row| row.teacher_uuid), Some(ctx.teacher.uuid));

        Ok(())
    }
}
