//! Test context for service-level integration tests.

use crate::{
    domain::{
        audit::PgAuditService,
        courses::PgCoursesService,
        results::PgResultsService,
        schools::{PgSchoolsRepository, SchoolsRepository, records::SchoolRecord},
        users::{create_user, records::{RoleDetails, UserRecord}},
    },
    test::helpers::{new_school, new_user, student_details},
};

use super::db::TestDb;

/// A migrated database seeded with one school, its admin, a teacher and a student.
pub struct TestContext {
    pub db: TestDb,
    pub school: SchoolRecord,
    pub admin: UserRecord,
    pub teacher: UserRecord,
    pub student: UserRecord,
    pub audit: PgAuditService,
    pub courses: PgCoursesService,
    pub results: PgResultsService,
}

impl TestContext {
    pub async fn new() -> Self {
        let db = TestDb::new().await;
        let pool = db.pool().clone();

        let school = new_school();
        let admin = new_user(school.uuid, RoleDetails::Admin);

        let (school, admin) = PgSchoolsRepository::new(pool.clone())
            .register_school(school, admin)
            .await
            .expect("school should register");

        let teacher = Self::seed_user(&db, &school, RoleDetails::Teacher { department: None }).await;
        let student = Self::seed_user(&db, &school, student_details("JSS1")).await;

        let audit = PgAuditService::new(pool.clone());

        Self {
            courses: PgCoursesService::new(pool.clone(), audit.trail()),
            results: PgResultsService::new(pool, audit.trail()),
            audit,
            school,
            admin,
            teacher,
            student,
            db,
        }
    }

    pub async fn seed_user(db: &TestDb, school: &SchoolRecord, details: RoleDetails) -> UserRecord {
        let mut conn = db.pool().acquire().await.expect("connection should open");

        create_user(&mut *conn, &new_user(school.uuid, details))
            .await
            .expect("user should insert")
    }
}
