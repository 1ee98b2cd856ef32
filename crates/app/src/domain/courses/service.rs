//! Courses service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use sqlx::{
    PgPool,
    error::{DatabaseError, ErrorKind},
};
use tracing::info;

use crate::domain::{
    audit::{
        AuditTrail,
        records::{AuditAction, NewAuditLog},
    },
    courses::{
        errors::{CourseValidationError, CoursesServiceError},
        records::{CourseInput, CourseRecord, CourseUuid, NewCourse},
        repository::{CoursesRepository, PgCoursesRepository},
    },
    users::{
        PgUsersRepository, UsersRepository,
        records::{Actor, Role, UserRecord, UserUuid},
    },
};

/// Course management over Postgres.
#[derive(Clone)]
pub struct PgCoursesService {
    courses: Arc<dyn CoursesRepository>,
    users: Arc<dyn UsersRepository>,
    audit: AuditTrail,
}

impl std::fmt::Debug for PgCoursesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgCoursesService").finish_non_exhaustive()
    }
}

impl PgCoursesService {
    #[must_use]
    pub fn new(pool: PgPool, audit: AuditTrail) -> Self {
        Self::from_parts(
            Arc::new(PgCoursesRepository::new(pool.clone())),
            Arc::new(PgUsersRepository::new(pool)),
            audit,
        )
    }

    /// Build the service from explicit repositories.
    #[must_use]
    pub fn from_parts(
        courses: Arc<dyn CoursesRepository>,
        users: Arc<dyn UsersRepository>,
        audit: AuditTrail,
    ) -> Self {
        Self {
            courses,
            users,
            audit,
        }
    }

    /// A course of the actor's school that the actor administers.
    async fn administered_course(
        &self,
        actor: Actor,
        course: CourseUuid,
    ) -> Result<CourseRecord, CoursesServiceError> {
        let course = self
            .courses
            .find_course(actor.school, course)
            .await?
            .ok_or(CoursesServiceError::NotFound)?;

        if !course.is_admin(actor.user) {
            return Err(CoursesServiceError::Forbidden);
        }

        Ok(course)
    }

    async fn school_teacher(
        &self,
        actor: Actor,
        user: UserUuid,
    ) -> Result<UserRecord, CoursesServiceError> {
        let teacher = self
            .users
            .find_school_users(actor.school, vec![user])
            .await?
            .into_iter()
            .next()
            .ok_or(CoursesServiceError::NotFound)?;

        if teacher.role() != Role::Teacher {
            return Err(CourseValidationError::NotATeacher.into());
        }

        Ok(teacher)
    }
}

#[async_trait]
impl CoursesService for PgCoursesService {
    async fn create_course(
        &self,
        actor: Actor,
        input: CourseInput,
    ) -> Result<CourseRecord, CoursesServiceError> {
        if !actor.role.is_school_admin() {
            return Err(CoursesServiceError::Forbidden);
        }

        let code = input.code.trim().to_uppercase();

        if code.is_empty() {
            return Err(CourseValidationError::MissingCode.into());
        }

        let title = input.title.trim().to_string();

        if title.is_empty() {
            return Err(CourseValidationError::MissingTitle.into());
        }

        let created = self
            .courses
            .create_course(NewCourse {
                uuid: CourseUuid::new(),
                school_uuid: actor.school,
                code: code.clone(),
                title,
                description: input.description.trim().to_string(),
                created_by: actor.user,
            })
            .await;

        let course = match created {
            Ok(course) => course,
            Err(create_error) => {
                let unique_violation = create_error
                    .as_database_error()
                    .map(DatabaseError::kind)
                    .is_some_and(|kind| matches!(kind, ErrorKind::UniqueViolation));

                if unique_violation {
                    return Err(CoursesServiceError::CodeTaken(code));
                }

                return Err(create_error.into());
            }
        };

        self.audit
            .record(
                NewAuditLog::new(actor.user)
                    .school(actor.school)
                    .action(AuditAction::CourseCreated)
                    .details(format!("created course {}", course.code)),
            )
            .await;

        info!(course = %course.uuid, code = %course.code, "course created");

        Ok(course)
    }

    async fn list_courses(&self, actor: Actor) -> Result<Vec<CourseRecord>, CoursesServiceError> {
        Ok(self.courses.list_courses(actor.school).await?)
    }

    async fn assign_course_admin(
        &self,
        actor: Actor,
        course: CourseUuid,
        teacher: UserUuid,
    ) -> Result<CourseRecord, CoursesServiceError> {
        let current = self.administered_course(actor, course).await?;
        let teacher = self.school_teacher(actor, teacher).await?;

        if self.courses.add_course_admin(course, teacher.uuid).await? > 0 {
            self.audit
                .record(
                    NewAuditLog::new(actor.user)
                        .school(actor.school)
                        .action(AuditAction::CourseAdminAssigned)
                        .details(format!("{} now administers {}", teacher.email, current.code)),
                )
                .await;
        }

        self.courses
            .find_course(actor.school, course)
            .await?
            .ok_or(CoursesServiceError::NotFound)
    }

    async fn remove_course_admin(
        &self,
        actor: Actor,
        course: CourseUuid,
        teacher: UserUuid,
    ) -> Result<CourseRecord, CoursesServiceError> {
        let current = self.administered_course(actor, course).await?;

        if teacher == current.created_by {
            return Err(CoursesServiceError::CreatorRemoval);
        }

        if self.courses.remove_course_admin(course, teacher).await? == 0 {
            return Err(CoursesServiceError::NotFound);
        }

        self.audit
            .record(
                NewAuditLog::new(actor.user)
                    .school(actor.school)
                    .action(AuditAction::CourseAdminRemoved)
                    .details(format!("{teacher} no longer administers {}", current.code)),
            )
            .await;

        self.courses
            .find_course(actor.school, course)
            .await?
            .ok_or(CoursesServiceError::NotFound)
    }

    async fn delete_course(
        &self,
        actor: Actor,
        course: CourseUuid,
    ) -> Result<(), CoursesServiceError> {
        let current = self.administered_course(actor, course).await?;

        if self.courses.delete_course(actor.school, course).await? == 0 {
            return Err(CoursesServiceError::NotFound);
        }

        self.audit
            .record(
                NewAuditLog::new(actor.user)
                    .school(actor.school)
                    .action(AuditAction::CourseDeleted)
                    .details(format!("deleted course {}", current.code)),
            )
            .await;

        Ok(())
    }
}

/// Course management per school.
#[automock]
#[async_trait]
pub trait CoursesService: Send + Sync {
    /// Create a course; the creating admin becomes its first course admin.
    async fn create_course(
        &self,
        actor: Actor,
        input: CourseInput,
    ) -> Result<CourseRecord, CoursesServiceError>;

    async fn list_courses(&self, actor: Actor) -> Result<Vec<CourseRecord>, CoursesServiceError>;

    /// Let a teacher of the same school manage the course.
    async fn assign_course_admin(
        &self,
        actor: Actor,
        course: CourseUuid,
        teacher: UserUuid,
    ) -> Result<CourseRecord, CoursesServiceError>;

    async fn remove_course_admin(
        &self,
        actor: Actor,
        course: CourseUuid,
        teacher: UserUuid,
    ) -> Result<CourseRecord, CoursesServiceError>;

    async fn delete_course(
        &self,
        actor: Actor,
        course: CourseUuid,
    ) -> Result<(), CoursesServiceError>;
}
