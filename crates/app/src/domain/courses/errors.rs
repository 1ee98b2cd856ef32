//! Courses service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

/// Rejected course input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CourseValidationError {
    #[error("course code is required")]
    MissingCode,

    #[error("course title is required")]
    MissingTitle,

    #[error("only teachers can be course admins")]
    NotATeacher,
}

/// Errors returned by [`CoursesService`](crate::domain::courses::CoursesService).
#[derive(Debug, Error)]
pub enum CoursesServiceError {
    #[error(transparent)]
    Validation(#[from] CourseValidationError),

    #[error("course code {0} already exists in this school")]
    CodeTaken(String),

    #[error("not allowed to manage this course")]
    Forbidden,

    #[error("the course creator cannot be removed")]
    CreatorRemoval,

    #[error("course or user not found")]
    NotFound,

    #[error("course already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CoursesServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation | ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
