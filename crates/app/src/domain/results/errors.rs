//! Results service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::users::records::UserUuid;

/// A rejected upload; `row` is the zero-based position in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResultValidationError {
    #[error("at least one result is required")]
    EmptyBatch,

    #[error("row {row}: session {value} must look like 2024/2025")]
    InvalidSession { row: usize, value: String },

    #[error("row {row}: term {value} must be first, second or third")]
    InvalidTerm { row: usize, value: String },

    #[error("row {row}: {field} score {score} must be between 0 and 100")]
    ScoreOutOfRange {
        row: usize,
        field: &'static str,
        score: i64,
    },

    #[error("row {row}: {student} is not a student of this school")]
    UnknownStudent { row: usize, student: UserUuid },

    #[error("row {row}: {teacher} is not a teacher of this school")]
    UnknownTeacher { row: usize, teacher: UserUuid },
}

/// Errors returned by [`ResultsService`](crate::domain::results::ResultsService).
#[derive(Debug, Error)]
pub enum ResultsServiceError {
    #[error(transparent)]
    Validation(#[from] ResultValidationError),

    #[error("not allowed to manage results of this course")]
    Forbidden,

    #[error("course not found")]
    NotFound,

    #[error("result already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for ResultsServiceError {
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
