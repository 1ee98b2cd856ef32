//! Invites service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    auth::PasswordError,
    integrations::{MailerError, ObjectStorageError},
};

/// Malformed or inconsistent input; nothing was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InviteValidationError {
    #[error("at least one user is required")]
    EmptyBatch,

    #[error("email {0} appears more than once")]
    DuplicateEmail(String),

    #[error("matric number {0} appears more than once")]
    DuplicateMatricNumber(String),

    #[error("every user needs a name")]
    MissingName,

    #[error("{0} is not a valid email")]
    InvalidEmail(String),

    #[error("only students and teachers can be invited, got {0}")]
    UnsupportedRole(String),

    #[error("every user needs a session")]
    MissingSession,

    #[error("session {0} must look like 2024/2025")]
    InvalidSession(String),

    #[error("students need a class name")]
    MissingClassName,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("password must be at least {0} characters")]
    PasswordTooShort(usize),
}

/// Errors returned by [`InvitesService`](crate::domain::invites::InvitesService).
#[derive(Debug, Error)]
pub enum InvitesServiceError {
    #[error(transparent)]
    Validation(#[from] InviteValidationError),

    #[error("a user with email {0} already exists")]
    EmailTaken(String),

    #[error("matric number {0} is already in use in this school")]
    MatricNumberTaken(String),

    #[error("invite has already been used")]
    AlreadyUsed,

    #[error("invite has expired")]
    Expired,

    #[error("not allowed to manage this invite")]
    Forbidden,

    #[error("invite not found")]
    NotFound,

    #[error("invite already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("invite expiry is out of range")]
    ExpiryOutOfRange(#[source] jiff::Error),

    #[error("failed to send invite email")]
    Mailer(#[source] MailerError),

    #[error("failed to store profile image")]
    Storage(#[source] ObjectStorageError),

    #[error("password processing error")]
    Password(#[from] PasswordError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for InvitesServiceError {
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

impl From<MailerError> for InvitesServiceError {
    fn from(error: MailerError) -> Self {
        Self::Mailer(error)
    }
}

impl From<ObjectStorageError> for InvitesServiceError {
    fn from(error: ObjectStorageError) -> Self {
        Self::Storage(error)
    }
}
