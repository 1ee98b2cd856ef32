//! Accounts service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{auth::PasswordError, integrations::MailerError};

/// Rejected account input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountValidationError {
    #[error("school name is required")]
    MissingSchoolName,

    #[error("admin name is required")]
    MissingName,

    #[error("{0} is not a valid email")]
    InvalidEmail(String),

    #[error("password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("session {0} must look like 2024/2025")]
    InvalidSession(String),

    #[error("invalid verification code")]
    InvalidCode,

    #[error("verification code has expired")]
    ExpiredCode,
}

/// Errors returned by [`AccountsService`](crate::domain::accounts::AccountsService).
#[derive(Debug, Error)]
pub enum AccountsServiceError {
    #[error(transparent)]
    Validation(#[from] AccountValidationError),

    #[error("a user with email {0} already exists")]
    EmailTaken(String),

    #[error("account not found")]
    NotFound,

    #[error("account already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("verification code expiry is out of range")]
    ExpiryOutOfRange(#[source] jiff::Error),

    #[error("failed to send verification email")]
    Mailer(#[source] MailerError),

    #[error("password processing error")]
    Password(#[from] PasswordError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for AccountsServiceError {
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

impl From<MailerError> for AccountsServiceError {
    fn from(error: MailerError) -> Self {
        Self::Mailer(error)
    }
}
