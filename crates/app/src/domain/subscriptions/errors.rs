//! Subscriptions service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    domain::subscriptions::records::UnsupportedPaymentType, integrations::PaymentGatewayError,
};

/// Rejected plan input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanValidationError {
    #[error("amount must be positive")]
    NonPositiveAmount,

    #[error("period must be at least one day")]
    NonPositivePeriod,

    #[error("currency must be a three letter code, got {0}")]
    InvalidCurrency(String),
}

/// Errors returned by [`SubscriptionsService`](crate::domain::subscriptions::SubscriptionsService).
#[derive(Debug, Error)]
pub enum SubscriptionsServiceError {
    #[error(transparent)]
    UnsupportedPaymentType(#[from] UnsupportedPaymentType),

    #[error(transparent)]
    InvalidPlan(#[from] PlanValidationError),

    #[error("user or school not found")]
    NotFound,

    #[error("no price configured for {0}")]
    PlanNotFound(String),

    #[error("invalid webhook signature")]
    InvalidSignature,

    #[error("payment gateway error")]
    Gateway(#[source] PaymentGatewayError),

    #[error("record already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for SubscriptionsServiceError {
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

impl From<PaymentGatewayError> for SubscriptionsServiceError {
    fn from(error: PaymentGatewayError) -> Self {
        Self::Gateway(error)
    }
}
