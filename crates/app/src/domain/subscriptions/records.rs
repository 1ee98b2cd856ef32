//! Subscription Records

use std::{fmt, str::FromStr};

use jiff::{SignedDuration, Timestamp};
use serde::Serialize;
use thiserror::Error;

use crate::{
    domain::{
        schools::records::SchoolUuid, subscriptions::errors::PlanValidationError,
        users::records::UserUuid,
    },
    uuids::TypedUuid,
};

/// Transaction UUID
pub type TransactionUuid = TypedUuid<TransactionRecord>;

/// Status the gateway reports for a settled charge.
pub const CHARGE_SUCCESS_STATUS: &str = "success";

/// A payment type other than `subscription`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported payment type: {0}")]
pub struct UnsupportedPaymentType(pub String);

/// Things a school can pay for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentType {
    Subscription,
}

impl PaymentType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subscription => "subscription",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = UnsupportedPaymentType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "subscription" => Ok(Self::Subscription),
            other => Err(UnsupportedPaymentType(other.to_string())),
        }
    }
}

/// Price of a payment type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    pub payment_type: PaymentType,

    /// Minor currency units (kobo for NGN).
    pub amount: i64,

    pub currency: String,

    /// Length of the paid window a successful charge opens.
    pub period_days: i32,

    pub updated_at: Timestamp,
}

impl PlanRecord {
    /// How long one payment keeps the school paid.
    #[must_use]
    pub fn period(&self) -> SignedDuration {
        SignedDuration::from_hours(i64::from(self.period_days) * 24)
    }
}

/// New Plan Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlan {
    pub payment_type: PaymentType,
    pub amount: i64,
    pub currency: String,
    pub period_days: i32,
}

impl NewPlan {
    /// Check the amounts and upper-case the currency code.
    ///
    /// # Errors
    ///
    /// Returns an error when the amount or period is not positive, or the
    /// currency is not a three letter code.
    pub fn validated(self) -> Result<Self, PlanValidationError> {
        if self.amount <= 0 {
            return Err(PlanValidationError::NonPositiveAmount);
        }

        if self.period_days <= 0 {
            return Err(PlanValidationError::NonPositivePeriod);
        }

        let currency = self.currency.trim().to_ascii_uppercase();

        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(PlanValidationError::InvalidCurrency(self.currency));
        }

        Ok(Self { currency, ..self })
    }
}

/// A gateway charge, keyed by the gateway's reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub uuid: TransactionUuid,
    pub reference: String,
    pub school_uuid: Option<SchoolUuid>,
    pub user_uuid: Option<UserUuid>,
    pub payment_type: Option<String>,
    pub email: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub status: String,

    /// Raw metadata JSON as the gateway sent it.
    pub metadata: String,

    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Transaction Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub uuid: TransactionUuid,
    pub reference: String,
    pub school_uuid: Option<SchoolUuid>,
    pub user_uuid: Option<UserUuid>,
    pub payment_type: Option<String>,
    pub email: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub metadata: String,
    pub paid_at: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_subscription_is_supported() {
        assert_eq!("subscription".parse(), Ok(PaymentType::Subscription));
        assert_eq!(
            "lifetime".parse::<PaymentType>(),
            Err(UnsupportedPaymentType("lifetime".to_string()))
        );
    }

    #[test]
    fn plan_period_is_whole_days() {
        let plan = PlanRecord {
            payment_type: PaymentType::Subscription,
            amount: 5_000_000,
            currency: "NGN".to_string(),
            period_days: 30,
            updated_at: Timestamp::UNIX_EPOCH,
        };

        assert_eq!(plan.period(), SignedDuration::from_hours(720));
    }
}
