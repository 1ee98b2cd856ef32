//! Subscriptions

pub mod errors;
pub mod records;
mod repositories;
pub mod service;
mod webhook;

pub use errors::{PlanValidationError, SubscriptionsServiceError};
pub use repositories::{
    MockPlansRepository, MockTransactionsRepository, PgPlansRepository, PgTransactionsRepository,
    PlansRepository, TransactionsRepository,
};
pub use service::*;
pub use webhook::CHARGE_SUCCESS_EVENT;
