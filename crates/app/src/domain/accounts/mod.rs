//! Accounts

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::{AccountValidationError, AccountsServiceError};
pub use repository::{MockOtpsRepository, OtpsRepository, PgOtpsRepository};
pub use service::*;
