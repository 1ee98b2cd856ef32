//! Subscription Repositories

mod plans;
mod transactions;

pub use plans::{MockPlansRepository, PgPlansRepository, PlansRepository};
pub use transactions::{MockTransactionsRepository, PgTransactionsRepository, TransactionsRepository};
