//! Course results.

pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::*;
pub use repository::{MockResultsRepository, PgResultsRepository, ResultsRepository};
pub use service::*;
