//! Schools

pub mod records;
mod repository;

pub use repository::{MockSchoolsRepository, PgSchoolsRepository, SchoolsRepository};
