//! Courses

pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::{CourseValidationError, CoursesServiceError};
pub use repository::{CoursesRepository, MockCoursesRepository, PgCoursesRepository};
pub use service::*;
