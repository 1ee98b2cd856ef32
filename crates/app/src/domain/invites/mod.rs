//! Invites

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;
mod template;
mod validation;

pub use errors::{InviteValidationError, InvitesServiceError};
pub use repository::{InviteQuery, InvitesRepository, MockInvitesRepository, PgInvitesRepository};
pub use service::*;
