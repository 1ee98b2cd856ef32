//! Users

pub mod data;
pub mod records;
mod repository;

pub use repository::{MockUsersRepository, PgUsersRepository, UsersRepository};
pub(crate) use repository::{
    MATRIC_NUMBER_CONSTRAINT, create_user, decode_error, mark_user_verified, role_details_from_row,
};
