//! Users Data

use crate::{
    auth::PasswordHash,
    domain::{
        schools::records::SchoolUuid,
        users::records::{RoleDetails, UserUuid},
    },
};

/// New User Data
#[derive(Debug, Clone)]
pub struct NewUser {
    pub uuid: UserUuid,
    pub school_uuid: SchoolUuid,
    pub name: String,
    pub email: String,
    pub password_hash: PasswordHash,
    pub details: RoleDetails,
    pub verified: bool,
    pub image_url: Option<String>,
}
