//! Invite Records

use jiff::Timestamp;

use crate::{
    domain::{
        schools::records::SchoolUuid,
        users::records::{Role, RoleDetails, UserUuid},
    },
    uuids::TypedUuid,
};

/// Invite UUID
pub type InviteUuid = TypedUuid<InviteRecord>;

/// A staged, not yet activated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteRecord {
    pub uuid: InviteUuid,
    pub token: String,
    pub school_uuid: SchoolUuid,
    pub created_by: UserUuid,
    pub email: String,
    pub name: String,
    pub details: RoleDetails,
    pub expires_at: Timestamp,
    pub used: bool,
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl InviteRecord {
    #[must_use]
    pub const fn role(&self) -> Role {
        self.details.role()
    }

    /// Whether the invite lapsed at or before `now`.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }
}
