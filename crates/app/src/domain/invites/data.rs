//! Invites Data

use jiff::Timestamp;

use crate::domain::{
    invites::records::InviteUuid,
    schools::records::SchoolUuid,
    users::records::{RoleDetails, UserUuid},
};

/// One person an administrator wants to invite, as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InviteEntry {
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: Option<String>,
    pub program: Option<String>,
    pub matric_number: Option<String>,
    pub session: Option<String>,
    pub class_name: Option<String>,
}

/// A validated entry ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInvite {
    pub name: String,
    pub email: String,
    pub details: RoleDetails,
}

/// New Invite Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvite {
    pub uuid: InviteUuid,
    pub token: String,
    pub school_uuid: SchoolUuid,
    pub created_by: UserUuid,
    pub email: String,
    pub name: String,
    pub details: RoleDetails,
    pub expires_at: Timestamp,
}

/// Fields an invite's creator may change while it is unused.
///
/// `None` leaves the stored value as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InviteEdit {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub program: Option<String>,
    pub matric_number: Option<String>,
    pub session: Option<String>,
    pub class_name: Option<String>,
}

/// Invite listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InviteFilter {
    /// Case-insensitive substring of the matric number.
    pub matric_number: Option<String>,

    /// Inclusive lower bound on creation time.
    pub created_from: Option<Timestamp>,

    /// Inclusive upper bound on creation time.
    pub created_to: Option<Timestamp>,

    /// Only invites older than this one.
    pub before: Option<InviteUuid>,

    pub limit: Option<usize>,
}

/// An uploaded profile image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Credentials chosen by the invitee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
    pub image: Option<ProfileImage>,
}
