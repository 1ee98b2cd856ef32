//! Auth data models.

use jiff::Timestamp;
use uuid::Uuid;

use crate::{
    auth::SessionTokenVersion,
    domain::{
        schools::records::SchoolRecord,
        users::records::{Actor, UserRecord, UserUuid},
    },
};

/// Sign-in session persisted in storage.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub uuid: Uuid,
    pub user_uuid: UserUuid,
    pub version: SessionTokenVersion,

    /// HMAC verifier for the token secret material.
    pub token_hash: String,

    pub expires_at: Timestamp,
    pub last_used_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// New session persistence payload.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub uuid: Uuid,
    pub user_uuid: UserUuid,
    pub version: SessionTokenVersion,
    pub token_hash: String,
    pub expires_at: Timestamp,
}

/// Session issuance result with the one-time raw token.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: Timestamp,
    pub user: UserRecord,
}

/// A verified session together with the user and school it belongs to.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub session_uuid: Uuid,
    pub user: UserRecord,
    pub school: SchoolRecord,
}

impl AuthenticatedSession {
    /// The authorization view of this session's user.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        self.user.actor()
    }
}
