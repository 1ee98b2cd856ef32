//! Audit Log Records

use std::fmt;

use jiff::Timestamp;
use serde::Serialize;

use crate::{
    domain::{schools::records::SchoolUuid, users::records::UserUuid},
    uuids::TypedUuid,
};

/// Audit Log UUID
pub type AuditLogUuid = TypedUuid<AuditLogRecord>;

/// Audit Log Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogRecord {
    pub uuid: AuditLogUuid,
    pub actor_uuid: UserUuid,
    pub school_uuid: Option<SchoolUuid>,
    pub action: String,
    pub details: String,
    pub created_at: Timestamp,
}

/// Administrative actions written to the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    SchoolRegistered,
    InviteSent,
    InviteEdited,
    InviteDeleted,
    InviteRedeemed,
    SubscriptionPaid,
    CourseCreated,
    CourseDeleted,
    CourseAdminAssigned,
    CourseAdminRemoved,
    ResultsUploaded,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SchoolRegistered => "SCHOOL_REGISTERED",
            Self::InviteSent => "INVITE_SENT",
            Self::InviteEdited => "INVITE_EDITED",
            Self::InviteDeleted => "INVITE_DELETED",
            Self::InviteRedeemed => "INVITE_REDEEMED",
            Self::SubscriptionPaid => "SUBSCRIPTION_PAID",
            Self::CourseCreated => "COURSE_CREATED",
            Self::CourseDeleted => "COURSE_DELETED",
            Self::CourseAdminAssigned => "COURSE_ADMIN_ASSIGNED",
            Self::CourseAdminRemoved => "COURSE_ADMIN_REMOVED",
            Self::ResultsUploaded => "RESULTS_UPLOADED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// New audit entry. Only the actor is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditLog {
    pub actor_uuid: UserUuid,
    pub school_uuid: Option<SchoolUuid>,
    pub action: String,
    pub details: String,
}

impl NewAuditLog {
    /// Start an entry for `actor_uuid`; the setters fill in the rest.
    #[must_use]
    pub fn new(actor_uuid: UserUuid) -> Self {
        Self {
            actor_uuid,
            school_uuid: None,
            action: String::new(),
            details: String::new(),
        }
    }

    #[must_use]
    pub fn school(mut self, school_uuid: SchoolUuid) -> Self {
        self.school_uuid = Some(school_uuid);
        self
    }

    #[must_use]
    pub fn action(mut self, action: AuditAction) -> Self {
        self.action = action.as_str().to_string();
        self
    }

    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }
}
