//! User Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    auth::PasswordHash,
    domain::{academic::AcademicSession, schools::records::SchoolUuid},
    uuids::TypedUuid,
};

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;

/// A role name that is not admin, teacher or student.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// Account role within a school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
    SuperAdmin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
            Self::SuperAdmin => "superAdmin",
        }
    }

    /// Roles allowed to administer a school.
    #[must_use]
    pub const fn is_school_admin(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "admin" => Ok(Self::Admin),
            "superAdmin" => Ok(Self::SuperAdmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Student-only attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StudentDetails {
    pub matric_number: Option<String>,
    pub department: Option<String>,
    pub program: Option<String>,
    pub academic_session: Option<AcademicSession>,
    pub class_name: String,
}

/// Role together with the attributes that only make sense for that role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleDetails {
    Student(StudentDetails),
    Teacher { department: Option<String> },
    Admin,
    SuperAdmin,
}

impl RoleDetails {
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Student(_) => Role::Student,
            Self::Teacher { .. } => Role::Teacher,
            Self::Admin => Role::Admin,
            Self::SuperAdmin => Role::SuperAdmin,
        }
    }

    /// Matric number, for students that have one.
    #[must_use]
    pub fn matric_number(&self) -> Option<&str> {
        match self {
            Self::Student(details) => details.matric_number.as_deref(),
            _ => None,
        }
    }

    /// Flatten into the nullable column layout used by `users` and `invite_links`.
    #[must_use]
    pub fn columns(&self) -> RoleColumns<'_> {
        match self {
            Self::Student(details) => RoleColumns {
                matric_number: details.matric_number.as_deref(),
                department: details.department.as_deref(),
                program: details.program.as_deref(),
                academic_session: details.academic_session.as_ref().map(AcademicSession::as_str),
                class_name: Some(&details.class_name),
            },
            Self::Teacher { department } => RoleColumns {
                department: department.as_deref(),
                ..RoleColumns::default()
            },
            Self::Admin | Self::SuperAdmin => RoleColumns::default(),
        }
    }

    /// Rebuild from flat columns. A student row without a class name is rejected.
    pub fn from_columns(role: Role, columns: OwnedRoleColumns) -> Result<Self, MissingClassName> {
        match role {
            Role::Student => Ok(Self::Student(StudentDetails {
                matric_number: columns.matric_number,
                department: columns.department,
                program: columns.program,
                academic_session: columns.academic_session,
                class_name: columns.class_name.ok_or(MissingClassName)?,
            })),
            Role::Teacher => Ok(Self::Teacher {
                department: columns.department,
            }),
            Role::Admin => Ok(Self::Admin),
            Role::SuperAdmin => Ok(Self::SuperAdmin),
        }
    }
}

/// Student rows must name a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("student record has no class name")]
pub struct MissingClassName;

/// Borrowed flat column view of [`RoleDetails`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleColumns<'a> {
    pub matric_number: Option<&'a str>,
    pub department: Option<&'a str>,
    pub program: Option<&'a str>,
    pub academic_session: Option<&'a str>,
    pub class_name: Option<&'a str>,
}

/// Owned flat columns as read from storage.
#[derive(Debug, Clone, Default)]
pub struct OwnedRoleColumns {
    pub matric_number: Option<String>,
    pub department: Option<String>,
    pub program: Option<String>,
    pub academic_session: Option<AcademicSession>,
    pub class_name: Option<String>,
}

/// User Record
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub uuid: UserUuid,
    pub school_uuid: SchoolUuid,
    pub name: String,
    pub email: String,
    pub password_hash: PasswordHash,
    pub details: RoleDetails,
    pub verified: bool,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserRecord {
    #[must_use]
    pub const fn role(&self) -> Role {
        self.details.role()
    }

    /// The authorization view of this user.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor {
            user: self.uuid,
            school: self.school_uuid,
            role: self.details.role(),
        }
    }
}

/// The signed-in user an operation is performed on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user: UserUuid,
    pub school: SchoolUuid,
    pub role: Role,
}

/// Normalise an email for storage and comparison.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A `local@domain.tld` shape check; deliverability is the mailer's problem.
#[must_use]
pub fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
