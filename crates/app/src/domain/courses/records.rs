//! Course Records

use jiff::Timestamp;
use serde::Serialize;

use crate::{
    domain::{schools::records::SchoolUuid, users::records::UserUuid},
    uuids::TypedUuid,
};

/// Course UUID
pub type CourseUuid = TypedUuid<CourseRecord>;

/// Course Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    pub uuid: CourseUuid,
    pub school_uuid: SchoolUuid,

    /// Upper-cased, unique within the school.
    pub code: String,

    pub title: String,
    pub description: String,
    pub created_by: UserUuid,

    /// Users allowed to manage the course and upload its results.
    pub admins: Vec<UserUuid>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CourseRecord {
    #[must_use]
    pub fn is_admin(&self, user: UserUuid) -> bool {
        self.admins.contains(&user)
    }
}

/// New Course Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub uuid: CourseUuid,
    pub school_uuid: SchoolUuid,
    pub code: String,
    pub title: String,
    pub description: String,
    pub created_by: UserUuid,
}

/// Course form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseInput {
    pub code: String,
    pub title: String,
    pub description: String,
}
