//! Result Records

use jiff::Timestamp;
use serde::Serialize;

use crate::{
    domain::{
        academic::{AcademicSession, Term},
        courses::records::CourseUuid,
        schools::records::SchoolUuid,
        users::records::UserUuid,
    },
    uuids::TypedUuid,
};

/// Result UUID
pub type ResultUuid = TypedUuid<ResultRecord>;

/// Highest score a test or exam can carry.
pub const MAX_SCORE: i16 = 100;

/// One student's scores for a course, session and term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub uuid: ResultUuid,
    pub school_uuid: SchoolUuid,
    pub student_uuid: UserUuid,
    pub course_uuid: CourseUuid,
    pub academic_session: AcademicSession,
    pub term: Term,
    pub test_score: i16,
    pub exam_score: i16,
    pub uploaded_by: UserUuid,
    pub teacher_uuid: UserUuid,
    pub approved: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ResultRecord {
    /// Test plus exam score.
    #[must_use]
    pub const fn total(&self) -> i16 {
        self.test_score + self.exam_score
    }
}

/// A validated row ready to upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResult {
    pub uuid: ResultUuid,
    pub school_uuid: SchoolUuid,
    pub student_uuid: UserUuid,
    pub course_uuid: CourseUuid,
    pub academic_session: AcademicSession,
    pub term: Term,
    pub test_score: i16,
    pub exam_score: i16,
    pub uploaded_by: UserUuid,
    pub teacher_uuid: UserUuid,
}

/// A result row as uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub student: UserUuid,
    pub session: String,
    pub term: String,
    pub test_score: i64,
    pub exam_score: i64,

    /// Teacher credited with the result; the uploader when absent.
    pub teacher: Option<UserUuid>,
}
