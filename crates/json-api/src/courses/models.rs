//! Course response models.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scholarlink_app::domain::{courses::records::CourseRecord, results::records::ResultRecord};

/// Course Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseResponse {
    pub uuid: Uuid,
    pub code: String,
    pub title: String,
    pub description: String,
    pub created_by: Uuid,
    pub admins: Vec<Uuid>,
    pub created_at: String,
}

impl From<&CourseRecord> for CourseResponse {
    fn from(course: &CourseRecord) -> Self {
        Self {
            uuid: course.uuid.into_uuid(),
            code: course.code.clone(),
            title: course.title.clone(),
            description: course.description.clone(),
            created_by: course.created_by.into_uuid(),
            admins: course.admins.iter().copied().map(Uuid::from).collect(),
            created_at: course.created_at.to_string(),
        }
    }
}

/// Result Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResultResponse {
    pub uuid: Uuid,
    pub student: Uuid,
    pub course: Uuid,
    pub session: String,
    pub term: String,
    pub test_score: i16,
    pub exam_score: i16,
    pub total: i16,
    pub teacher: Uuid,
    pub approved: bool,
    pub updated_at: String,
}

impl From<&ResultRecord> for ResultResponse {
    fn from(result: &ResultRecord) -> Self {
        Self {
            uuid: result.uuid.into_uuid(),
            student: result.student_uuid.into_uuid(),
            course: result.course_uuid.into_uuid(),
            session: result.academic_session.to_string(),
            term: result.term.as_str().to_string(),
            test_score: result.test_score,
            exam_score: result.exam_score,
            total: result.total(),
            teacher: result.teacher_uuid.into_uuid(),
            approved: result.approved,
            updated_at: result.updated_at.to_string(),
        }
    }
}
