//! Account response models.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scholarlink_app::domain::{schools::records::SchoolRecord, users::records::UserRecord};

/// A user as shown to clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserResponse {
    pub uuid: Uuid,
    pub school_uuid: Uuid,
    pub name: String,
    pub email: String,

    /// One of `student`, `teacher`, `admin`, `superAdmin`.
    pub role: String,

    pub verified: bool,
    pub image_url: Option<String>,
    pub matric_number: Option<String>,
    pub department: Option<String>,
    pub program: Option<String>,
    pub session: Option<String>,
    pub class_name: Option<String>,
    pub created_at: String,
}

impl From<&UserRecord> for UserResponse {
    fn from(user: &UserRecord) -> Self {
        let columns = user.details.columns();

        Self {
            uuid: user.uuid.into_uuid(),
            school_uuid: user.school_uuid.into_uuid(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role().as_str().to_string(),
            verified: user.verified,
            image_url: user.image_url.clone(),
            matric_number: columns.matric_number.map(str::to_string),
            department: columns.department.map(str::to_string),
            program: columns.program.map(str::to_string),
            session: columns.academic_session.map(str::to_string),
            class_name: columns.class_name.map(str::to_string),
            created_at: user.created_at.to_string(),
        }
    }
}

/// A school as shown to its members.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SchoolResponse {
    pub uuid: Uuid,

    /// Public identifier such as `SCH-9F03A1C2`.
    pub code: String,

    pub name: String,
    pub address: String,
    pub current_session: Option<String>,
    pub paid: bool,
    pub payment_date: Option<String>,
    pub subscription_expires_at: Option<String>,
}

impl From<&SchoolRecord> for SchoolResponse {
    fn from(school: &SchoolRecord) -> Self {
        Self {
            uuid: school.uuid.into_uuid(),
            code: school.code.clone(),
            name: school.name.clone(),
            address: school.address.clone(),
            current_session: school.current_session.as_ref().map(ToString::to_string),
            paid: school.paid,
            payment_date: school.payment_date.map(|at| at.to_string()),
            subscription_expires_at: school.subscription_expires_at.map(|at| at.to_string()),
        }
    }
}
