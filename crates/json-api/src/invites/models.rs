//! Invite response models.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scholarlink_app::domain::invites::records::InviteRecord;

/// An invite as shown to school administrators. The token is only ever emailed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InviteResponse {
    pub uuid: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub matric_number: Option<String>,
    pub department: Option<String>,
    pub program: Option<String>,
    pub session: Option<String>,
    pub class_name: Option<String>,
    pub created_by: Uuid,
    pub expires_at: String,
    pub used: bool,
    pub used_at: Option<String>,
    pub created_at: String,
}

impl From<&InviteRecord> for InviteResponse {
    fn from(invite: &InviteRecord) -> Self {
        let columns = invite.details.columns();

        Self {
            uuid: invite.uuid.into_uuid(),
            email: invite.email.clone(),
            name: invite.name.clone(),
            role: invite.role().as_str().to_string(),
            matric_number: columns.matric_number.map(str::to_string),
            department: columns.department.map(str::to_string),
            program: columns.program.map(str::to_string),
            session: columns.academic_session.map(str::to_string),
            class_name: columns.class_name.map(str::to_string),
            created_by: invite.created_by.into_uuid(),
            expires_at: invite.expires_at.to_string(),
            used: invite.used,
            used_at: invite.used_at.map(|at| at.to_string()),
            created_at: invite.created_at.to_string(),
        }
    }
}
