//! Create Invites Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use scholarlink_app::domain::invites::data::InviteEntry;

use crate::{
    errors::ApiError,
    extensions::*,
    invites::{InviteResponse, into_api_error},
    observability::counters,
    state::State,
};

/// One person to invite.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InviteUserRequest {
    pub name: String,
    pub email: String,

    /// `student` or `teacher`.
    pub role: String,

    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub matric_number: Option<String>,

    /// Academic session such as `2024/2025`.
    #[serde(default)]
    pub session: Option<String>,

    /// Required for students.
    #[serde(default)]
    pub class_name: Option<String>,
}

impl From<InviteUserRequest> for InviteEntry {
    fn from(request: InviteUserRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            role: request.role,
            department: request.department,
            program: request.program,
            matric_number: request.matric_number,
            session: request.session,
            class_name: request.class_name,
        }
    }
}

/// Create Invites Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateInvitesRequest {
    pub users: Vec<InviteUserRequest>,
}

/// Create Invites Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateInvitesResponse {
    pub success: bool,
    pub message: String,
    pub invites: Vec<InviteResponse>,
}

/// Create Invites Handler
///
/// The whole batch is validated before anything is written or emailed.
#[endpoint(
    tags("invites"),
    summary = "Invite students and teachers",
    security(("session_cookie" = []))
)]
pub(crate) async fn handler(
    json: JsonBody<CreateInvitesRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CreateInvitesResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let entries = json
        .into_inner()
        .users
        .into_iter()
        .map(InviteEntry::from)
        .collect();

    let invites = state
        .app
        .invites
        .issue_invites(session.actor(), entries)
        .await
        .map_err(into_api_error)?;

    counters::invites_sent(invites.len());

    res.status_code(StatusCode::CREATED);

    Ok(Json(CreateInvitesResponse {
        success: true,
        message: format!("{} invite(s) sent", invites.len()),
        invites: invites.iter().map(InviteResponse::from).collect(),
    }))
}
