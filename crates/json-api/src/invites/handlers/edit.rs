//! Edit Invite Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scholarlink_app::domain::invites::data::InviteEdit;

use crate::{
    errors::ApiError,
    extensions::*,
    invites::{InviteResponse, into_api_error},
    state::State,
};

/// Edit Invite Request
///
/// Omitted fields keep their stored value.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EditInviteRequest {
    pub invite_id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub matric_number: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
}

/// Edit Invite Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct EditInviteResponse {
    pub success: bool,
    pub message: String,
    pub invite: InviteResponse,
}

/// Edit Invite Handler
#[endpoint(
    tags("invites"),
    summary = "Change an unused invite",
    security(("session_cookie" = []))
)]
pub(crate) async fn handler(
    json: JsonBody<EditInviteRequest>,
    depot: &mut Depot,
) -> Result<Json<EditInviteResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;
    let request = json.into_inner();

    let edit = InviteEdit {
        name: request.name,
        email: request.email,
        department: request.department,
        program: request.program,
        matric_number: request.matric_number,
        session: request.session,
        class_name: request.class_name,
    };

    let invite = state
        .app
        .invites
        .edit_invite(session.actor(), request.invite_id.into(), edit)
        .await
        .map_err(into_api_error)?;

    Ok(Json(EditInviteResponse {
        success: true,
        message: "Invite updated".to_string(),
        invite: InviteResponse::from(&invite),
    }))
}
