//! Delete Invite Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::{ApiError, MessageResponse},
    extensions::*,
    invites::into_api_error,
    state::State,
};

/// Delete Invite Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeleteInviteRequest {
    pub invite_id: Uuid,
}

/// Delete Invite Handler
#[endpoint(
    tags("invites"),
    summary = "Remove an unused invite",
    security(("session_cookie" = []))
)]
pub(crate) async fn handler(
    json: JsonBody<DeleteInviteRequest>,
    depot: &mut Depot,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    state
        .app
        .invites
        .delete_invite(session.actor(), json.into_inner().invite_id.into())
        .await
        .map_err(into_api_error)?;

    Ok(MessageResponse::ok("Invite deleted"))
}
