//! Current User Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    accounts::{
        into_api_error,
        models::{SchoolResponse, UserResponse},
    },
    errors::ApiError,
    extensions::*,
    state::State,
};

/// Current User Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CurrentUserResponse {
    pub success: bool,
    pub user: UserResponse,
    pub school: SchoolResponse,
}

/// Current User Handler
#[endpoint(tags("users"), summary = "The signed-in user", security(("session_cookie" = [])))]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CurrentUserResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let user = state
        .app
        .accounts
        .current_user(session.user.uuid)
        .await
        .map_err(into_api_error)?;

    Ok(Json(CurrentUserResponse {
        success: true,
        user: UserResponse::from(&user),
        school: SchoolResponse::from(&session.school),
    }))
}
