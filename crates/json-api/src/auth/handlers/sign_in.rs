//! Sign In Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    accounts::models::UserResponse,
    auth::{into_api_error, session_cookie},
    errors::ApiError,
    extensions::*,
    state::State,
};

/// Sign In Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Sign In Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInResponse {
    pub success: bool,
    pub message: String,

    /// Same token as the session cookie, for clients that send `Authorization: Bearer`.
    pub token: String,

    pub expires_at: String,
    pub user: UserResponse,
}

/// Sign In Handler
#[endpoint(tags("auth"), summary = "Sign In")]
pub(crate) async fn handler(
    json: JsonBody<SignInRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<SignInResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let issued = state
        .app
        .auth
        .sign_in(&request.email, &request.password)
        .await
        .map_err(into_api_error)?;

    res.add_cookie(session_cookie(
        issued.token.clone(),
        issued.expires_at,
        Timestamp::now(),
        state.cookie_secure,
    ));

    Ok(Json(SignInResponse {
        success: true,
        message: "Signed in".to_string(),
        token: issued.token,
        expires_at: issued.expires_at.to_string(),
        user: UserResponse::from(&issued.user),
    }))
}
