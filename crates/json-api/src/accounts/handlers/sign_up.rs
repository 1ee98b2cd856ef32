//! Sign Up Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use scholarlink_app::domain::accounts::data::SchoolRegistration;

use crate::{
    accounts::{
        into_api_error,
        models::{SchoolResponse, UserResponse},
    },
    errors::ApiError,
    extensions::*,
    state::State,
};

/// School sign-up form.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignUpRequest {
    pub school_name: String,
    pub address: String,

    /// Academic session such as `2024/2025`.
    #[serde(default)]
    pub current_session: Option<String>,

    /// Name of the school's first administrator.
    pub name: String,

    pub email: String,
    pub password: String,
}

impl From<SignUpRequest> for SchoolRegistration {
    fn from(request: SignUpRequest) -> Self {
        Self {
            school_name: request.school_name,
            address: request.address,
            current_session: request.current_session,
            admin_name: request.name,
            email: request.email,
            password: request.password,
        }
    }
}

/// Sign Up Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignUpResponse {
    pub success: bool,
    pub message: String,
    pub school: SchoolResponse,
    pub user: UserResponse,

    /// Whether the verification code was emailed; ask for another when not.
    pub otp_sent: bool,
}

/// Sign Up Handler
#[endpoint(tags("auth"), summary = "Register a school and its administrator")]
pub(crate) async fn handler(
    json: JsonBody<SignUpRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<SignUpResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let registered = state
        .app
        .accounts
        .register_school(json.into_inner().into())
        .await
        .map_err(into_api_error)?;

    res.status_code(StatusCode::CREATED);

    let message = if registered.otp_sent {
        "School registered, check your email for a verification code"
    } else {
        "School registered, request a new verification code to continue"
    };

    Ok(Json(SignUpResponse {
        success: true,
        message: message.to_string(),
        school: SchoolResponse::from(&registered.school),
        user: UserResponse::from(&registered.admin),
        otp_sent: registered.otp_sent,
    }))
}
