//! Course Admin Handlers

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    courses::{CourseResponse, into_api_error},
    errors::ApiError,
    extensions::*,
    state::State,
};

/// Assign Course Admin Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignAdminRequest {
    pub user_id: Uuid,
}

/// Course Admins Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CourseAdminsResponse {
    pub success: bool,
    pub course: CourseResponse,
}

/// Assign Course Admin Handler
#[endpoint(tags("courses"), summary = "Assign Course Admin", security(("session_cookie" = [])))]
pub(crate) async fn assign(
    course: PathParam<Uuid>,
    json: JsonBody<AssignAdminRequest>,
    depot: &mut Depot,
) -> Result<Json<CourseAdminsResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let course = state
        .app
        .courses
        .assign_course_admin(
            session.actor(),
            course.into_inner().into(),
            json.into_inner().user_id.into(),
        )
        .await
        .map_err(into_api_error)?;

    Ok(Json(CourseAdminsResponse {
        success: true,
        course: CourseResponse::from(&course),
    }))
}

/// Remove Course Admin Handler
#[endpoint(tags("courses"), summary = "Remove Course Admin", security(("session_cookie" = [])))]
pub(crate) async fn remove(
    course: PathParam<Uuid>,
    user: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CourseAdminsResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let course = state
        .app
        .courses
        .remove_course_admin(
            session.actor(),
            course.into_inner().into(),
            user.into_inner().into(),
        )
        .await
        .map_err(into_api_error)?;

    Ok(Json(CourseAdminsResponse {
        success: true,
        course: CourseResponse::from(&course),
    }))
}
