//! Create Course Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use scholarlink_app::domain::courses::records::CourseInput;

use crate::{
    courses::{CourseResponse, into_api_error},
    errors::ApiError,
    extensions::*,
    state::State,
};

/// Create Course Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateCourseRequest {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl From<CreateCourseRequest> for CourseInput {
    fn from(request: CreateCourseRequest) -> Self {
        Self {
            code: request.code,
            title: request.title,
            description: request.description,
        }
    }
}

/// Course Created Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CourseCreatedResponse {
    pub success: bool,
    pub course: CourseResponse,
}

/// Create Course Handler
#[endpoint(tags("courses"), summary = "Create Course", security(("session_cookie" = [])))]
pub(crate) async fn handler(
    json: JsonBody<CreateCourseRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CourseCreatedResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let course = state
        .app
        .courses
        .create_course(session.actor(), json.into_inner().into())
        .await
        .map_err(into_api_error)?;

    res.add_header(LOCATION, format!("/courses/{}", course.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(CourseCreatedResponse {
        success: true,
        course: CourseResponse::from(&course),
    }))
}
