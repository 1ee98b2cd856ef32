//! List Courses Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    courses::{CourseResponse, into_api_error},
    errors::ApiError,
    extensions::*,
    state::State,
};

/// Courses Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CoursesResponse {
    pub success: bool,
    pub courses: Vec<CourseResponse>,
}

/// List Courses Handler
#[endpoint(tags("courses"), summary = "List Courses", security(("session_cookie" = [])))]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CoursesResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let courses = state
        .app
        .courses
        .list_courses(session.actor())
        .await
        .map_err(into_api_error)?;

    Ok(Json(CoursesResponse {
        success: true,
        courses: courses.iter().map(CourseResponse::from).collect(),
    }))
}
