//! Delete Course Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    courses::into_api_error,
    errors::{ApiError, MessageResponse},
    extensions::*,
    state::State,
};

/// Delete Course Handler
#[endpoint(tags("courses"), summary = "Delete Course", security(("session_cookie" = [])))]
pub(crate) async fn handler(
    course: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    state
        .app
        .courses
        .delete_course(session.actor(), course.into_inner().into())
        .await
        .map_err(into_api_error)?;

    Ok(MessageResponse::ok("Course deleted"))
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use scholarlink_app::domain::courses::{CoursesServiceError, MockCoursesService};

    use crate::test_helpers::{TestApp, admin_session};

    use super::*;

    fn make_service(courses: MockCoursesService) -> Service {
        TestApp {
            courses,
            ..TestApp::default()
        }
        .service_as(
            admin_session(),
            Router::with_path("courses/{course}").delete(handler),
        )
    }

    #[tokio::test]
    async fn course_admin_deletes() {
        let uuid = Uuid::now_v7();
        let mut courses = MockCoursesService::new();

        courses
            .expect_delete_course()
            .once()
            .withf(move |_, course| course.into_uuid() == uuid)
            .return_once(|_, _| Ok(()));

        let res = TestClient::delete(format!("http://example.com/courses/{uuid}"))
            .send(&make_service(courses))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn other_school_course_returns_404() {
        let mut courses = MockCoursesService::new();

        courses
            .expect_delete_course()
            .once()
            .return_once(|_, _| Err(CoursesServiceError::NotFound));

        let res = TestClient::delete(format!("http://example.com/courses/{}", Uuid::now_v7()))
            .send(&make_service(courses))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn malformed_uuid_returns_400() {
        let res = TestClient::delete("http://example.com/courses/not-a-uuid")
            .send(&make_service(MockCoursesService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
