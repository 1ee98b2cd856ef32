//! Course Results Handlers

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

use scholarlink_app::domain::results::records::ResultEntry;

use crate::{
    courses::{ResultResponse, results_api_error},
    errors::ApiError,
    extensions::*,
    state::State,
};

/// Result Row
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResultRow {
    pub student_id: Uuid,

    /// Academic session, e.g. `2024/2025`.
    pub session: String,

    /// `first`, `second` or `third`.
    pub term: String,
    pub test_score: i64,
    pub exam_score: i64,

    /// Defaults to the uploader.
    #[serde(default)]
    pub teacher_id: Option<Uuid>,
}

impl From<ResultRow> for ResultEntry {
    fn from(row: ResultRow) -> Self {
        Self {
            student: row.student_id.into(),
            session: row.session,
            term: row.term,
            test_score: row.test_score,
            exam_score: row.exam_score,
            teacher: row.teacher_id.map(Into::into),
        }
    }
}

/// Upload Results Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UploadResultsRequest {
    pub results: Vec<ResultRow>,
}

/// Results Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ResultsResponse {
    pub success: bool,
    pub results: Vec<ResultResponse>,
}

/// Upload Results Handler
///
/// The batch is all-or-nothing: one bad row rejects every row.
#[endpoint(tags("results"), summary = "Upload Results", security(("session_cookie" = [])))]
pub(crate) async fn upload(
    course: PathParam<Uuid>,
    json: JsonBody<UploadResultsRequest>,
    depot: &mut Depot,
) -> Result<Json<ResultsResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let entries = json
        .into_inner()
        .results
        .into_iter()
        .map(ResultEntry::from)
        .collect();

    let results = state
        .app
        .results
        .upload_results(session.actor(), course.into_inner().into(), entries)
        .await
        .map_err(results_api_error)?;

    Ok(Json(ResultsResponse {
        success: true,
        results: results.iter().map(ResultResponse::from).collect(),
    }))
}

/// List Results Handler
#[endpoint(tags("results"), summary = "List Results", security(("session_cookie" = [])))]
pub(crate) async fn index(
    course: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ResultsResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let results = state
        .app
        .results
        .list_results(session.actor(), course.into_inner().into())
        .await
        .map_err(results_api_error)?;

    Ok(Json(ResultsResponse {
        success: true,
        results: results.iter().map(ResultResponse::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use scholarlink_app::domain::{
        academic::Term,
        courses::records::CourseUuid,
        results::{
            MockResultsService, ResultValidationError, ResultsServiceError,
            records::{ResultRecord, ResultUuid},
        },
        users::records::UserUuid,
    };
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{TEST_SCHOOL_UUID, TEST_USER_UUID, TestApp, admin_session};

    use super::*;

    fn make_service(results: MockResultsService) -> Service {
        TestApp {
            results,
            ..TestApp::default()
        }
        .service_as(
            admin_session(),
            Router::with_path("courses/{course}/results")
                .post(upload)
                .get(index),
        )
    }

    fn make_result(course: CourseUuid, student: UserUuid) -> TestResult<ResultRecord> {
        Ok(ResultRecord {
            uuid: ResultUuid::new(),
            school_uuid: TEST_SCHOOL_UUID,
            student_uuid: student,
            course_uuid: course,
            academic_session: "2024/2025".parse()?,
            term: Term::First,
            test_score: 30,
            exam_score: 55,
            uploaded_by: TEST_USER_UUID,
            teacher_uuid: TEST_USER_UUID,
            approved: false,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        })
    }

    #[tokio::test]
    async fn upload_passes_rows_and_returns_totals() -> TestResult {
        let course = Uuid::now_v7();
        let student = Uuid::now_v7();
        let record = make_result(course.into(), student.into())?;

        let mut results = MockResultsService::new();

        results
            .expect_upload_results()
            .once()
            .withf(move |_, course_uuid, entries| {
                course_uuid.into_uuid() == course
                    && entries.len() == 1
                    && entries.iter().all(|entry| {
                        entry.student.into_uuid() == student
                            && entry.term == "first"
                            && entry.teacher.is_none()
                    })
            })
            .return_once(move |_, _, _| Ok(vec![record]));

        let mut res = TestClient::post(format!("http://example.com/courses/{course}/results"))
            .json(&json!({
                "results": [{
                    "studentId": student,
                    "session": "2024/2025",
                    "term": "first",
                    "testScore": 30,
                    "examScore": 55
                }]
            }))
            .send(&make_service(results))
            .await;

        let body: ResultsResponse = res.take_json().await?;
        let totals: Vec<i16> = body.results.iter().map(|result| result.total).collect();

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(totals, vec![85]);

        Ok(())
    }

    #[tokio::test]
    async fn out_of_range_score_returns_400() {
        let mut results = MockResultsService::new();

        results.expect_upload_results().once().return_once(|_, _, _| {
            Err(ResultValidationError::ScoreOutOfRange {
                row: 0,
                field: "exam",
                score: 140,
            }
            .into())
        });

        let res = TestClient::post(format!(
            "http://example.com/courses/{}/results",
            Uuid::now_v7()
        ))
        .json(&json!({
            "results": [{
                "studentId": Uuid::now_v7(),
                "session": "2024/2025",
                "term": "first",
                "testScore": 30,
                "examScore": 140
            }]
        }))
        .send(&make_service(results))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn listing_for_a_non_admin_returns_403() {
        let mut results = MockResultsService::new();

        results
            .expect_list_results()
            .once()
            .return_once(|_, _| Err(ResultsServiceError::Forbidden));

        let res = TestClient::get(format!(
            "http://example.com/courses/{}/results",
            Uuid::now_v7()
        ))
        .send(&make_service(results))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));
    }
}
