//! List Audit Logs Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scholarlink_app::domain::audit::records::AuditLogRecord;

use crate::{errors::ApiError, extensions::*, logs::into_api_error, state::State};

/// List Audit Logs Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub(crate) struct ListLogsRequest {
    /// `nextCursor` of the previous page.
    pub cursor: Option<Uuid>,
    pub limit: Option<usize>,
}

/// Audit Log Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuditLogResponse {
    pub uuid: Uuid,
    pub actor: Uuid,
    pub action: String,
    pub details: String,
    pub created_at: String,
}

impl From<&AuditLogRecord> for AuditLogResponse {
    fn from(log: &AuditLogRecord) -> Self {
        Self {
            uuid: log.uuid.into_uuid(),
            actor: log.actor_uuid.into_uuid(),
            action: log.action.clone(),
            details: log.details.clone(),
            created_at: log.created_at.to_string(),
        }
    }
}

/// List Audit Logs Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListLogsResponse {
    pub success: bool,
    pub logs: Vec<AuditLogResponse>,
    pub next_cursor: Option<Uuid>,
}

/// List Audit Logs Handler
#[endpoint(tags("logs"), summary = "List Audit Logs", security(("session_cookie" = [])))]
pub(crate) async fn handler(
    json: JsonBody<ListLogsRequest>,
    depot: &mut Depot,
) -> Result<Json<ListLogsResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;
    let request = json.into_inner();

    let page = state
        .app
        .audit
        .list_logs(session.actor(), request.cursor.map(Into::into), request.limit)
        .await
        .map_err(into_api_error)?;

    Ok(Json(ListLogsResponse {
        success: true,
        logs: page.items.iter().map(AuditLogResponse::from).collect(),
        next_cursor: page.next_cursor.map(Uuid::from),
    }))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use scholarlink_app::domain::{
        audit::{AuditServiceError, MockAuditService, records::AuditLogUuid},
        pagination::Page,
    };
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{
        TEST_SCHOOL_UUID, TEST_USER_UUID, TestApp, admin_session, session_for, student,
    };

    use super::*;

    fn make_log(uuid: AuditLogUuid) -> AuditLogRecord {
        AuditLogRecord {
            uuid,
            actor_uuid: TEST_USER_UUID,
            school_uuid: Some(TEST_SCHOOL_UUID),
            action: "course_created".to_string(),
            details: "created course MTH101".to_string(),
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn returns_a_page_with_its_cursor() -> TestResult {
        let cursor = Uuid::now_v7();
        let last = AuditLogUuid::new();

        let mut audit = MockAuditService::new();

        audit
            .expect_list_logs()
            .once()
            .withf(move |actor, before, limit| {
                actor.school == TEST_SCHOOL_UUID
                    && before.map(Uuid::from) == Some(cursor)
                    && *limit == Some(2)
            })
            .return_once(move |_, _, _| {
                Ok(Page {
                    items: vec![make_log(AuditLogUuid::new()), make_log(last)],
                    next_cursor: Some(last),
                })
            });

        let service = TestApp {
            audit,
            ..TestApp::default()
        }
        .service_as(admin_session(), Router::with_path("logs/get").post(handler));

        let mut res = TestClient::post("http://example.com/logs/get")
            .json(&json!({ "cursor": cursor, "limit": 2 }))
            .send(&service)
            .await;

        let body: ListLogsResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.logs.len(), 2);
        assert_eq!(body.next_cursor, Some(last.into_uuid()));

        Ok(())
    }

    #[tokio::test]
    async fn non_admins_get_403() {
        let mut audit = MockAuditService::new();

        audit
            .expect_list_logs()
            .once()
            .return_once(|_, _, _| Err(AuditServiceError::Forbidden));

        let service = TestApp {
            audit,
            ..TestApp::default()
        }
        .service_as(
            session_for(student(TEST_USER_UUID)),
            Router::with_path("logs/get").post(handler),
        );

        let res = TestClient::post("http://example.com/logs/get")
            .json(&json!({}))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));
    }
}
