//! Redeem Invite Handler

use std::sync::Arc;

use salvo::{http::form::FilePart, oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use scholarlink_app::domain::invites::data::{ProfileImage, Redemption};

use crate::{
    accounts::models::UserResponse,
    errors::ApiError,
    extensions::*,
    invites::into_api_error,
    observability::counters,
    state::State,
};

const IMAGE_FIELD: &str = "userImage";

/// Redeem Invite Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RedeemInviteResponse {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
}

/// Redeem Invite Handler
///
/// Takes `token`, `password` and `confirmPassword` as form fields, plus an
/// optional `userImage` file when sent as multipart.
#[endpoint(tags("invites"), summary = "Activate an account from an invite")]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<RedeemInviteResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let token = required_field(req, "token").await?;
    let password = required_field(req, "password").await?;
    let confirm_password = required_field(req, "confirmPassword").await?;

    let image = match req.file(IMAGE_FIELD).await {
        Some(file) => Some(read_image(file).await?),
        None => None,
    };

    let user = state
        .app
        .invites
        .redeem_invite(Redemption {
            token,
            password,
            confirm_password,
            image,
        })
        .await
        .map_err(into_api_error)?;

    counters::invite_redeemed();

    res.status_code(StatusCode::CREATED);

    Ok(Json(RedeemInviteResponse {
        success: true,
        message: "Account activated, you can now sign in".to_string(),
        user: UserResponse::from(&user),
    }))
}

async fn required_field(req: &mut Request, name: &str) -> Result<String, ApiError> {
    req.form::<String>(name)
        .await
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{name} is required")))
}

async fn read_image(file: &FilePart) -> Result<ProfileImage, ApiError> {
    let bytes = tokio::fs::read(file.path())
        .await
        .or_500("failed to read uploaded image")?;

    Ok(ProfileImage {
        file_name: file.name().unwrap_or("upload").to_string(),
        content_type: file
            .content_type()
            .map_or_else(|| "application/octet-stream".to_string(), |mime| mime.to_string()),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use scholarlink_app::domain::invites::{
        InviteValidationError, InvitesServiceError, MockInvitesService,
    };
    use testresult::TestResult;

    use crate::{
        errors::ErrorResponse,
        test_helpers::{TEST_USER_UUID, TestApp, student},
    };

    use super::*;

    fn make_service(invites: MockInvitesService) -> Service {
        TestApp {
            invites,
            ..TestApp::default()
        }
        .public_service(Router::with_path("invite/add-user").post(handler))
    }

    fn form(password: &str, confirm: &str) -> [(&'static str, String); 3] {
        [
            ("token", "ab".repeat(32)),
            ("password", password.to_string()),
            ("confirmPassword", confirm.to_string()),
        ]
    }

    #[tokio::test]
    async fn url_encoded_redemption_activates_the_account() -> TestResult {
        let mut invites = MockInvitesService::new();

        invites
            .expect_redeem_invite()
            .once()
            .withf(|redemption| {
                redemption.token == "ab".repeat(32)
                    && redemption.password == "secret-pass"
                    && redemption.confirm_password == "secret-pass"
                    && redemption.image.is_none()
            })
            .return_once(|_| Ok(student(TEST_USER_UUID)));

        let mut res = TestClient::post("http://example.com/invite/add-user")
            .form(&form("secret-pass", "secret-pass"))
            .send(&make_service(invites))
            .await;

        let body: RedeemInviteResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(body.user.role, "student");
        assert!(body.user.verified, "invited users start verified");

        Ok(())
    }

    #[tokio::test]
    async fn missing_token_returns_400() -> TestResult {
        let mut res = TestClient::post("http://example.com/invite/add-user")
            .form(&[("password", "secret-pass"), ("confirmPassword", "secret-pass")])
            .send(&make_service(MockInvitesService::new()))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body.message, "token is required");

        Ok(())
    }

    #[tokio::test]
    async fn mismatched_passwords_return_400() {
        let mut invites = MockInvitesService::new();

        invites
            .expect_redeem_invite()
            .once()
            .return_once(|_| Err(InviteValidationError::PasswordMismatch.into()));

        let res = TestClient::post("http://example.com/invite/add-user")
            .form(&form("secret-pass", "secret-pasz"))
            .send(&make_service(invites))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn expired_invite_returns_410_and_used_invite_409() {
        for (error, status) in [
            (InvitesServiceError::Expired, StatusCode::GONE),
            (InvitesServiceError::AlreadyUsed, StatusCode::CONFLICT),
        ] {
            let mut invites = MockInvitesService::new();

            invites.expect_redeem_invite().once().return_once(|_| Err(error));

            let res = TestClient::post("http://example.com/invite/add-user")
                .form(&form("secret-pass", "secret-pass"))
                .send(&make_service(invites))
                .await;

            assert_eq!(res.status_code, Some(status));
        }
    }
}
