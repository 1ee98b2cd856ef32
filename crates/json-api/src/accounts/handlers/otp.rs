//! OTP Handlers

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    accounts::into_api_error,
    errors::{ApiError, MessageResponse},
    extensions::*,
    state::State,
};

/// Send OTP Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SendOtpRequest {
    pub email: String,
}

/// Verify OTP Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VerifyOtpRequest {
    pub email: String,

    /// Six digit code from the email.
    pub otp: String,
}

/// Send OTP Handler
#[endpoint(tags("auth"), summary = "Email a fresh verification code")]
pub(crate) async fn send(
    json: JsonBody<SendOtpRequest>,
    depot: &mut Depot,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .app
        .accounts
        .send_otp(&json.into_inner().email)
        .await
        .map_err(into_api_error)?;

    Ok(MessageResponse::ok("Verification code sent"))
}

/// Verify OTP Handler
#[endpoint(tags("auth"), summary = "Verify an email address")]
pub(crate) async fn verify(
    json: JsonBody<VerifyOtpRequest>,
    depot: &mut Depot,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    state
        .app
        .accounts
        .verify_otp(&request.email, &request.otp)
        .await
        .map_err(into_api_error)?;

    Ok(MessageResponse::ok("Email verified"))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use scholarlink_app::domain::accounts::{
        AccountValidationError, AccountsServiceError, MockAccountsService,
    };
    use serde_json::json;
    use testresult::TestResult;

    use crate::{errors::ErrorResponse, test_helpers::TestApp};

    use super::*;

    fn make_service(accounts: MockAccountsService) -> Service {
        TestApp {
            accounts,
            ..TestApp::default()
        }
        .public_service(
            Router::with_path("auth/otp")
                .push(Router::with_path("send").post(send))
                .push(Router::with_path("verify").post(verify)),
        )
    }

    #[tokio::test]
    async fn unknown_email_returns_404() {
        let mut accounts = MockAccountsService::new();

        accounts
            .expect_send_otp()
            .once()
            .withf(|email| email == "nobody@example.com")
            .return_once(|_| Err(AccountsServiceError::NotFound));

        let res = TestClient::post("http://example.com/auth/otp/send")
            .json(&json!({ "email": "nobody@example.com" }))
            .send(&make_service(accounts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn matching_code_verifies() -> TestResult {
        let mut accounts = MockAccountsService::new();

        accounts
            .expect_verify_otp()
            .once()
            .withf(|email, code| email == "ada@example.com" && code == "123456")
            .return_once(|_, _| Ok(()));

        let mut res = TestClient::post("http://example.com/auth/otp/verify")
            .json(&json!({ "email": "ada@example.com", "otp": "123456" }))
            .send(&make_service(accounts))
            .await;

        let body: MessageResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.success, "verification should succeed");

        Ok(())
    }

    #[tokio::test]
    async fn expired_code_returns_400_with_reason() -> TestResult {
        let mut accounts = MockAccountsService::new();

        accounts
            .expect_verify_otp()
            .once()
            .return_once(|_, _| Err(AccountValidationError::ExpiredCode.into()));

        let mut res = TestClient::post("http://example.com/auth/otp/verify")
            .json(&json!({ "email": "ada@example.com", "otp": "123456" }))
            .send(&make_service(accounts))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body.message, "verification code has expired");

        Ok(())
    }
}
