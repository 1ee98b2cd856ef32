//! Initiate Payment Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use scholarlink_app::domain::subscriptions::PaymentInitiation;

use crate::{errors::ApiError, extensions::*, payments::into_api_error, state::State};

/// Initiate Payment Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PayRequest {
    /// Currently only `subscription`.
    pub payment_type: String,

    /// Payer email; the signed-in user's email when omitted.
    #[serde(default)]
    pub email: Option<String>,
}

/// Initiate Payment Response
///
/// A school whose paid window is still open gets `success: false` and
/// `alreadyPaid: true` instead of a checkout.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PayResponse {
    pub success: bool,
    pub message: String,

    #[serde(rename = "alreadyPaid", default)]
    pub already_paid: bool,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub authorization_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reference: Option<String>,
}

/// Initiate Payment Handler
#[endpoint(
    tags("payments"),
    summary = "Start a hosted checkout for the school",
    security(("session_cookie" = []))
)]
pub(crate) async fn handler(
    json: JsonBody<PayRequest>,
    depot: &mut Depot,
) -> Result<Json<PayResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;
    let request = json.into_inner();

    let initiation = state
        .app
        .subscriptions
        .initiate_payment(session.actor(), &request.payment_type, request.email)
        .await
        .map_err(into_api_error)?;

    let response = match initiation {
        PaymentInitiation::AlreadyPaid => PayResponse {
            success: false,
            message: "Your school's subscription is already active".to_string(),
            already_paid: true,
            authorization_url: None,
            reference: None,
        },
        PaymentInitiation::Checkout {
            authorization_url,
            reference,
        } => PayResponse {
            success: true,
            message: "Checkout created".to_string(),
            already_paid: false,
            authorization_url: Some(authorization_url),
            reference: Some(reference),
        },
    };

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use scholarlink_app::{
        domain::subscriptions::{MockSubscriptionsService, SubscriptionsServiceError},
        integrations::PaymentGatewayError,
    };
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{TEST_SCHOOL_UUID, TestApp, admin_session};

    use super::*;

    fn make_service(subscriptions: MockSubscriptionsService) -> Service {
        TestApp {
            subscriptions,
            ..TestApp::default()
        }
        .service_as(admin_session(), Router::with_path("paystack/pay").post(handler))
    }

    #[tokio::test]
    async fn checkout_returns_url_and_reference() -> TestResult {
        let mut subscriptions = MockSubscriptionsService::new();

        subscriptions
            .expect_initiate_payment()
            .once()
            .withf(|actor, payment_type, email| {
                actor.school == TEST_SCHOOL_UUID
                    && payment_type == "subscription"
                    && email.as_deref() == Some("bursar@example.com")
            })
            .return_once(|_, _, _| {
                Ok(PaymentInitiation::Checkout {
                    authorization_url: "https://checkout.paystack.com/abc".to_string(),
                    reference: "ref_123".to_string(),
                })
            });

        let mut res = TestClient::post("http://example.com/paystack/pay")
            .json(&json!({ "paymentType": "subscription", "email": "bursar@example.com" }))
            .send(&make_service(subscriptions))
            .await;

        let body: PayResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.success, "checkout should succeed");
        assert_eq!(
            body.authorization_url.as_deref(),
            Some("https://checkout.paystack.com/abc")
        );
        assert_eq!(body.reference.as_deref(), Some("ref_123"));

        Ok(())
    }

    #[tokio::test]
    async fn paid_school_gets_already_paid_without_checkout() -> TestResult {
        let mut subscriptions = MockSubscriptionsService::new();

        subscriptions
            .expect_initiate_payment()
            .once()
            .return_once(|_, _, _| Ok(PaymentInitiation::AlreadyPaid));

        let mut res = TestClient::post("http://example.com/paystack/pay")
            .json(&json!({ "paymentType": "subscription" }))
            .send(&make_service(subscriptions))
            .await;

        let body: serde_json::Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.get("success"), Some(&json!(false)));
        assert_eq!(body.get("alreadyPaid"), Some(&json!(true)));
        assert!(body.get("authorization_url").is_none(), "no checkout url");

        Ok(())
    }

    #[tokio::test]
    async fn missing_plan_returns_404_and_gateway_failure_502() {
        let cases: [(fn() -> SubscriptionsServiceError, StatusCode); 2] = [
            (
                || SubscriptionsServiceError::PlanNotFound("subscription".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                || {
                    SubscriptionsServiceError::Gateway(PaymentGatewayError::Rejected(
                        "invalid key".to_string(),
                    ))
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (error, status) in cases {
            let mut subscriptions = MockSubscriptionsService::new();

            subscriptions
                .expect_initiate_payment()
                .once()
                .return_once(move |_, _, _| Err(error()));

            let res = TestClient::post("http://example.com/paystack/pay")
                .json(&json!({ "paymentType": "subscription" }))
                .send(&make_service(subscriptions))
                .await;

            assert_eq!(res.status_code, Some(status));
        }
    }
}
