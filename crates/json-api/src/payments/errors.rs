//! Payment Errors

use scholarlink_app::domain::subscriptions::SubscriptionsServiceError;

use crate::errors::ApiError;

pub(crate) fn into_api_error(error: SubscriptionsServiceError) -> ApiError {
    match error {
        SubscriptionsServiceError::UnsupportedPaymentType(reason) => {
            ApiError::bad_request(reason.to_string())
        }
        SubscriptionsServiceError::InvalidPlan(reason) => ApiError::bad_request(reason.to_string()),
        SubscriptionsServiceError::NotFound => ApiError::not_found("User or school not found"),
        SubscriptionsServiceError::PlanNotFound(payment_type) => {
            ApiError::not_found(format!("No price configured for {payment_type}"))
        }
        SubscriptionsServiceError::InvalidSignature => ApiError::bad_request("Invalid signature"),
        SubscriptionsServiceError::Gateway(source) => {
            ApiError::bad_gateway("payment gateway request failed", &source)
        }
        SubscriptionsServiceError::AlreadyExists => ApiError::conflict("Payment already recorded"),
        SubscriptionsServiceError::InvalidReference | SubscriptionsServiceError::InvalidData => {
            ApiError::bad_request("Invalid payment payload")
        }
        SubscriptionsServiceError::Sql(source) => {
            ApiError::internal("payment storage failed", &source)
        }
    }
}
