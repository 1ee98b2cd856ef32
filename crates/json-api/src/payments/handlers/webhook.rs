//! Payment Webhook Handler

use std::sync::Arc;

use salvo::prelude::*;

use scholarlink_app::{
    domain::subscriptions::{SubscriptionsServiceError, WebhookOutcome},
    integrations::SIGNATURE_HEADER,
};

use crate::{
    errors::{ApiError, MessageResponse},
    extensions::*,
    observability::counters,
    payments::into_api_error,
    state::State,
};

/// Payment Webhook Handler
///
/// The signature covers the exact raw body, so the payload is never re-serialized.
/// Anything other than a bad signature or a storage failure is acknowledged
/// with 200 so the gateway stops retrying.
#[endpoint(tags("payments"), summary = "Paystack webhook")]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let Some(signature) = req.header::<String>(SIGNATURE_HEADER) else {
        counters::webhook_processed("rejected");

        return Err(ApiError::bad_request("Missing signature"));
    };

    let body = req.payload().await.or_400("Unreadable webhook body")?;

    let outcome = state
        .app
        .subscriptions
        .handle_webhook(body, &signature)
        .await
        .map_err(|error| {
            if matches!(error, SubscriptionsServiceError::InvalidSignature) {
                counters::webhook_processed("rejected");
            }

            into_api_error(error)
        })?;

    match outcome {
        WebhookOutcome::Ignored => {
            counters::webhook_processed("ignored");

            Ok(MessageResponse::ok("Event ignored"))
        }
        WebhookOutcome::Recorded { .. } => {
            counters::webhook_processed("recorded");

            Ok(MessageResponse::ok("Payment recorded"))
        }
    }
}
