//! Paystack hosted checkout and webhook signatures.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use thiserror::Error;

use super::{SecretString, join_url};
use crate::hex;

/// Header Paystack puts the webhook signature in.
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Opaque metadata echoed back by the gateway in webhook events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutMetadata {
    pub user_id: String,
    pub school_id: String,
    pub payment_type: String,
}

/// Checkout initialization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub email: String,

    /// Amount in the currency's minor unit (kobo for NGN).
    pub amount: i64,

    pub currency: String,
    pub metadata: CheckoutMetadata,
}

/// A hosted checkout session created by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Checkout {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

/// Failures talking to the payment gateway.
#[derive(Debug, Error)]
pub enum PaymentGatewayError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("payment gateway rejected the request: {0}")]
    Rejected(String),
}

/// Hosted checkout initialization.
#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<Checkout, PaymentGatewayError>;
}

/// Paystack endpoint and secret key.
#[derive(Debug, Clone)]
pub struct PaystackConfig {
    /// API root, normally `https://api.paystack.co`.
    pub base_url: String,

    /// Secret key; also the webhook signing secret.
    pub secret_key: SecretString,

    /// Where the customer is sent after checkout.
    pub callback_url: Option<String>,
}

/// Paystack REST client.
#[derive(Debug, Clone)]
pub struct PaystackClient {
    config: PaystackConfig,
    http: Client,
}

impl PaystackClient {
    #[must_use]
    pub fn new(config: PaystackConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Signature verifier keyed with this client's secret.
    #[must_use]
    pub fn webhook_signer(&self) -> WebhookSigner {
        WebhookSigner::new(self.config.secret_key.clone())
    }
}

#[derive(Debug, Serialize)]
struct InitializeBody<'a> {
    email: &'a str,
    amount: i64,
    currency: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_url: Option<&'a str>,
    metadata: &'a CheckoutMetadata,
}

#[derive(Debug, Deserialize)]
struct InitializeResponse {
    status: bool,
    message: String,
    data: Option<Checkout>,
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn initialize_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<Checkout, PaymentGatewayError> {
        let body = InitializeBody {
            email: &request.email,
            amount: request.amount,
            currency: &request.currency,
            callback_url: self.config.callback_url.as_deref(),
            metadata: &request.metadata,
        };

        let response = self
            .http
            .post(join_url(&self.config.base_url, "transaction/initialize"))
            .bearer_auth(self.config.secret_key.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let parsed: InitializeResponse = response.json().await?;

        match parsed {
            InitializeResponse {
                status: true,
                data: Some(checkout),
                ..
            } if status.is_success() => Ok(checkout),
            InitializeResponse { message, .. } => Err(PaymentGatewayError::Rejected(format!(
                "initialize failed with status {status}: {message}"
            ))),
        }
    }
}

/// HMAC-SHA512 webhook signatures over the raw request body.
#[derive(Debug, Clone)]
pub struct WebhookSigner {
    secret: SecretString,
}

impl WebhookSigner {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Hex signature of `body`, as the gateway would send it.
    #[must_use]
    pub fn sign(&self, body: &[u8]) -> Option<String> {
        let mut mac = Hmac::<Sha512>::new_from_slice(self.secret.expose().as_bytes()).ok()?;

        mac.update(body);

        Some(hex::encode(&mac.finalize().into_bytes()))
    }

    /// Constant-time check of a hex `signature` against `body`.
    #[must_use]
    pub fn verify(&self, body: &[u8], signature: &str) -> bool {
        let Some(expected) = hex::decode(signature.trim()) else {
            return false;
        };

        let Ok(mut mac) = Hmac::<Sha512>::new_from_slice(self.secret.expose().as_bytes()) else {
            return false;
        };

        mac.update(body);

        mac.verify_slice(&expected).is_ok()
    }
}
