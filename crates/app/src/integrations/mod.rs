//! External collaborators: transactional email, object storage and the payment gateway.

use std::fmt;

use zeroize::Zeroize;

pub mod mailer;
pub mod paystack;
pub mod storage;

pub use mailer::{EmailMessage, HttpMailer, Mailer, MailerConfig, MailerError, MockMailer};
pub use paystack::{
    Checkout, CheckoutMetadata, CheckoutRequest, MockPaymentGateway, PaymentGateway,
    PaymentGatewayError, PaystackClient, PaystackConfig, SIGNATURE_HEADER, WebhookSigner,
};
pub use storage::{
    HttpObjectStorage, MockObjectStorage, ObjectStorage, ObjectStorageConfig, ObjectStorageError,
    StoredObject,
};

/// API key or shared secret; redacted in debug output and wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw secret, for signing and auth headers only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(**redacted**)")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_collapses_slashes() {
        assert_eq!(
            join_url("https://api.example.com/", "/transaction/initialize"),
            "https://api.example.com/transaction/initialize"
        );
        assert_eq!(join_url("https://cdn.example.com", "a/b.png"), "https://cdn.example.com/a/b.png");
    }

    #[test]
    fn secret_debug_is_redacted() {
        assert_eq!(format!("{:?}", SecretString::new("sk_live")), "SecretString(**redacted**)");
    }
}
