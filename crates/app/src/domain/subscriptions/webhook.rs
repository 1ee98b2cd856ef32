//! Paystack webhook payloads.

use jiff::Timestamp;
use serde::Deserialize;
use serde_json::Value;

use crate::integrations::CheckoutMetadata;

/// Event name of a settled charge.
pub const CHARGE_SUCCESS_EVENT: &str = "charge.success";

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WebhookEvent {
    pub event: String,

    #[serde(default)]
    pub data: Option<ChargeData>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChargeData {
    pub reference: String,

    #[serde(default)]
    pub amount: i64,

    #[serde(default)]
    pub currency: String,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub paid_at: Option<String>,

    #[serde(default)]
    pub customer: Option<Customer>,

    /// Paystack sends whatever was attached at checkout, or an empty string.
    #[serde(default)]
    pub metadata: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Customer {
    #[serde(default)]
    pub email: Option<String>,
}

impl ChargeData {
    /// Checkout metadata, when the charge carries ours.
    pub(crate) fn checkout_metadata(&self) -> Option<CheckoutMetadata> {
        match &self.metadata {
            Value::Object(_) => serde_json::from_value(self.metadata.clone()).ok(),
            Value::String(raw) => serde_json::from_str(raw).ok(),
            _ => None,
        }
    }

    pub(crate) fn paid_at(&self) -> Option<Timestamp> {
        self.paid_at.as_deref()?.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_metadata_and_paid_at_are_read() -> Result<(), serde_json::Error> {
        let event: WebhookEvent = serde_json::from_str(
            r#"{
                "event": "charge.success",
                "data": {
                    "reference": "ref-1",
                    "amount": 500000,
                    "currency": "NGN",
                    "status": "success",
                    "paid_at": "2025-01-02T10:00:00.000Z",
                    "customer": { "email": "ada@x.com" },
                    "metadata": { "userId": "u", "schoolId": "s", "paymentType": "subscription" }
                }
            }"#,
        )?;

        let data = event.data.as_ref();

        assert_eq!(event.event, CHARGE_SUCCESS_EVENT);
        assert_eq!(
            data.and_then(ChargeData::checkout_metadata).map(|metadata| metadata.school_id),
            Some("s".to_string())
        );
        assert_eq!(
            data.and_then(ChargeData::paid_at),
            "2025-01-02T10:00:00Z".parse::<Timestamp>().ok()
        );

        Ok(())
    }

    #[test]
    fn empty_metadata_is_none() -> Result<(), serde_json::Error> {
        let data: ChargeData =
            serde_json::from_str(r#"{ "reference": "ref-2", "metadata": "" }"#)?;

        assert!(data.checkout_metadata().is_none());
        assert!(data.paid_at().is_none());

        Ok(())
    }
}
