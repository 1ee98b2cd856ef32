//! Payments Config

use clap::Args;

/// Paystack settings.
#[derive(Debug, Args)]
pub struct PaymentsConfig {
    /// Paystack API root
    #[arg(long, env = "PAYSTACK_BASE_URL", default_value = "https://api.paystack.co")]
    pub paystack_base_url: String,

    /// Paystack secret key; also verifies webhook signatures
    #[arg(long, env = "PAYSTACK_SECRET_KEY", hide_env_values = true)]
    pub paystack_secret_key: String,

    /// Page customers return to after checkout
    #[arg(long, env = "PAYSTACK_CALLBACK_URL")]
    pub paystack_callback_url: Option<String>,
}
