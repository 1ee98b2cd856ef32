//! Mail Config

use clap::Args;

/// Transactional email and invite link settings.
#[derive(Debug, Args)]
pub struct MailConfig {
    /// Endpoint of the transactional email API
    #[arg(long, env = "MAIL_API_URL")]
    pub mail_api_url: String,

    /// Transactional email API key
    #[arg(long, env = "MAIL_API_KEY", hide_env_values = true)]
    pub mail_api_key: String,

    /// Sender address for outgoing mail
    #[arg(long, env = "MAIL_SENDER", default_value = "ScholarLink <no-reply@scholarlink.app>")]
    pub mail_sender: String,

    /// Frontend page invite links point at
    #[arg(
        long,
        env = "INVITE_SIGNUP_URL",
        default_value = "http://localhost:5173/invite"
    )]
    pub invite_signup_url: String,

    /// Hours an invite link stays redeemable
    #[arg(long, env = "INVITE_TTL_HOURS", default_value_t = 24_u32)]
    pub invite_ttl_hours: u32,
}
