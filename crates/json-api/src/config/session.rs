//! Session Config

use clap::Args;

/// Session token and cookie settings.
#[derive(Debug, Args)]
pub struct SessionConfig {
    /// Key the session token verifier is signed with
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    pub session_secret: String,

    /// Hours a session stays valid after sign-in
    #[arg(long, env = "SESSION_TTL_HOURS", default_value_t = 168_u32)]
    pub session_ttl_hours: u32,

    /// Mark the session cookie `Secure`
    #[arg(long, env = "SESSION_COOKIE_SECURE", default_value_t = true)]
    pub session_cookie_secure: bool,
}
