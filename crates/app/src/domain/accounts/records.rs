//! Account Records

use jiff::Timestamp;

/// A pending one-time verification code. Only its hash is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub email: String,
    pub code_hash: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl OtpRecord {
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }
}

/// New OTP Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOtp {
    pub email: String,
    pub code_hash: String,
    pub expires_at: Timestamp,
}
