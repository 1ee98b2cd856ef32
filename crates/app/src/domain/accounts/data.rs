//! Account Data

use crate::domain::{schools::records::SchoolRecord, users::records::UserRecord};

/// School sign-up form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchoolRegistration {
    pub school_name: String,
    pub address: String,
    pub current_session: Option<String>,
    pub admin_name: String,
    pub email: String,
    pub password: String,
}

/// A freshly registered school and its first admin.
#[derive(Debug, Clone)]
pub struct RegisteredSchool {
    pub school: SchoolRecord,
    pub admin: UserRecord,

    /// Whether the verification code reached the mailer; the admin can ask for
    /// another one when it did not.
    pub otp_sent: bool,
}
