//! Account Handlers

pub(crate) mod me;
pub(crate) mod otp;
pub(crate) mod sign_up;
