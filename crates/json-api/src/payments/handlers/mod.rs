//! Payment Handlers

pub(crate) mod pay;
pub(crate) mod webhook;
