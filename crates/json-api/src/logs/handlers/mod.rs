//! Audit Log Handlers

pub(crate) mod get;
