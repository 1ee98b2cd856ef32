//! Invite Handlers

pub(crate) mod add_user;
pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod edit;
pub(crate) mod get;
