//! Shared application domain and persistence modules.

pub mod auth;
pub mod context;
pub mod database;
pub mod domain;
pub mod integrations;

#[cfg(test)]
mod test;

mod hex;
mod uuids;
