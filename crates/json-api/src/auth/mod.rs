//! Authentication

mod cookie;
mod errors;
pub(crate) mod handlers;
pub(crate) mod middleware;

pub(crate) use cookie::*;
pub(crate) use errors::*;
