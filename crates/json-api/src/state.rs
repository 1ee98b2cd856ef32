//! State

use std::sync::Arc;

use scholarlink_app::context::AppContext;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,

    /// Mark the session cookie `Secure`.
    pub(crate) cookie_secure: bool,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, cookie_secure: bool) -> Self {
        Self { app, cookie_secure }
    }

    #[must_use]
    pub(crate) fn from_app_context(app: AppContext, cookie_secure: bool) -> Arc<Self> {
        Arc::new(Self::new(app, cookie_secure))
    }
}
