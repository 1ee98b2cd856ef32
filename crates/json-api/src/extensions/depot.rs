//! Depot helper extensions.

use std::any::Any;

use scholarlink_app::auth::AuthenticatedSession;
use salvo::prelude::Depot;

use crate::errors::ApiError;

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError>;

    fn insert_session(&mut self, session: AuthenticatedSession);

    /// The session the auth middleware resolved for this request.
    fn session_or_401(&self) -> Result<&AuthenticatedSession, ApiError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError> {
        self.obtain::<T>().map_err(|_ignored| {
            ApiError::internal(
                "depot value missing",
                &std::any::type_name::<T>(),
            )
        })
    }

    fn insert_session(&mut self, session: AuthenticatedSession) {
        self.inject(session);
    }

    fn session_or_401(&self) -> Result<&AuthenticatedSession, ApiError> {
        self.obtain::<AuthenticatedSession>()
            .map_err(|_ignored| ApiError::unauthorized("You need to sign in first"))
    }
}
