//! Auth Errors

use scholarlink_app::auth::AuthServiceError;

use crate::errors::ApiError;

pub(crate) fn into_api_error(error: AuthServiceError) -> ApiError {
    match error {
        AuthServiceError::NotFound => ApiError::unauthorized("Session expired, please sign in again"),
        AuthServiceError::InvalidCredentials => ApiError::unauthorized("Invalid email or password"),
        AuthServiceError::Unverified => {
            ApiError::forbidden("Verify your email address before signing in")
        }
        AuthServiceError::Sql(source) => ApiError::internal("session storage failed", &source),
        AuthServiceError::Token(source) => ApiError::internal("session token failed", &source),
        AuthServiceError::ExpiryOutOfRange(source) => {
            ApiError::internal("session expiry out of range", &source)
        }
        AuthServiceError::Password(source) => {
            ApiError::internal("password verification failed", &source)
        }
    }
}
