//! Account Errors

use scholarlink_app::domain::accounts::AccountsServiceError;

use crate::errors::ApiError;

pub(crate) fn into_api_error(error: AccountsServiceError) -> ApiError {
    match error {
        AccountsServiceError::Validation(reason) => ApiError::bad_request(reason.to_string()),
        AccountsServiceError::EmailTaken(email) => {
            ApiError::conflict(format!("A user with email {email} already exists"))
        }
        AccountsServiceError::AlreadyExists => ApiError::conflict("Account already exists"),
        AccountsServiceError::NotFound => ApiError::not_found("Account not found"),
        AccountsServiceError::InvalidReference | AccountsServiceError::InvalidData => {
            ApiError::bad_request("Invalid account payload")
        }
        AccountsServiceError::Mailer(source) => {
            ApiError::bad_gateway("failed to send verification email", &source)
        }
        AccountsServiceError::ExpiryOutOfRange(source) => {
            ApiError::internal("verification code expiry out of range", &source)
        }
        AccountsServiceError::Password(source) => {
            ApiError::internal("failed to hash password", &source)
        }
        AccountsServiceError::Sql(source) => ApiError::internal("account storage failed", &source),
    }
}
