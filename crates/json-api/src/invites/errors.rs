//! Invite Errors

use scholarlink_app::domain::invites::InvitesServiceError;

use crate::errors::ApiError;

pub(crate) fn into_api_error(error: InvitesServiceError) -> ApiError {
    match error {
        InvitesServiceError::Validation(reason) => ApiError::bad_request(reason.to_string()),
        InvitesServiceError::EmailTaken(email) => {
            ApiError::conflict(format!("A user with email {email} already exists"))
        }
        InvitesServiceError::MatricNumberTaken(matric_number) => ApiError::conflict(format!(
            "Matric number {matric_number} is already in use in this school"
        )),
        InvitesServiceError::AlreadyUsed => ApiError::conflict("Invite has already been used"),
        InvitesServiceError::AlreadyExists => ApiError::conflict("Invite already exists"),
        InvitesServiceError::Expired => ApiError::gone("Invite has expired, ask for a new one"),
        InvitesServiceError::Forbidden => {
            ApiError::forbidden("You are not allowed to manage this invite")
        }
        InvitesServiceError::NotFound => ApiError::not_found("Invite not found"),
        InvitesServiceError::InvalidReference | InvitesServiceError::InvalidData => {
            ApiError::bad_request("Invalid invite payload")
        }
        InvitesServiceError::Mailer(source) => {
            ApiError::bad_gateway("failed to send invite email", &source)
        }
        InvitesServiceError::Storage(source) => {
            ApiError::bad_gateway("failed to store profile image", &source)
        }
        InvitesServiceError::ExpiryOutOfRange(source) => {
            ApiError::internal("invite expiry out of range", &source)
        }
        InvitesServiceError::Password(source) => {
            ApiError::internal("failed to hash password", &source)
        }
        InvitesServiceError::Sql(source) => ApiError::internal("invite storage failed", &source),
    }
}
