//! Course Errors

use scholarlink_app::domain::{courses::CoursesServiceError, results::ResultsServiceError};

use crate::errors::ApiError;

pub(crate) fn into_api_error(error: CoursesServiceError) -> ApiError {
    match error {
        CoursesServiceError::Validation(reason) => ApiError::bad_request(reason.to_string()),
        CoursesServiceError::CodeTaken(code) => {
            ApiError::conflict(format!("Course code {code} already exists in this school"))
        }
        CoursesServiceError::AlreadyExists => ApiError::conflict("Course already exists"),
        CoursesServiceError::Forbidden => {
            ApiError::forbidden("Only course admins can manage this course")
        }
        CoursesServiceError::CreatorRemoval => {
            ApiError::bad_request("The course creator cannot be removed")
        }
        CoursesServiceError::NotFound => ApiError::not_found("Course or teacher not found"),
        CoursesServiceError::InvalidReference | CoursesServiceError::InvalidData => {
            ApiError::bad_request("Invalid course payload")
        }
        CoursesServiceError::Sql(source) => ApiError::internal("course storage failed", &source),
    }
}

pub(crate) fn results_api_error(error: ResultsServiceError) -> ApiError {
    match error {
        ResultsServiceError::Validation(reason) => ApiError::bad_request(reason.to_string()),
        ResultsServiceError::Forbidden => {
            ApiError::forbidden("Only course admins can manage results")
        }
        ResultsServiceError::NotFound => ApiError::not_found("Course not found"),
        ResultsServiceError::AlreadyExists => ApiError::conflict("Result already exists"),
        ResultsServiceError::InvalidReference | ResultsServiceError::InvalidData => {
            ApiError::bad_request("Invalid result payload")
        }
        ResultsServiceError::Sql(source) => ApiError::internal("result storage failed", &source),
    }
}
