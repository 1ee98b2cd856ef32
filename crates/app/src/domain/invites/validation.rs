//! Invite input validation.

use std::collections::HashSet;

use crate::{
    auth::MIN_PASSWORD_LENGTH,
    domain::{
        academic::AcademicSession,
        invites::{
            data::{InviteEdit, InviteEntry, ValidatedInvite},
            errors::InviteValidationError,
        },
        users::records::{Role, RoleDetails, StudentDetails, is_plausible_email, normalize_email},
    },
};

/// Normalised emails of the batch, rejecting repeats.
pub(crate) fn unique_emails(entries: &[InviteEntry]) -> Result<Vec<String>, InviteValidationError> {
    let mut seen = HashSet::with_capacity(entries.len());

    entries
        .iter()
        .map(|entry| {
            let email = normalize_email(&entry.email);

            if seen.insert(email.clone()) {
                Ok(email)
            } else {
                Err(InviteValidationError::DuplicateEmail(email))
            }
        })
        .collect()
}

/// Matric numbers of student entries, rejecting repeats.
pub(crate) fn unique_matric_numbers(
    entries: &[InviteEntry],
) -> Result<Vec<String>, InviteValidationError> {
    let mut seen = HashSet::new();
    let mut matric_numbers = Vec::new();

    for entry in entries {
        if !entry.role.trim().eq_ignore_ascii_case(Role::Student.as_str()) {
            continue;
        }

        let Some(matric_number) = non_empty(entry.matric_number.as_deref()) else {
            continue;
        };

        if !seen.insert(matric_number.clone()) {
            return Err(InviteValidationError::DuplicateMatricNumber(matric_number));
        }

        matric_numbers.push(matric_number);
    }

    Ok(matric_numbers)
}

/// Per-entry shape checks.
pub(crate) fn validate_entry(entry: &InviteEntry) -> Result<ValidatedInvite, InviteValidationError> {
    let name = non_empty(Some(&entry.name)).ok_or(InviteValidationError::MissingName)?;
    let email = validate_email(&entry.email)?;
    let session = required_session(entry.session.as_deref())?;

    let details = match entry.role.trim().to_ascii_lowercase().as_str() {
        "student" => RoleDetails::Student(StudentDetails {
            matric_number: non_empty(entry.matric_number.as_deref()),
            department: non_empty(entry.department.as_deref()),
            program: non_empty(entry.program.as_deref()),
            academic_session: Some(session),
            class_name: non_empty(entry.class_name.as_deref())
                .ok_or(InviteValidationError::MissingClassName)?,
        }),
        "teacher" => RoleDetails::Teacher {
            department: non_empty(entry.department.as_deref()),
        },
        _ => return Err(InviteValidationError::UnsupportedRole(entry.role.clone())),
    };

    Ok(ValidatedInvite {
        name,
        email,
        details,
    })
}

/// Apply an edit to an invite's fields, re-validating what changed.
pub(crate) fn apply_edit(
    name: &str,
    email: &str,
    details: &RoleDetails,
    edit: InviteEdit,
) -> Result<ValidatedInvite, InviteValidationError> {
    let name = match edit.name {
        Some(name) => non_empty(Some(&name)).ok_or(InviteValidationError::MissingName)?,
        None => name.to_string(),
    };

    let email = match edit.email {
        Some(email) => validate_email(&email)?,
        None => email.to_string(),
    };

    let details = match details {
        RoleDetails::Student(current) => RoleDetails::Student(StudentDetails {
            matric_number: merge(edit.matric_number, current.matric_number.as_deref()),
            department: merge(edit.department, current.department.as_deref()),
            program: merge(edit.program, current.program.as_deref()),
            academic_session: match edit.session {
                Some(session) => Some(required_session(Some(&session))?),
                None => current.academic_session.clone(),
            },
            class_name: match edit.class_name {
                Some(class_name) => non_empty(Some(&class_name))
                    .ok_or(InviteValidationError::MissingClassName)?,
                None => current.class_name.clone(),
            },
        }),
        RoleDetails::Teacher { department } => {
            if let Some(session) = edit.session.as_deref() {
                required_session(Some(session))?;
            }

            RoleDetails::Teacher {
                department: merge(edit.department, department.as_deref()),
            }
        }
        other @ (RoleDetails::Admin | RoleDetails::SuperAdmin) => {
            return Err(InviteValidationError::UnsupportedRole(
                other.role().as_str().to_string(),
            ));
        }
    };

    Ok(ValidatedInvite {
        name,
        email,
        details,
    })
}

pub(crate) fn validate_password(
    password: &str,
    confirm_password: &str,
) -> Result<(), InviteValidationError> {
    if password != confirm_password {
        return Err(InviteValidationError::PasswordMismatch);
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(InviteValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    Ok(())
}

fn validate_email(raw: &str) -> Result<String, InviteValidationError> {
    let email = normalize_email(raw);

    if is_plausible_email(&email) {
        Ok(email)
    } else {
        Err(InviteValidationError::InvalidEmail(email))
    }
}

/// Every invitee, teachers included, carries an academic session.
fn required_session(raw: Option<&str>) -> Result<AcademicSession, InviteValidationError> {
    let session = non_empty(raw).ok_or(InviteValidationError::MissingSession)?;

    session
        .parse::<AcademicSession>()
        .map_err(|_error| InviteValidationError::InvalidSession(session))
}

/// An explicitly empty edit value clears the field.
fn merge(edit: Option<String>, current: Option<&str>) -> Option<String> {
    match edit {
        Some(value) => non_empty(Some(&value)),
        None => current.map(str::to_string),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
