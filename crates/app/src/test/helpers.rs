//! Test Helpers

use jiff::{Timestamp, ToSpan};

use crate::{
    auth::PasswordHash,
    domain::{
        academic::AcademicSession,
        invites::{
            data::NewInvite,
            records::{InviteRecord, InviteUuid},
        },
        schools::records::{NewSchool, SchoolRecord, SchoolUuid, generate_school_code},
        users::{
            data::NewUser,
            records::{RoleDetails, StudentDetails, UserRecord, UserUuid},
        },
    },
    hex,
};

const TEST_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2hoYXNoaGFzaA";

pub(crate) fn session() -> AcademicSession {
    "2024/2025".parse().expect("valid session")
}

/// A school that is paid up for the next year, or unpaid.
pub(crate) fn school_record(paid: bool) -> SchoolRecord {
    let now = Timestamp::now();

    SchoolRecord {
        uuid: SchoolUuid::new(),
        code: generate_school_code(),
        name: "Greenfield Academy".to_string(),
        address: "12 Unity Road".to_string(),
        current_session: Some(session()),
        image_url: None,
        paid,
        payment_date: paid.then_some(now),
        subscription_expires_at: paid
            .then(|| now.checked_add(24.hours().checked_mul(365).expect("span")).expect("ts")),
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn new_school() -> NewSchool {
    NewSchool {
        uuid: SchoolUuid::new(),
        code: generate_school_code(),
        name: "Greenfield Academy".to_string(),
        address: "12 Unity Road".to_string(),
        current_session: Some(session()),
    }
}

pub(crate) fn student_details(class_name: &str) -> RoleDetails {
    RoleDetails::Student(StudentDetails {
        matric_number: None,
        department: None,
        program: None,
        academic_session: Some(session()),
        class_name: class_name.to_string(),
    })
}

pub(crate) fn new_user(school: SchoolUuid, details: RoleDetails) -> NewUser {
    let uuid = UserUuid::new();

    NewUser {
        uuid,
        school_uuid: school,
        name: "Ada Obi".to_string(),
        email: format!("{}@example.com", uuid.into_uuid().simple()),
        password_hash: PasswordHash::from_phc(TEST_PASSWORD_HASH.to_string()),
        details,
        verified: true,
        image_url: None,
    }
}

/// A verified user of `school` with a unique email.
pub(crate) fn user_record(school: &SchoolRecord, details: RoleDetails) -> UserRecord {
    user_from_new(new_user(school.uuid, details))
}

/// What the users table would hand back for `user`.
pub(crate) fn user_from_new(user: NewUser) -> UserRecord {
    let now = Timestamp::now();

    UserRecord {
        uuid: user.uuid,
        school_uuid: user.school_uuid,
        name: user.name,
        email: user.email,
        password_hash: user.password_hash,
        details: user.details,
        verified: user.verified,
        image_url: user.image_url,
        created_at: now,
        updated_at: now,
    }
}

/// An unused invite expiring a day from now.
pub(crate) fn invite_record(
    school: &SchoolRecord,
    created_by: UserUuid,
    details: RoleDetails,
) -> InviteRecord {
    invite_from_new(new_invite(school, created_by, details))
}

/// Invite insert with a unique token and email.
pub(crate) fn new_invite(
    school: &SchoolRecord,
    created_by: UserUuid,
    details: RoleDetails,
) -> NewInvite {
    let uuid = InviteUuid::new();
    let bytes = uuid.into_uuid().into_bytes();

    NewInvite {
        uuid,
        token: hex::encode(&[bytes, bytes].concat()),
        school_uuid: school.uuid,
        created_by,
        email: format!("{}@example.com", uuid.into_uuid().simple()),
        name: "Chidi Eze".to_string(),
        details,
        expires_at: Timestamp::now()
            .checked_add(24.hours())
            .expect("expiry in range"),
    }
}

/// What the invites table would hand back for `invite`.
pub(crate) fn invite_from_new(invite: NewInvite) -> InviteRecord {
    let now = Timestamp::now();

    InviteRecord {
        uuid: invite.uuid,
        token: invite.token,
        school_uuid: invite.school_uuid,
        created_by: invite.created_by,
        email: invite.email,
        name: invite.name,
        details: invite.details,
        expires_at: invite.expires_at,
        used: false,
        used_at: None,
        created_at: now,
        updated_at: now,
    }
}
