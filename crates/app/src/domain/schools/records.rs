//! School Records

use jiff::Timestamp;
use rand::{RngCore, rngs::OsRng};
use serde::Serialize;

use crate::{domain::academic::AcademicSession, hex, uuids::TypedUuid};

/// School UUID
pub type SchoolUuid = TypedUuid<SchoolRecord>;

/// Prefix of the public school identifier.
pub const SCHOOL_CODE_PREFIX: &str = "SCH-";

/// School Record
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolRecord {
    pub uuid: SchoolUuid,
    pub code: String,
    pub name: String,
    pub address: String,
    pub current_session: Option<AcademicSession>,
    pub image_url: Option<String>,
    pub paid: bool,
    pub payment_date: Option<Timestamp>,
    pub subscription_expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New School Data
#[derive(Debug, Clone)]
pub struct NewSchool {
    pub uuid: SchoolUuid,
    pub code: String,
    pub name: String,
    pub address: String,
    pub current_session: Option<AcademicSession>,
}

/// Generate a public school identifier such as `SCH-9F03A1C2`.
#[must_use]
pub fn generate_school_code() -> String {
    let mut bytes = [0_u8; 4];

    OsRng.fill_bytes(&mut bytes);

    format!("{SCHOOL_CODE_PREFIX}{}", hex::encode(&bytes).to_uppercase())
}
