//! Academic calendar values shared by users, invites and results.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use thiserror::Error;

/// Rejected session or term text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AcademicValueError {
    #[error("session must look like 2024/2025")]
    InvalidSession,

    #[error("term must be one of first, second, third")]
    InvalidTerm,
}

/// An academic session in `YYYY/YYYY` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AcademicSession(String);

impl AcademicSession {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AcademicSession {
    type Err = AcademicValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let (start, end) = value
            .split_once('/')
            .ok_or(AcademicValueError::InvalidSession)?;

        let four_digits = |part: &str| part.len() == 4 && part.bytes().all(|b| b.is_ascii_digit());

        if !four_digits(start) || !four_digits(end) {
            return Err(AcademicValueError::InvalidSession);
        }

        Ok(Self(value.to_string()))
    }
}

impl fmt::Display for AcademicSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for AcademicSession {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AcademicSession {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;

        raw.parse().map_err(D::Error::custom)
    }
}

/// School term a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Term {
    First,
    Second,
    Third,
}

impl Term {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Third => "third",
        }
    }
}

impl FromStr for Term {
    type Err = AcademicValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "second" => Ok(Self::Second),
            "third" => Ok(Self::Third),
            _ => Err(AcademicValueError::InvalidTerm),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_accepts_two_four_digit_years() {
        let session: AcademicSession = "2024/2025".parse().expect("valid session");

        assert_eq!(session.as_str(), "2024/2025");
    }

    #[test]
    fn session_rejects_other_shapes() {
        for raw in ["2024-2025", "24/25", "2024/2025/2026", "abcd/efgh", "", "2024/"] {
            assert_eq!(
                raw.parse::<AcademicSession>(),
                Err(AcademicValueError::InvalidSession),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn term_parses_case_insensitively() {
        assert_eq!("Second".parse::<Term>(), Ok(Term::Second));
        assert!("fourth".parse::<Term>().is_err());
    }
}
