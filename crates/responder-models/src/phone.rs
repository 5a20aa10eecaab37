//! Phone number normalization.
//!
//! Numbers arrive in every shape imaginable: `+1 (555) 123-4567` from the
//! call log, `15551234567` typed into the API, `+15551234567` in the
//! whitelist file. All of them are reduced to a canonical `+<digits>` form
//! before they are compared or stored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors raised when a raw string cannot be turned into a phone number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneError {
    /// The input was empty or whitespace only.
    #[error("phone number is empty")]
    Empty,

    /// The input contained no digits at all.
    #[error("phone number has no digits: {0:?}")]
    NoDigits(String),
}

/// A normalized phone number: a leading `+` followed by ASCII digits only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalizes a raw phone string.
    ///
    /// Every character that is not an ASCII digit is dropped, except a `+`
    /// in leading position. A `+` is prepended when missing.
    ///
    /// # Errors
    /// Returns `PhoneError::Empty` for blank input and `PhoneError::NoDigits`
    /// when nothing numeric is left after stripping.
    pub fn parse(raw: &str) -> Result<Self, PhoneError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }

        let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(PhoneError::NoDigits(raw.to_string()));
        }

        Ok(Self(format!("+{}", digits)))
    }

    /// Returns the canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the digits without the leading `+`.
    pub fn digits(&self) -> &str {
        &self.0[1..]
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PhoneNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PhoneNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
