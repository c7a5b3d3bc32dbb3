//! Validated primitive types shared across the clinic workspace.

use std::str::FromStr;

/// Errors that can occur when creating record identifiers.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdError {
    /// Identifiers start at 1; 0 is the "not selected" value of a form field
    #[error("identifier must be at least 1")]
    Zero,
    /// The input was not a base-10 unsigned integer
    #[error("identifier is not a number: {0}")]
    NotANumber(String),
}

/// Identifier of a tenant, user, patient or encounter record.
///
/// Backend identifiers are positive integers. A value of `0` is what an untouched form
/// field submits, so it is rejected here rather than sent to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(u64);

impl RecordId {
    /// The first identifier a store allocates.
    pub const FIRST: RecordId = RecordId(1);

    /// Creates a new `RecordId`, rejecting `0`.
    pub fn new(value: u64) -> Result<Self, IdError> {
        if value == 0 {
            return Err(IdError::Zero);
        }
        Ok(Self(value))
    }

    /// Returns the raw integer value.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Returns the identifier that follows this one, or `None` at `u64::MAX`.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u64>()
            .map_err(|_| IdError::NotANumber(s.to_owned()))?;
        Self::new(value)
    }
}

impl serde::Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u64::deserialize(deserializer)?;
        RecordId::new(value).map_err(serde::de::Error::custom)
    }
}
