//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Library code never reads environment variables; the binary reads
//! them and hands the raw values to the `*_from_env_value` helpers below.

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_HISTORY_CAPACITY, ENCOUNTERS_DIR_NAME, MAX_HISTORY_CAPACITY,
};
use crate::error::{NoteError, NoteResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What to do when stored note content cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Substitute the canonical empty document, log a warning and report the recovery.
    #[default]
    Recover,
    /// Return the decode error to the caller.
    Reject,
}

impl FromStr for DecodePolicy {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recover" => Ok(DecodePolicy::Recover),
            "reject" => Ok(DecodePolicy::Reject),
            other => Err(NoteError::InvalidInput(format!(
                "unknown decode policy `{other}` (expected `recover` or `reject`)"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    history_capacity: usize,
    decode_policy: DecodePolicy,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::InvalidInput`] if `history_capacity` exceeds
    /// [`MAX_HISTORY_CAPACITY`].
    pub fn new(
        data_dir: PathBuf,
        history_capacity: usize,
        decode_policy: DecodePolicy,
    ) -> NoteResult<Self> {
        if history_capacity > MAX_HISTORY_CAPACITY {
            return Err(NoteError::InvalidInput(format!(
                "history capacity exceeds maximum of {MAX_HISTORY_CAPACITY}"
            )));
        }

        Ok(Self {
            data_dir,
            history_capacity,
            decode_policy,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn encounters_dir(&self) -> PathBuf {
        self.data_dir.join(ENCOUNTERS_DIR_NAME)
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    pub fn decode_policy(&self) -> DecodePolicy {
        self.decode_policy
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            decode_policy: DecodePolicy::default(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the data directory from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_DATA_DIR`].
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    non_blank(value)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Parse the undo history capacity from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_HISTORY_CAPACITY`].
pub fn history_capacity_from_env_value(value: Option<String>) -> NoteResult<usize> {
    match non_blank(value) {
        Some(v) => v.parse::<usize>().map_err(|_| {
            NoteError::InvalidInput(format!("history capacity is not a number: {v}"))
        }),
        None => Ok(DEFAULT_HISTORY_CAPACITY),
    }
}

/// Parse the decode policy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DecodePolicy::Recover`].
pub fn decode_policy_from_env_value(value: Option<String>) -> NoteResult<DecodePolicy> {
    non_blank(value)
        .map(|v| v.parse::<DecodePolicy>())
        .transpose()
        .map(Option::unwrap_or_default)
}
