//! Validation errors and shared text normalization for model inputs.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Validation failure for member/class/meeting/attendance inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Member full name is shorter than the accepted minimum.
    NameTooShort { min_chars: usize, actual_chars: usize },
    /// Class or meeting name is empty after trimming.
    EmptyName,
    /// Phone contains characters outside digits and common separators.
    InvalidPhone(String),
    /// Attendance timestamp cannot be represented as a calendar instant.
    InvalidTimestamp(i64),
    /// A denormalized name field on an attendance record is blank.
    MissingSnapshotName(&'static str),
    /// Recorder identity is blank.
    MissingRecorder,
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameTooShort {
                min_chars,
                actual_chars,
            } => write!(
                f,
                "name must have at least {min_chars} characters, got {actual_chars}"
            ),
            Self::EmptyName => write!(f, "name cannot be empty"),
            Self::InvalidPhone(value) => write!(f, "invalid phone number `{value}`"),
            Self::InvalidTimestamp(value) => write!(f, "invalid registration timestamp {value}"),
            Self::MissingSnapshotName(field) => write!(f, "attendance field `{field}` is empty"),
            Self::MissingRecorder => write!(f, "attendance recorder id is empty"),
        }
    }
}

impl Error for ModelValidationError {}

/// Trims and collapses internal whitespace runs into single spaces.
pub fn normalize_display_name(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::normalize_display_name;

    #[test]
    fn normalize_display_name_collapses_whitespace() {
        assert_eq!(normalize_display_name("  Maria \t  Souza \n"), "Maria Souza");
        assert_eq!(normalize_display_name("   "), "");
    }
}
