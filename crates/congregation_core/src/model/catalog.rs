//! Reference entities used to tag attendance: classes and meetings.
//!
//! # Invariants
//! - Names are whitespace-normalized and non-empty.
//! - Renaming never rewrites attendance records that embedded the old name.

use crate::model::validation::{normalize_display_name, ModelValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable class identifier.
pub type ClassId = Uuid;
/// Stable meeting identifier.
pub type MeetingId = Uuid;

/// Congregation class (for example a youth or adult study group).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: ClassId,
    pub name: String,
}

/// Recurring or one-off meeting kind (for example Sunday service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: MeetingId,
    pub name: String,
    /// Only set by callers that track a single dated occurrence.
    pub scheduled_on: Option<NaiveDate>,
}

/// Normalizes a class or meeting name and rejects blank values.
pub fn normalize_catalog_name(value: &str) -> Result<String, ModelValidationError> {
    let normalized = normalize_display_name(value);
    if normalized.is_empty() {
        return Err(ModelValidationError::EmptyName);
    }
    Ok(normalized)
}

impl Class {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.name.trim().is_empty() {
            return Err(ModelValidationError::EmptyName);
        }
        Ok(())
    }
}

impl Meeting {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.name.trim().is_empty() {
            return Err(ModelValidationError::EmptyName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_catalog_name;
    use crate::model::validation::ModelValidationError;

    #[test]
    fn catalog_name_rejects_blank_and_trims() {
        assert_eq!(
            normalize_catalog_name(" \t "),
            Err(ModelValidationError::EmptyName)
        );
        assert_eq!(
            normalize_catalog_name("  Escola   Dominical ").unwrap(),
            "Escola Dominical"
        );
    }
}
