//! Member domain model.
//!
//! # Responsibility
//! - Define the canonical member record and its form input shape.
//! - Normalize and validate member input before persistence.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused.
//! - `full_name` is whitespace-normalized and has at least
//!   `MEMBER_NAME_MIN_CHARS` characters.
//! - Deactivation is the preferred lifecycle end; hard delete is allowed
//!   but never touches attendance history.

use crate::model::validation::{normalize_display_name, ModelValidationError};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable member identifier.
pub type MemberId = Uuid;

/// Minimum accepted member name length, in characters.
pub const MEMBER_NAME_MIN_CHARS: usize = 3;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9()\-.\s]{4,24}$").expect("valid phone regex"));

/// Registered congregation member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub full_name: String,
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
    pub joined_on: NaiveDate,
    /// Inactive members are hidden from attendance sheets and excluded from
    /// the attendance-rate denominator.
    pub is_active: bool,
    pub is_professed: bool,
}

/// Member form submission used for both create and full update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInput {
    pub full_name: String,
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
    pub joined_on: NaiveDate,
    pub is_active: bool,
    pub is_professed: bool,
}

impl MemberInput {
    /// Creates input with form defaults: active, not professed, no phone.
    pub fn new(full_name: impl Into<String>, birth_date: NaiveDate, joined_on: NaiveDate) -> Self {
        Self {
            full_name: full_name.into(),
            phone: None,
            birth_date,
            joined_on,
            is_active: true,
            is_professed: false,
        }
    }

    /// Returns a normalized copy, or the first validation failure.
    ///
    /// Blank phone values are treated as absent.
    pub fn normalized(&self) -> Result<Self, ModelValidationError> {
        let full_name = normalize_display_name(&self.full_name);
        validate_member_name(&full_name)?;

        let phone = match self.phone.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => {
                if !PHONE_RE.is_match(value) {
                    return Err(ModelValidationError::InvalidPhone(value.to_string()));
                }
                Some(value.to_string())
            }
        };

        Ok(Self {
            full_name,
            phone,
            ..self.clone()
        })
    }
}

impl Member {
    /// Builds a member from already-normalized input and a store-assigned id.
    pub fn from_input(id: MemberId, input: MemberInput) -> Self {
        Self {
            id,
            full_name: input.full_name,
            phone: input.phone,
            birth_date: input.birth_date,
            joined_on: input.joined_on,
            is_active: input.is_active,
            is_professed: input.is_professed,
        }
    }

    /// Checks persisted-shape invariants.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_member_name(&self.full_name)
    }
}

fn validate_member_name(name: &str) -> Result<(), ModelValidationError> {
    let actual_chars = name.chars().count();
    if actual_chars < MEMBER_NAME_MIN_CHARS {
        return Err(ModelValidationError::NameTooShort {
            min_chars: MEMBER_NAME_MIN_CHARS,
            actual_chars,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{MemberInput, ModelValidationError};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn normalized_rejects_short_names_after_trimming() {
        let input = MemberInput::new("  Jo  ", date(2000, 1, 1), date(2020, 1, 1));
        let err = input.normalized().unwrap_err();
        assert_eq!(
            err,
            ModelValidationError::NameTooShort {
                min_chars: 3,
                actual_chars: 2
            }
        );
    }

    #[test]
    fn normalized_counts_characters_not_bytes() {
        let input = MemberInput::new("Zé ", date(2000, 1, 1), date(2020, 1, 1));
        assert!(input.normalized().is_err());

        let input = MemberInput::new("Zoë", date(2000, 1, 1), date(2020, 1, 1));
        assert_eq!(input.normalized().unwrap().full_name, "Zoë");
    }

    #[test]
    fn normalized_drops_blank_phone_and_rejects_garbage() {
        let mut input = MemberInput::new("João Silva", date(2000, 1, 1), date(2020, 1, 1));
        input.phone = Some("   ".to_string());
        assert_eq!(input.normalized().unwrap().phone, None);

        input.phone = Some("(35) 99999-1111".to_string());
        assert_eq!(
            input.normalized().unwrap().phone.as_deref(),
            Some("(35) 99999-1111")
        );

        input.phone = Some("call me".to_string());
        assert!(matches!(
            input.normalized(),
            Err(ModelValidationError::InvalidPhone(_))
        ));
    }
}
