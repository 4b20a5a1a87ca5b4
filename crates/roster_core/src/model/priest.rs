//! Priest (duty actor) model.
//!
//! # Responsibility
//! - Define the priest directory record.
//! - Normalize display names before persistence.
//!
//! # Invariants
//! - `name` is trimmed and never empty.
//! - Name uniqueness is enforced by storage, not by this type.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a priest.
pub type PriestId = Uuid;

/// Directory record for one priest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Priest {
    pub id: PriestId,
    /// Display name, unique across the directory.
    pub name: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

/// Rejection reasons for priest input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriestValidationError {
    EmptyName,
}

impl Display for PriestValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "priest name cannot be empty"),
        }
    }
}

impl Error for PriestValidationError {}

/// Trims surrounding whitespace and rejects empty names.
pub fn normalize_priest_name(name: &str) -> Result<String, PriestValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(PriestValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{normalize_priest_name, PriestValidationError};

    #[test]
    fn normalize_trims_surrounding_whitespace() {
        assert_eq!(
            normalize_priest_name("  Fr. Ivan \n").expect("name should normalize"),
            "Fr. Ivan"
        );
    }

    #[test]
    fn normalize_keeps_inner_whitespace() {
        assert_eq!(
            normalize_priest_name("Fr.  Ivan").expect("name should normalize"),
            "Fr.  Ivan"
        );
    }

    #[test]
    fn normalize_rejects_blank_names() {
        assert_eq!(
            normalize_priest_name(" \t "),
            Err(PriestValidationError::EmptyName)
        );
        assert_eq!(normalize_priest_name(""), Err(PriestValidationError::EmptyName));
    }
}
