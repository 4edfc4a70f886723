use std::fmt;

use thiserror::Error;

use crate::address::AddressError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameField {
    First,
    Last,
}

impl fmt::Display for NameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first name"),
            Self::Last => f.write_str("last name"),
        }
    }
}

/// Input rejected before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermutationError {
    #[error("{field} is empty")]
    EmptyName { field: NameField },
    #[error("{field} '{value}' cannot be used in a local part: {reason}")]
    IllegalCharacters {
        field: NameField,
        value: String,
        reason: String,
    },
    #[error(transparent)]
    InvalidDomain(AddressError),
    #[error("density level {0} is not one of 1, 2, 3")]
    InvalidDensity(u8),
}
