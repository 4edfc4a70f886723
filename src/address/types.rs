use std::fmt;

use thiserror::Error;

/// A syntactically valid address, split and normalised.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress {
    pub local: String,
    /// ASCII (IDNA) lower-case domain.
    pub domain: String,
}

impl EmailAddress {
    pub fn new(local: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            domain: domain.into(),
        }
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local, self.domain)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid address '{input}': {}", .reasons.join("; "))]
    Invalid { input: String, reasons: Vec<String> },
    #[error("invalid domain '{input}': {}", .reasons.join("; "))]
    InvalidDomain { input: String, reasons: Vec<String> },
}

impl AddressError {
    pub fn reasons(&self) -> &[String] {
        match self {
            Self::Invalid { reasons, .. } | Self::InvalidDomain { reasons, .. } => reasons,
        }
    }
}
