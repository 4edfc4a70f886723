use thiserror::Error;

use crate::address::AddressError;
use crate::mx::MxError;
use crate::permutation::PermutationError;

/// Operator parameters rejected before a run starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("sender address is invalid: {0}")]
    InvalidSender(#[source] AddressError),
    #[error("default mailbox '{input}' is invalid: {source}")]
    InvalidDefaultAddress {
        input: String,
        #[source]
        source: AddressError,
    },
    #[error("delay range [{min}, {max}] is invalid: {reason}")]
    InvalidDelay {
        min: String,
        max: String,
        reason: &'static str,
    },
    #[error("part {index} of {total} is out of range")]
    InvalidPartition { index: usize, total: usize },
    #[error("HELO name '{input}' is invalid: {source}")]
    InvalidHelo {
        input: String,
        #[source]
        source: AddressError,
    },
    #[error("{stage} timeout must be greater than zero")]
    InvalidTimeout { stage: &'static str },
    #[error("at least one mail exchanger must be allowed")]
    NoExchangerAllowed,
    #[error("debug level {0} is not one of 0, 1, 2")]
    InvalidVerbosity(u8),
}

/// Failures that stop a run before any probe is sent.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid options: {0}")]
    Options(#[from] OptionsError),
    #[error("invalid input: {0}")]
    InvalidInput(#[from] PermutationError),
    #[error(transparent)]
    Mx(#[from] MxError),
}
