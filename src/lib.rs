#![forbid(unsafe_code)]
//! mailhunt_lib : génération de permutations e-mail et sondage SMTP.
//!
//! Given a name and a domain, [`generate`] builds candidate addresses;
//! [`validate_permutations`] then resolves the domain's mail exchangers,
//! checks whether the domain is catch-all and asks the exchanger, one
//! `RCPT TO` at a time, whether each candidate exists. Nothing is ever sent:
//! every conversation stops before `DATA`.

pub mod address;
pub mod catch_all;
#[cfg(feature = "with-config")]
pub mod config;
pub mod mx;
pub mod permutation;
pub mod smtp;
pub mod validate;

pub use address::{AddressError, EmailAddress, parse_address};
pub use catch_all::{CatchAllReport, CatchAllVerdict, detect_catch_all};
#[cfg(feature = "with-config")]
pub use config::{ConfigError, ConfigFile};
pub use mx::{MailExchanger, MxCache, MxError, MxStatus, resolve_exchangers};
pub use permutation::{Candidate, Density, Pattern, PermutationError, generate};
pub use smtp::{
    AttemptStage, ProbeOptions, ProbeOutcome, ProbeResult, SmtpProber, SmtpReply, StartTlsPolicy,
    UnknownCause,
};
pub use validate::{
    CancellationToken, Classification, DEFAULT_TOTAL_PARTS, DefaultCheckPolicy, DelayRange,
    DomainReport, OptionsError, Partition, PermutationRequest, RunSummary, ValidationError,
    ValidationOptions, ValidationRecord, ValidationRun, validate_addresses,
    validate_addresses_with_cancel, validate_permutations, validate_permutations_with_cancel,
};
