//! SMTP mailbox probing.
//!
//! [`SmtpProber::probe_address`] runs a minimal dialogue (greeting, `EHLO`
//! with `HELO` fallback, optional STARTTLS, `MAIL FROM`, `RCPT TO`) against a
//! single exchanger and folds whatever happens into a [`ProbeOutcome`]. The
//! connection is always torn down before the call returns.

mod classify;
mod error;
mod options;
mod probe;
mod session;
mod types;

pub use options::{ProbeOptions, StartTlsPolicy};
pub use probe::SmtpProber;
pub use types::{
    AttemptStage, EnhancedStatus, ProbeOutcome, ProbeResult, SmtpEvent, SmtpReply, UnknownCause,
};

pub(crate) use probe::{MailboxProbe, probe_exchangers};
