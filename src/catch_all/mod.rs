//! Catch-all detection.
//!
//! A domain whose exchanger accepts a mailbox nobody could own accepts
//! everything, so an `Accepted` probe on that domain proves nothing. The
//! detector probes one random local part per domain and reports a
//! [`CatchAllVerdict`] the orchestrator consults before classifying.

use std::fmt;

use rand::{Rng, distributions::Alphanumeric};
use tracing::debug;

use crate::mx::MailExchanger;
use crate::smtp::{MailboxProbe, ProbeOutcome, ProbeResult, SmtpProber, probe_exchangers};

const RANDOM_LOCAL_LEN: usize = 24;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchAllVerdict {
    IsCatchAll,
    NotCatchAll,
    /// The random probe got no definitive answer.
    Indeterminate,
}

impl CatchAllVerdict {
    pub fn from_outcome(outcome: &ProbeOutcome) -> Self {
        match outcome {
            ProbeOutcome::Accepted => Self::IsCatchAll,
            ProbeOutcome::Rejected => Self::NotCatchAll,
            ProbeOutcome::Unknown(_) | ProbeOutcome::Timeout(_) => Self::Indeterminate,
        }
    }
}

impl fmt::Display for CatchAllVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::IsCatchAll => "catch-all",
            Self::NotCatchAll => "not catch-all",
            Self::Indeterminate => "indeterminate",
        })
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchAllReport {
    pub verdict: CatchAllVerdict,
    /// Random address that was probed.
    pub probe_address: String,
    pub result: Option<ProbeResult>,
}

/// Probe a random mailbox of `domain`, trying `exchangers` in order while
/// they fail at the connection level.
pub fn detect_catch_all(
    prober: &SmtpProber,
    exchangers: &[MailExchanger],
    domain: &str,
) -> CatchAllReport {
    detect_with(prober, exchangers, domain)
}

pub(crate) fn detect_with<P>(prober: &P, exchangers: &[MailExchanger], domain: &str) -> CatchAllReport
where
    P: MailboxProbe + ?Sized,
{
    let probe_address = format!("{}@{domain}", random_local_part());
    let result = probe_exchangers(prober, exchangers, &probe_address);
    let verdict = result
        .as_ref()
        .map(|result| CatchAllVerdict::from_outcome(&result.outcome))
        .unwrap_or(CatchAllVerdict::Indeterminate);
    debug!(domain, %probe_address, %verdict, "catch-all detection");
    CatchAllReport {
        verdict,
        probe_address,
        result,
    }
}

pub(crate) fn random_local_part() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_LOCAL_LEN)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect()
}
