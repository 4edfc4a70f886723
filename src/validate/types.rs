use std::fmt;

#[cfg(feature = "with-serde")]
use serde::Serialize;

use crate::catch_all::{CatchAllReport, CatchAllVerdict};
use crate::mx::MailExchanger;
use crate::permutation::{Candidate, Density, Pattern};
use crate::smtp::{ProbeOutcome, ProbeResult, SmtpEvent};

/// Name and domain to generate and validate permutations for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationRequest {
    pub first_name: String,
    pub last_name: String,
    pub domain: String,
    pub density: Density,
}

impl PermutationRequest {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        domain: impl Into<String>,
        density: Density,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            domain: domain.into(),
            density,
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(Serialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Valid,
    Invalid,
    /// Accepted, but the domain accepts every mailbox.
    CatchAllSuppressed,
    Error,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::CatchAllSuppressed => "catch_all_suppressed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combine one probe outcome with the domain's catch-all verdict.
///
/// An indeterminate verdict makes every answer meaningless, and an
/// acceptance on a catch-all domain proves nothing.
pub fn classify(outcome: &ProbeOutcome, verdict: CatchAllVerdict) -> Classification {
    if verdict == CatchAllVerdict::Indeterminate {
        return Classification::Error;
    }
    match outcome {
        ProbeOutcome::Accepted if verdict == CatchAllVerdict::IsCatchAll => {
            Classification::CatchAllSuppressed
        }
        ProbeOutcome::Accepted => Classification::Valid,
        ProbeOutcome::Rejected => Classification::Invalid,
        ProbeOutcome::Unknown(_) | ProbeOutcome::Timeout(_) => Classification::Error,
    }
}

/// Final word on one candidate. Every candidate of a run gets exactly one.
#[cfg_attr(feature = "with-serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRecord {
    pub domain: String,
    pub address: String,
    /// Pattern label for generated candidates, `None` for supplied ones.
    pub pattern: Option<String>,
    pub classification: Classification,
    /// `None` when the candidate was never probed.
    pub outcome: Option<ProbeOutcome>,
    pub exchange: Option<String>,
    pub diagnostic: String,
    #[cfg_attr(
        feature = "with-serde",
        serde(skip_serializing_if = "Vec::is_empty")
    )]
    pub transcript: Vec<SmtpEvent>,
}

impl ValidationRecord {
    pub(crate) fn probed(
        candidate: &Candidate,
        result: ProbeResult,
        verdict: CatchAllVerdict,
        keep_transcript: bool,
    ) -> Self {
        let classification = classify(&result.outcome, verdict);
        let mut diagnostic = result.diagnostic();
        if verdict == CatchAllVerdict::Indeterminate {
            diagnostic = format!("catch-all status unknown; {diagnostic}");
        }
        Self {
            domain: candidate.domain().to_string(),
            address: candidate.address().to_string(),
            pattern: pattern_label(candidate),
            classification,
            outcome: Some(result.outcome),
            exchange: Some(result.exchange),
            diagnostic,
            transcript: if keep_transcript {
                result.transcript
            } else {
                Vec::new()
            },
        }
    }

    pub(crate) fn unprobed(candidate: &Candidate, diagnostic: impl Into<String>) -> Self {
        Self {
            domain: candidate.domain().to_string(),
            address: candidate.address().to_string(),
            pattern: pattern_label(candidate),
            classification: Classification::Error,
            outcome: None,
            exchange: None,
            diagnostic: diagnostic.into(),
            transcript: Vec::new(),
        }
    }

    /// Record for input that could not even be parsed.
    pub(crate) fn malformed(input: &str, diagnostic: impl Into<String>) -> Self {
        Self {
            domain: input
                .rsplit_once('@')
                .map(|(_, domain)| domain.trim().to_ascii_lowercase())
                .unwrap_or_default(),
            address: input.trim().to_string(),
            pattern: None,
            classification: Classification::Error,
            outcome: None,
            exchange: None,
            diagnostic: diagnostic.into(),
            transcript: Vec::new(),
        }
    }
}

fn pattern_label(candidate: &Candidate) -> Option<String> {
    match candidate.pattern() {
        Pattern::Supplied => None,
        pattern => Some(pattern.label()),
    }
}

/// Outcome of probing the domain's default mailbox.
#[cfg_attr(feature = "with-serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultCheckReport {
    pub address: String,
    pub result: ProbeResult,
}

impl DefaultCheckReport {
    pub fn accepted(&self) -> bool {
        self.result.outcome == ProbeOutcome::Accepted
    }
}

/// Everything learnt about one domain during a run.
#[cfg_attr(feature = "with-serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainReport {
    pub domain: String,
    pub exchangers: Vec<MailExchanger>,
    pub catch_all: Option<CatchAllReport>,
    pub default_check: Option<DefaultCheckReport>,
    /// Why the domain could not be worked on at all.
    pub failure: Option<String>,
    pub records: Vec<ValidationRecord>,
    pub cancelled: bool,
}

impl DomainReport {
    pub(crate) fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            ..Self::default()
        }
    }

    pub fn verdict(&self) -> Option<CatchAllVerdict> {
        self.catch_all.as_ref().map(|report| report.verdict)
    }
}

/// Counts per classification across a run.
#[cfg_attr(feature = "with-serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub domains: usize,
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub catch_all_suppressed: usize,
    pub error: usize,
}

impl RunSummary {
    pub fn from_reports(reports: &[DomainReport]) -> Self {
        let mut summary = Self {
            domains: reports.len(),
            ..Self::default()
        };
        for record in reports.iter().flat_map(|report| &report.records) {
            summary.total += 1;
            match record.classification {
                Classification::Valid => summary.valid += 1,
                Classification::Invalid => summary.invalid += 1,
                Classification::CatchAllSuppressed => summary.catch_all_suppressed += 1,
                Classification::Error => summary.error += 1,
            }
        }
        summary
    }

    pub fn has_valid(&self) -> bool {
        self.valid > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} candidate(s) over {} domain(s): {} valid, {} invalid, {} catch-all, {} error",
            self.total, self.domains, self.valid, self.invalid, self.catch_all_suppressed, self.error
        )
    }
}

/// Result of a whole run, in input order.
#[cfg_attr(feature = "with-serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationRun {
    pub reports: Vec<DomainReport>,
    pub summary: RunSummary,
    pub cancelled: bool,
}

impl ValidationRun {
    pub(crate) fn from_reports(reports: Vec<DomainReport>) -> Self {
        let summary = RunSummary::from_reports(&reports);
        let cancelled = reports.iter().any(|report| report.cancelled);
        Self {
            reports,
            summary,
            cancelled,
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &ValidationRecord> {
        self.reports.iter().flat_map(|report| report.records.iter())
    }
}
