//! Validation runs: resolve, detect catch-all, check the default mailbox,
//! then probe every candidate of the selected partition one at a time.
//!
//! Probing is strictly sequential and paced by a random pause between two
//! network probes. Every candidate of the partition ends up with exactly one
//! [`ValidationRecord`], including candidates that were never probed.

mod cancel;
mod error;
mod options;
mod pacing;
mod partition;
mod types;

pub use cancel::CancellationToken;
pub use error::{OptionsError, ValidationError};
pub use options::{DEFAULT_MAILBOX, DefaultCheckPolicy, DelayRange, ValidationOptions};
pub use partition::{DEFAULT_TOTAL_PARTS, Partition};
pub use types::{
    Classification, DefaultCheckReport, DomainReport, PermutationRequest, RunSummary,
    ValidationRecord, ValidationRun, classify,
};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::address::{self, parse_address};
use crate::catch_all::{self, CatchAllVerdict};
use crate::mx::{LookupMx, MailExchanger, MxCache, system_resolver};
use crate::permutation::{self, Candidate, PermutationError};
use crate::smtp::{
    MailboxProbe, ProbeOutcome, ProbeResult, SmtpProber, UnknownCause, probe_exchangers,
};
use pacing::{Pacer, Sleep, ThreadSleep};

/// Generate the permutations of `request` and validate them against the
/// request's domain.
///
/// Bad names, a bad domain and a domain without mail exchanger are reported
/// as errors before anything is sent over SMTP.
pub fn validate_permutations(
    request: &PermutationRequest,
    options: &ValidationOptions,
) -> Result<ValidationRun, ValidationError> {
    validate_permutations_with_cancel(request, options, &CancellationToken::new())
}

pub fn validate_permutations_with_cancel(
    request: &PermutationRequest,
    options: &ValidationOptions,
    cancel: &CancellationToken,
) -> Result<ValidationRun, ValidationError> {
    options.validate()?;
    let prepared = prepare(request)?;
    let resolver = system_resolver()?;
    let prober = SmtpProber::new(options.probe.clone());
    let mut engine = Engine::new(&resolver, &prober, ThreadSleep, options, cancel);
    engine.prepared(prepared)
}

/// Generated candidates and the ASCII domain they share.
pub(crate) struct Prepared {
    domain: String,
    candidates: Vec<Candidate>,
}

/// Check the request and generate its candidates without touching the
/// network.
pub(crate) fn prepare(request: &PermutationRequest) -> Result<Prepared, ValidationError> {
    let candidates = permutation::generate(
        &request.first_name,
        &request.last_name,
        &request.domain,
        request.density,
    )?;
    let domain =
        address::normalize_domain(&request.domain).map_err(PermutationError::InvalidDomain)?;
    Ok(Prepared { domain, candidates })
}

/// Validate addresses collected elsewhere. Addresses are grouped by domain
/// in first-seen order and each domain is handled on its own: a domain that
/// cannot be resolved only fails its own addresses.
pub fn validate_addresses(
    addresses: &[String],
    options: &ValidationOptions,
) -> Result<ValidationRun, ValidationError> {
    validate_addresses_with_cancel(addresses, options, &CancellationToken::new())
}

pub fn validate_addresses_with_cancel(
    addresses: &[String],
    options: &ValidationOptions,
    cancel: &CancellationToken,
) -> Result<ValidationRun, ValidationError> {
    options.validate()?;
    let resolver = system_resolver()?;
    let prober = SmtpProber::new(options.probe.clone());
    let mut engine = Engine::new(&resolver, &prober, ThreadSleep, options, cancel);
    Ok(engine.addresses(addresses))
}

enum Entry {
    Parsed(Candidate),
    Malformed { input: String, reason: String },
}

/// State of one run. Network and clock are behind seams so the whole
/// sequence can be driven by stubs.
pub(crate) struct Engine<'a, R: ?Sized, P: ?Sized, S> {
    resolver: &'a R,
    prober: &'a P,
    pacer: Pacer<S>,
    options: &'a ValidationOptions,
    cancel: &'a CancellationToken,
    cache: MxCache,
}

impl<'a, R, P, S> Engine<'a, R, P, S>
where
    R: LookupMx + ?Sized,
    P: MailboxProbe + ?Sized,
    S: Sleep,
{
    pub(crate) fn new(
        resolver: &'a R,
        prober: &'a P,
        sleeper: S,
        options: &'a ValidationOptions,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            resolver,
            prober,
            pacer: Pacer::new(options.delay, sleeper),
            options,
            cancel,
            cache: MxCache::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn permutations(
        &mut self,
        request: &PermutationRequest,
    ) -> Result<ValidationRun, ValidationError> {
        let prepared = prepare(request)?;
        self.prepared(prepared)
    }

    fn prepared(&mut self, prepared: Prepared) -> Result<ValidationRun, ValidationError> {
        let Prepared { domain, candidates } = prepared;
        let selected = self.select(&candidates);
        debug!(
            domain = %domain,
            generated = candidates.len(),
            selected = selected.len(),
            "candidates ready"
        );

        let exchangers = self.cache.get_or_resolve(self.resolver, &domain)?;
        let report = self.probe_domain(&domain, &exchangers, selected);
        Ok(ValidationRun::from_reports(vec![report]))
    }

    pub(crate) fn addresses(&mut self, inputs: &[String]) -> ValidationRun {
        let selected = self.select(inputs);
        let mut groups: Vec<(String, Vec<Entry>)> = Vec::new();
        for input in selected {
            let (domain, entry) = match parse_address(input) {
                Ok(address) => {
                    let candidate = Candidate::supplied(address);
                    (candidate.domain().to_string(), Entry::Parsed(candidate))
                }
                Err(err) => {
                    debug!(input = %input, error = %err, "malformed address");
                    let domain = input
                        .rsplit_once('@')
                        .map(|(_, domain)| domain.trim().to_ascii_lowercase())
                        .unwrap_or_default();
                    let entry = Entry::Malformed {
                        input: input.clone(),
                        reason: err.to_string(),
                    };
                    (domain, entry)
                }
            };
            match groups.iter_mut().find(|(known, _)| *known == domain) {
                Some((_, entries)) => entries.push(entry),
                None => groups.push((domain, vec![entry])),
            }
        }

        let reports = groups
            .into_iter()
            .map(|(domain, entries)| self.address_group(&domain, entries))
            .collect();
        ValidationRun::from_reports(reports)
    }

    fn select<'i, T>(&self, items: &'i [T]) -> &'i [T] {
        match self.options.partition {
            Some(partition) => partition.slice(items),
            None => items,
        }
    }

    fn address_group(&mut self, domain: &str, entries: Vec<Entry>) -> DomainReport {
        let candidates: Vec<Candidate> = entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Parsed(candidate) => Some(candidate.clone()),
                Entry::Malformed { .. } => None,
            })
            .collect();

        let mut report = if candidates.is_empty() {
            DomainReport::new(domain)
        } else {
            match self.cache.get_or_resolve(self.resolver, domain) {
                Ok(exchangers) => self.probe_domain(domain, &exchangers, &candidates),
                Err(err) => {
                    warn!(domain, error = %err, "skipping domain");
                    let diagnostic = err.to_string();
                    DomainReport {
                        records: candidates
                            .iter()
                            .map(|candidate| ValidationRecord::unprobed(candidate, &diagnostic))
                            .collect(),
                        failure: Some(diagnostic),
                        ..DomainReport::new(domain)
                    }
                }
            }
        };

        // restore input order, malformed entries included
        let mut probed = std::mem::take(&mut report.records).into_iter();
        for entry in entries {
            let record = match entry {
                Entry::Parsed(_) => probed.next(),
                Entry::Malformed { input, reason } => {
                    Some(ValidationRecord::malformed(&input, reason))
                }
            };
            report.records.extend(record);
        }
        report
    }

    /// Catch-all detection, default-mailbox check, then each candidate.
    fn probe_domain(
        &mut self,
        domain: &str,
        exchangers: &Arc<[MailExchanger]>,
        candidates: &[Candidate],
    ) -> DomainReport {
        let mut report = DomainReport {
            exchangers: exchangers.to_vec(),
            ..DomainReport::new(domain)
        };
        if candidates.is_empty() {
            return report;
        }
        let usable = &exchangers[..exchangers.len().min(self.options.max_exchangers)];

        if !self.pacer.before_probe(self.cancel) {
            return self.abandon(report, candidates, "run cancelled before probing");
        }
        let mut catch_all = catch_all::detect_with(self.prober, usable, domain);
        if !self.options.keep_transcripts() {
            if let Some(result) = catch_all.result.as_mut() {
                result.transcript.clear();
            }
        }
        let verdict = catch_all.verdict;
        match verdict {
            CatchAllVerdict::Indeterminate => warn!(
                domain,
                "catch-all status unknown, results for this domain are errors"
            ),
            CatchAllVerdict::IsCatchAll => info!(domain, "domain accepts every mailbox"),
            CatchAllVerdict::NotCatchAll => debug!(domain, "domain is not catch-all"),
        }
        report.catch_all = Some(catch_all);

        if let Some(gate) = self.default_check(domain, usable, &mut report) {
            return self.abandon(report, candidates, &gate);
        }
        if report.cancelled {
            return self.abandon(report, candidates, "run cancelled before probing");
        }

        let keep_transcript = self.options.keep_transcripts();
        for (done, candidate) in candidates.iter().enumerate() {
            if !self.pacer.before_probe(self.cancel) {
                info!(
                    domain,
                    remaining = candidates.len() - done,
                    "run cancelled"
                );
                report.records.extend(candidates[done..].iter().map(|candidate| {
                    ValidationRecord::unprobed(candidate, "run cancelled before probing")
                }));
                report.cancelled = true;
                return report;
            }
            let result = probe_exchangers(self.prober, usable, candidate.address())
                .unwrap_or_else(|| no_exchanger(candidate.address()));
            let record = ValidationRecord::probed(candidate, result, verdict, keep_transcript);
            info!(
                address = %record.address,
                classification = %record.classification,
                diagnostic = %record.diagnostic,
                "candidate classified"
            );
            report.records.push(record);
        }
        report
    }

    /// Runs the default-mailbox check according to policy. Returns the
    /// reason for leaving candidates unprobed when the gate stays shut.
    fn default_check(
        &mut self,
        domain: &str,
        usable: &[MailExchanger],
        report: &mut DomainReport,
    ) -> Option<String> {
        let policy = self.options.default_check;
        if policy == DefaultCheckPolicy::Skip {
            return None;
        }
        let mailbox = match self.options.default_mailbox(domain) {
            Ok(mailbox) => mailbox.to_string(),
            Err(err) => {
                warn!(domain, error = %err, "default mailbox check skipped");
                return (policy == DefaultCheckPolicy::Gate)
                    .then(|| format!("default mailbox check impossible: {err}"));
            }
        };
        if !self.pacer.before_probe(self.cancel) {
            report.cancelled = true;
            return None;
        }
        let result =
            probe_exchangers(self.prober, usable, &mailbox).unwrap_or_else(|| no_exchanger(&mailbox));
        debug!(domain, %mailbox, outcome = %result.outcome, "default mailbox checked");
        let outcome = result.outcome;
        let mut check = DefaultCheckReport {
            address: mailbox,
            result,
        };
        if !self.options.keep_transcripts() {
            check.result.transcript.clear();
        }
        let gate = (policy == DefaultCheckPolicy::Gate && outcome != ProbeOutcome::Accepted)
            .then(|| {
                format!(
                    "default mailbox {} not accepted ({outcome}); candidates not probed",
                    check.address
                )
            });
        if gate.is_some() {
            warn!(domain, mailbox = %check.address, %outcome, "default mailbox gate closed");
        }
        report.default_check = Some(check);
        gate
    }

    fn abandon(
        &self,
        mut report: DomainReport,
        candidates: &[Candidate],
        diagnostic: &str,
    ) -> DomainReport {
        if self.cancel.is_cancelled() {
            report.cancelled = true;
        }
        report.records = candidates
            .iter()
            .map(|candidate| ValidationRecord::unprobed(candidate, diagnostic))
            .collect();
        report
    }
}

fn no_exchanger(address: &str) -> ProbeResult {
    ProbeResult::new(address, "", ProbeOutcome::Unknown(UnknownCause::ConnectionRefused))
        .with_detail("no mail exchanger to probe")
}
