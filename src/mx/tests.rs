use std::cell::Cell;

use super::resolver::{self, LookupMx};
use super::{MailExchanger, MxCache, MxError, MxStatus};
use trust_dns_resolver::error::ResolveError;

type LookupResult = Result<MxStatus, ResolveError>;
type LookupFn = dyn Fn(&str) -> LookupResult;

pub(crate) struct StubResolver {
    pub on_lookup: Box<LookupFn>,
    pub calls: Cell<usize>,
}

impl StubResolver {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> LookupResult + 'static,
    {
        Self {
            on_lookup: Box::new(f),
            calls: Cell::new(0),
        }
    }

    /// Answers every query with the same exchangers.
    pub(crate) fn with_records(records: Vec<MailExchanger>) -> Self {
        Self::new(move |_| Ok(MxStatus::Records(records.clone())))
    }
}

impl LookupMx for StubResolver {
    fn lookup_mx(&self, domain: &str) -> Result<MxStatus, ResolveError> {
        self.calls.set(self.calls.get() + 1);
        (self.on_lookup)(domain)
    }
}

#[test]
fn normalize_domain_rejects_empty() {
    let err = resolver::normalize_domain("  ").expect_err("empty domain should fail");
    assert!(matches!(err, MxError::EmptyDomain));
}

#[test]
fn normalize_domain_lowercases_and_strips_root() {
    assert_eq!(
        resolver::normalize_domain("Example.COM.").unwrap(),
        "example.com"
    );
}

#[test]
fn resolve_with_sorts_and_dedups_records() {
    let stub = StubResolver::new(|domain| {
        assert_eq!(domain, "example.com");
        Ok(MxStatus::Records(vec![
            MailExchanger::new(20, "mx2.example.com"),
            MailExchanger::new(10, "mx1.example.com"),
            MailExchanger::new(10, "mx1.example.com"),
            MailExchanger::new(30, "mx3.example.com"),
        ]))
    });

    let records = resolver::resolve_with(&stub, "example.com").expect("lookup succeeds");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].preference, 10);
    assert_eq!(records[0].exchange, "mx1.example.com");
    assert_eq!(records[2].preference, 30);
}

#[test]
fn no_records_is_no_mail_exchanger() {
    let stub = StubResolver::new(|_| Ok(MxStatus::NoRecords));
    let err = resolver::resolve_with(&stub, "example.com").unwrap_err();
    assert!(matches!(err, MxError::NoMailExchanger { ref domain } if domain == "example.com"));
    assert!(err.is_domain_failure());
}

#[test]
fn null_mx_is_no_mail_exchanger() {
    // "0 ." normalises to an empty exchange
    let stub = StubResolver::with_records(vec![MailExchanger::new(0, "")]);
    let err = resolver::resolve_with(&stub, "example.com").unwrap_err();
    assert!(matches!(err, MxError::NoMailExchanger { .. }));
}

#[test]
fn nxdomain_is_domain_not_found() {
    let stub = StubResolver::new(|_| Ok(MxStatus::NxDomain));
    let err = resolver::resolve_with(&stub, "nope.example").unwrap_err();
    assert!(matches!(err, MxError::DomainNotFound { .. }));
}

#[test]
fn resolver_failure_is_lookup_error() {
    let stub = StubResolver::new(|_| Err(ResolveError::from("servfail")));
    let err = resolver::resolve_with(&stub, "example.com").unwrap_err();
    assert!(matches!(err, MxError::Lookup { .. }));
    assert!(!err.is_domain_failure());
}

#[test]
fn normalize_exchange_trims_dot_and_lowercases() {
    let out = resolver::normalize_exchange("Mail.EXAMPLE.com.".to_string());
    assert_eq!(out, "mail.example.com");
}

#[test]
fn cache_resolves_each_domain_once() {
    let stub = StubResolver::with_records(vec![MailExchanger::new(5, "mx.example.com")]);
    let mut cache = MxCache::new();

    let first = cache.get_or_resolve(&stub, "example.com").unwrap();
    let second = cache.get_or_resolve(&stub, "example.com").unwrap();

    assert_eq!(stub.calls.get(), 1);
    assert_eq!(cache.lookups(), 1);
    assert_eq!(first, second);
    assert!(cache.get("other.example").is_none());
}

#[test]
fn cache_does_not_store_failures() {
    let stub = StubResolver::new(|_| Ok(MxStatus::NoRecords));
    let mut cache = MxCache::new();
    assert!(cache.get_or_resolve(&stub, "example.com").is_err());
    assert!(cache.get("example.com").is_none());
}
