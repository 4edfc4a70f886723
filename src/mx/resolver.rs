use trust_dns_resolver::{
    Resolver,
    error::{ResolveError, ResolveErrorKind},
    proto::op::ResponseCode,
};

use super::{MailExchanger, MxError, MxStatus};

/// Resolve the mail exchangers of `domain` with the system resolver.
///
/// The domain is normalized via IDNA before querying DNS. Records come back
/// sorted by ascending preference; a null MX (`0 .`) counts as no record.
pub fn resolve_exchangers(domain: &str) -> Result<Vec<MailExchanger>, MxError> {
    let ascii = normalize_domain(domain)?;
    let resolver = system_resolver()?;
    resolve_with(&resolver, &ascii)
}

pub(crate) fn system_resolver() -> Result<Resolver, MxError> {
    Resolver::from_system_conf().map_err(MxError::resolver_init)
}

pub(crate) fn resolve_with<R>(resolver: &R, ascii_domain: &str) -> Result<Vec<MailExchanger>, MxError>
where
    R: LookupMx + ?Sized,
{
    let status = resolver
        .lookup_mx(ascii_domain)
        .map_err(|err| MxError::lookup(ascii_domain, err))?;

    let mut records = match status {
        MxStatus::NxDomain => {
            return Err(MxError::DomainNotFound {
                domain: ascii_domain.to_string(),
            });
        }
        MxStatus::NoRecords => Vec::new(),
        MxStatus::Records(records) => records,
    };

    records.retain(|record| !record.exchange.is_empty());
    records.sort();
    records.dedup();

    if records.is_empty() {
        Err(MxError::NoMailExchanger {
            domain: ascii_domain.to_string(),
        })
    } else {
        Ok(records)
    }
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, MxError> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(MxError::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed)
        .map(|ascii| ascii.to_ascii_lowercase())
        .map_err(MxError::idna)
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

/// DNS seam: the system resolver in production, stubs in tests.
pub(crate) trait LookupMx {
    fn lookup_mx(&self, domain: &str) -> Result<MxStatus, ResolveError>;
}

impl LookupMx for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<MxStatus, ResolveError> {
        let lookup = match Resolver::mx_lookup(self, domain) {
            Ok(lookup) => lookup,
            Err(err) => {
                return match err.kind() {
                    ResolveErrorKind::NoRecordsFound { response_code, .. }
                        if *response_code == ResponseCode::NXDomain =>
                    {
                        Ok(MxStatus::NxDomain)
                    }
                    ResolveErrorKind::NoRecordsFound { .. } => Ok(MxStatus::NoRecords),
                    _ => Err(err),
                };
            }
        };
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MailExchanger::new(mx.preference(), exchange));
        }
        Ok(MxStatus::Records(records))
    }
}
