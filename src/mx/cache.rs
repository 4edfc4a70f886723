use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::resolver::{LookupMx, resolve_with};
use super::{MailExchanger, MxError};

/// Per-run memo of successful MX resolutions.
///
/// Entries are shared read-only slices; once a domain is cached it is never
/// queried or modified again. Failures are not cached: the orchestrator stops
/// working on a domain as soon as its resolution fails.
#[derive(Debug, Default)]
pub struct MxCache {
    entries: HashMap<String, Arc<[MailExchanger]>>,
    lookups: usize,
}

impl MxCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ascii_domain: &str) -> Option<Arc<[MailExchanger]>> {
        self.entries.get(ascii_domain).cloned()
    }

    /// Number of DNS queries issued through this cache.
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    pub(crate) fn get_or_resolve<R>(
        &mut self,
        resolver: &R,
        ascii_domain: &str,
    ) -> Result<Arc<[MailExchanger]>, MxError>
    where
        R: LookupMx + ?Sized,
    {
        if let Some(hit) = self.get(ascii_domain) {
            return Ok(hit);
        }
        self.lookups += 1;
        let records: Arc<[MailExchanger]> = resolve_with(resolver, ascii_domain)?.into();
        debug!(
            domain = ascii_domain,
            exchangers = records.len(),
            preferred = %records[0],
            "resolved mail exchangers"
        );
        self.entries
            .insert(ascii_domain.to_string(), Arc::clone(&records));
        Ok(records)
    }
}
