//! DNS MX resolution.
//!
//! The public entry point is [`resolve_exchangers`], which performs a
//! synchronous lookup using the system resolver. Runs that touch a domain
//! several times go through [`MxCache`] so each domain is queried once.

mod cache;
mod error;
mod resolver;
mod types;

pub use cache::MxCache;
pub use error::MxError;
pub use resolver::resolve_exchangers;
pub use types::{MailExchanger, MxStatus};

pub(crate) use resolver::{LookupMx, system_resolver};

#[cfg(test)]
pub(crate) mod tests;
