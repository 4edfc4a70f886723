//! Candidate address generation from a person's name.
//!
//! [`generate`] is deterministic: identical inputs always yield the same
//! ordered list, which is what makes [`Partition`](crate::Partition) slices
//! reproducible across independent runs. Each density level emits the
//! patterns of the lower levels first, so higher levels are supersets.

mod error;
mod sanitize;
mod types;

pub use error::{NameField, PermutationError};
pub use types::{Candidate, Density, Pattern};

use std::collections::HashSet;

use tracing::debug;

use crate::address::{MAX_ADDRESS_LEN, MAX_LOCAL_LEN, is_dot_atom, normalize_domain};

use sanitize::sanitize_name;
use types::Names;

const LIGHT: &[Pattern] = &[Pattern::FirstDotLast, Pattern::FLast, Pattern::First];

const MEDIUM: &[Pattern] = &[
    Pattern::FirstLast,
    Pattern::FDotLast,
    Pattern::FUnderscoreLast,
    Pattern::FirstUnderscoreLast,
    Pattern::FirstDashLast,
    Pattern::FirstL,
    Pattern::FirstDotL,
    Pattern::Initials,
    Pattern::Last,
];

const HEAVY: &[Pattern] = &[
    Pattern::LastDotFirst,
    Pattern::LastUnderscoreFirst,
    Pattern::LastFirst,
    Pattern::LastF,
    Pattern::LDotFirst,
    Pattern::FLastTruncated,
    Pattern::FirstTruncatedL,
];

const NUMERIC_SUFFIXES: std::ops::RangeInclusive<u8> = 1..=3;

/// Patterns emitted at `density`, in emission order.
pub fn patterns(density: Density) -> Vec<Pattern> {
    let mut out = LIGHT.to_vec();
    if density >= Density::Medium {
        out.extend_from_slice(MEDIUM);
    }
    if density >= Density::Heavy {
        out.extend_from_slice(HEAVY);
        for n in NUMERIC_SUFFIXES {
            out.push(Pattern::FirstDotLastNumbered(n));
            out.push(Pattern::FLastNumbered(n));
            out.push(Pattern::FirstLastNumbered(n));
        }
    }
    out
}

/// Generate unique candidate addresses for `first last` at `domain`.
///
/// Duplicates are removed case-insensitively, keeping the first pattern
/// that produced the address. Fails before any network activity when a
/// name sanitises to nothing or keeps characters a local part cannot hold,
/// or when `domain` is not a valid host name.
pub fn generate(
    first: &str,
    last: &str,
    domain: &str,
    density: Density,
) -> Result<Vec<Candidate>, PermutationError> {
    let first = sanitize_name(first, NameField::First)?;
    let last = sanitize_name(last, NameField::Last)?;
    let domain = normalize_domain(domain).map_err(PermutationError::InvalidDomain)?;

    let names = Names {
        first: &first,
        last: &last,
    };

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for pattern in patterns(density) {
        let Some(local) = pattern.render(&names) else {
            continue;
        };
        if local.len() > MAX_LOCAL_LEN || !is_dot_atom(&local) {
            debug!(%pattern, local = %local, "dropping unusable local part");
            continue;
        }
        if local.len() + 1 + domain.len() > MAX_ADDRESS_LEN {
            debug!(%pattern, local = %local, "dropping overlong address");
            continue;
        }
        if seen.insert(local.to_ascii_lowercase()) {
            candidates.push(Candidate::generated(local, &domain, pattern));
        }
    }

    debug!(
        domain = %domain,
        density = density.level(),
        count = candidates.len(),
        "generated permutations"
    );
    Ok(candidates)
}

#[cfg(test)]
mod tests;
