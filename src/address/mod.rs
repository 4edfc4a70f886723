//! Address syntax checks shared by the generator, the orchestrator and the CLI.

mod domain;
mod local;
mod types;

pub use types::{AddressError, EmailAddress};

pub(crate) use local::{is_atext, is_dot_atom};

/// Longueur maximale d'une partie locale (RFC 5321).
pub const MAX_LOCAL_LEN: usize = 64;
/// Longueur maximale d'une adresse complète (RFC 5321, chemin).
pub const MAX_ADDRESS_LEN: usize = 254;

/// Parse `input` as `local@domain`, converting the domain to ASCII.
pub fn parse_address(input: &str) -> Result<EmailAddress, AddressError> {
    let trimmed = input.trim();
    let mut reasons = Vec::new();

    if trimmed.len() > MAX_ADDRESS_LEN {
        reasons.push(format!("total length {} > {MAX_ADDRESS_LEN}", trimmed.len()));
    }

    let parts: Vec<&str> = trimmed.split('@').collect();
    if parts.len() != 2 {
        reasons.push("must contain exactly one '@'".to_string());
        return Err(AddressError::Invalid {
            input: input.to_string(),
            reasons,
        });
    }
    let (local, domain) = (parts[0], parts[1]);

    if local.is_empty() || local.len() > MAX_LOCAL_LEN {
        reasons.push(format!(
            "local part length {} invalid (1..={MAX_LOCAL_LEN})",
            local.len()
        ));
    } else if !is_dot_atom(local) {
        reasons.push("invalid local part".to_string());
    }

    let ascii_domain = domain::check_domain(domain, &mut reasons);

    match ascii_domain {
        Some(ascii) if reasons.is_empty() => Ok(EmailAddress::new(local, ascii)),
        _ => Err(AddressError::Invalid {
            input: input.to_string(),
            reasons,
        }),
    }
}

/// Validate and normalise a bare domain name.
pub fn normalize_domain(input: &str) -> Result<String, AddressError> {
    let mut reasons = Vec::new();
    match domain::check_domain(input, &mut reasons) {
        Some(ascii) if reasons.is_empty() => Ok(ascii),
        _ => Err(AddressError::InvalidDomain {
            input: input.to_string(),
            reasons,
        }),
    }
}

/// Domain part of `sender` (`mailbox@host` → `host`), used for `EHLO`.
pub fn sender_domain(sender: &str) -> Option<&str> {
    sender
        .rsplit_once('@')
        .map(|(_, domain)| domain.trim())
        .filter(|domain| !domain.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_basic() {
        let addr = parse_address("  Alice@Example.com ").unwrap();
        assert_eq!(addr.local, "Alice");
        assert_eq!(addr.domain, "example.com");
        assert_eq!(addr.to_string(), "Alice@example.com");
    }

    #[test]
    fn rejects_double_at() {
        let err = parse_address("a@@b.com").unwrap_err();
        assert!(err.reasons().iter().any(|r| r.contains("exactly one '@'")));
    }

    #[test]
    fn rejects_bad_local_part() {
        assert!(parse_address(".alice@example.com").is_err());
        assert!(parse_address("al ice@example.com").is_err());
        let long = "a".repeat(65);
        assert!(parse_address(&format!("{long}@example.com")).is_err());
    }

    #[test]
    fn normalize_domain_rejects_garbage() {
        assert_eq!(normalize_domain("Example.org").unwrap(), "example.org");
        assert!(matches!(
            normalize_domain("exa mple.org"),
            Err(AddressError::InvalidDomain { .. })
        ));
        assert!(normalize_domain("").is_err());
    }

    #[test]
    fn sender_domain_extracts_host() {
        assert_eq!(sender_domain("ops@probe.example"), Some("probe.example"));
        assert_eq!(sender_domain("nobody"), None);
        assert_eq!(sender_domain("nobody@"), None);
    }
}
