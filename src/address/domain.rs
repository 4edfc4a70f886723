const MAX_LABEL_LEN: usize = 63;

/// Lower-case ASCII form of `domain`, with a reason pushed for every rule
/// the name breaks. `None` only when IDNA conversion itself fails.
pub(crate) fn check_domain(domain: &str, reasons: &mut Vec<String>) -> Option<String> {
    let Ok(ascii) = idna::domain_to_ascii(domain.trim()) else {
        reasons.push("domain is not valid IDNA".to_string());
        return None;
    };
    let ascii = ascii.to_ascii_lowercase();
    if ascii.is_empty() {
        reasons.push("domain is empty".to_string());
        return None;
    }
    if !ascii.contains('.') {
        reasons.push("domain needs at least one dot".to_string());
    }
    reasons.extend(ascii.split('.').filter_map(label_problem));
    Some(ascii)
}

fn label_problem(label: &str) -> Option<String> {
    if label.is_empty() {
        Some("domain has an empty label".to_string())
    } else if label.len() > MAX_LABEL_LEN {
        Some(format!("label '{label}' exceeds {MAX_LABEL_LEN} characters"))
    } else if label.starts_with('-') || label.ends_with('-') {
        Some(format!("label '{label}' starts or ends with '-'"))
    } else if !label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        Some(format!("label '{label}' has characters outside [a-z0-9-]"))
    } else {
        None
    }
}
