/// RFC 5322 `atext` specials, alphanumerics aside.
const ATEXT_SPECIALS: &str = "!#$%&'*+-/=?^_`{|}~";

/// One `atext` character of a local part. `.` is a separator, not atext.
pub(crate) fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || ATEXT_SPECIALS.contains(c)
}

/// RFC 5322 dot-atom: atext runs joined by single dots.
pub(crate) fn is_dot_atom(s: &str) -> bool {
    !s.is_empty()
        && s
            .split('.')
            .all(|atom| !atom.is_empty() && atom.chars().all(is_atext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_atoms() {
        for bad in [".jane", "jane.", "jane..doe", ""] {
            assert!(!is_dot_atom(bad), "{bad:?}");
        }
        assert!(is_dot_atom("jane.doe"));
        assert!(is_dot_atom("o'brien-smith"));
        assert!(is_dot_atom("j_doe+sales"));
    }

    #[test]
    fn atext_excludes_separators() {
        assert!(is_atext('_'));
        assert!(is_atext('~'));
        for c in ['.', ' ', 'é', '@', '"'] {
            assert!(!is_atext(c), "{c:?}");
        }
    }
}
