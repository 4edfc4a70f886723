use phf::phf_map;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use unicode_script::{Script, UnicodeScript};

use crate::address::is_atext;

use super::error::{NameField, PermutationError};

// Lettres que NFKD ne décompose pas.
const TRANSLITERATION_MAP: phf::Map<char, &'static str> = phf_map! {
    'ß' => "ss", 'ẞ' => "ss",
    'æ' => "ae", 'Æ' => "ae",
    'œ' => "oe", 'Œ' => "oe",
    'ø' => "o", 'Ø' => "o",
    'ł' => "l", 'Ł' => "l",
    'đ' => "d", 'Đ' => "d",
    'ð' => "d", 'Ð' => "d",
    'þ' => "th", 'Þ' => "th",
    'ı' => "i",
};

/// Characters dropped from names rather than rejected.
fn is_dropped(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\'' | '’' | '‘' | '`' | '.')
}

/// Reduce a person name to a lower-case ASCII atext token.
pub(crate) fn sanitize_name(raw: &str, field: NameField) -> Result<String, PermutationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PermutationError::EmptyName { field });
    }

    let mut folded = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        if is_dropped(c) {
            continue;
        }
        if let Some(replacement) = TRANSLITERATION_MAP.get(&c) {
            folded.push_str(replacement);
        } else {
            folded.extend(c.to_lowercase());
        }
    }

    let sanitized: String = folded.nfkd().filter(|c| !is_combining_mark(*c)).collect();

    if sanitized.is_empty() {
        return Err(PermutationError::EmptyName { field });
    }

    if let Some(bad) = sanitized.chars().find(|c| !is_atext(*c)) {
        return Err(PermutationError::IllegalCharacters {
            field,
            value: raw.to_string(),
            reason: describe_illegal(bad),
        });
    }

    Ok(sanitized)
}

fn describe_illegal(c: char) -> String {
    match c.script() {
        Script::Common | Script::Inherited | Script::Latin | Script::Unknown => {
            format!("character {c:?} is not allowed in a local part")
        }
        script => format!(
            "{} character {c:?} has no ASCII transliteration",
            script.full_name()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_diacritics_and_case() {
        assert_eq!(sanitize_name(" José ", NameField::First).unwrap(), "jose");
        assert_eq!(sanitize_name("Müller", NameField::Last).unwrap(), "muller");
        assert_eq!(sanitize_name("Straße", NameField::Last).unwrap(), "strasse");
        assert_eq!(sanitize_name("Łukasz", NameField::First).unwrap(), "lukasz");
        assert_eq!(sanitize_name("Ærøe", NameField::Last).unwrap(), "aeroe");
    }

    #[test]
    fn drops_spaces_apostrophes_and_dots() {
        assert_eq!(sanitize_name("O'Brien", NameField::Last).unwrap(), "obrien");
        assert_eq!(sanitize_name("Mary Ann", NameField::First).unwrap(), "maryann");
        assert_eq!(sanitize_name("J.R.", NameField::First).unwrap(), "jr");
    }

    #[test]
    fn keeps_hyphenated_names() {
        assert_eq!(
            sanitize_name("Jean-Pierre", NameField::First).unwrap(),
            "jean-pierre"
        );
    }

    #[test]
    fn empty_after_sanitisation_is_rejected() {
        let err = sanitize_name("  ", NameField::First).unwrap_err();
        assert_eq!(
            err,
            PermutationError::EmptyName {
                field: NameField::First
            }
        );
        let err = sanitize_name("'.'", NameField::Last).unwrap_err();
        assert!(matches!(err, PermutationError::EmptyName { .. }));
    }

    #[test]
    fn non_latin_scripts_are_named() {
        let err = sanitize_name("Иван", NameField::First).unwrap_err();
        match err {
            PermutationError::IllegalCharacters { reason, .. } => {
                assert!(reason.contains("Cyrillic"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn punctuation_is_rejected() {
        let err = sanitize_name("doe@corp", NameField::Last).unwrap_err();
        assert!(matches!(err, PermutationError::IllegalCharacters { .. }));
    }
}
