use proptest::prelude::*;

use super::*;

fn addresses(candidates: &[Candidate]) -> Vec<&str> {
    candidates.iter().map(Candidate::address).collect()
}

#[test]
fn light_john_doe() {
    let candidates = generate("John", "Doe", "example.com", Density::Light).unwrap();
    let joined = addresses(&candidates).join(" ");
    insta::assert_snapshot!(joined, @"john.doe@example.com jdoe@example.com john@example.com");
    assert!(candidates.iter().all(|c| !c.pattern().is_numbered()));
}

#[test]
fn medium_adds_separators_and_initials() {
    let candidates = generate("John", "Doe", "example.com", Density::Medium).unwrap();
    let addrs = addresses(&candidates);
    for expected in [
        "johndoe@example.com",
        "j.doe@example.com",
        "j_doe@example.com",
        "john_doe@example.com",
        "john-doe@example.com",
        "jd@example.com",
        "doe@example.com",
    ] {
        assert!(addrs.contains(&expected), "missing {expected}");
    }
    assert!(!addrs.contains(&"doe.john@example.com"));
}

#[test]
fn heavy_adds_reversed_and_numbered() {
    let candidates = generate("John", "Doe", "example.com", Density::Heavy).unwrap();
    let addrs = addresses(&candidates);
    assert!(addrs.contains(&"doe.john@example.com"));
    assert!(addrs.contains(&"doejohn@example.com"));
    assert!(addrs.contains(&"john.doe1@example.com"));
    assert!(addrs.contains(&"jdoe3@example.com"));
    // "j" + "doe" collides with flast and is kept once, under flast.
    let jdoe: Vec<_> = candidates
        .iter()
        .filter(|c| c.address() == "jdoe@example.com")
        .collect();
    assert_eq!(jdoe.len(), 1);
    assert_eq!(jdoe[0].pattern(), Pattern::FLast);
}

#[test]
fn duplicates_removed_case_insensitively() {
    // first == last makes first.last and last.first identical
    let candidates = generate("Ana", "ana", "Example.com", Density::Heavy).unwrap();
    let mut lowered: Vec<String> = candidates
        .iter()
        .map(|c| c.address().to_ascii_lowercase())
        .collect();
    let before = lowered.len();
    lowered.sort();
    lowered.dedup();
    assert_eq!(before, lowered.len());
    assert!(candidates.iter().all(|c| c.domain() == "example.com"));
}

#[test]
fn single_letter_names_work() {
    let candidates = generate("J", "D", "example.com", Density::Heavy).unwrap();
    let addrs = addresses(&candidates);
    assert_eq!(addrs[0], "j.d@example.com");
    assert!(addrs.contains(&"jd@example.com"));
}

#[test]
fn empty_names_are_invalid_input() {
    assert!(matches!(
        generate("", "Doe", "example.com", Density::Light),
        Err(PermutationError::EmptyName {
            field: NameField::First
        })
    ));
    assert!(matches!(
        generate("John", "   ", "example.com", Density::Light),
        Err(PermutationError::EmptyName {
            field: NameField::Last
        })
    ));
}

#[test]
fn bad_domain_is_invalid_input() {
    let err = generate("John", "Doe", "not a domain", Density::Light).unwrap_err();
    assert!(matches!(err, PermutationError::InvalidDomain(_)));
}

#[test]
fn density_from_level() {
    assert_eq!(Density::try_from(2).unwrap(), Density::Medium);
    assert_eq!(
        Density::try_from(4).unwrap_err(),
        PermutationError::InvalidDensity(4)
    );
    assert_eq!(Density::Heavy.level(), 3);
}

#[test]
fn overlong_local_parts_are_dropped() {
    let first = "a".repeat(40);
    let last = "b".repeat(40);
    let candidates = generate(&first, &last, "example.com", Density::Medium).unwrap();
    assert!(candidates.iter().all(|c| c.local_part().len() <= 64));
    assert!(candidates.iter().any(|c| c.pattern() == Pattern::First));
    assert!(!candidates.iter().any(|c| c.pattern() == Pattern::FirstDotLast));
}

#[test]
fn addresses_longer_than_a_path_are_dropped() {
    let domain = format!("{}.com", vec!["x".repeat(60); 4].join("."));
    assert_eq!(domain.len(), 247);
    let candidates = generate("aaaaa", "bbbbb", &domain, Density::Light).unwrap();
    assert!(candidates.iter().all(|c| c.address().len() <= 254));
    assert_eq!(
        candidates.iter().map(|c| c.pattern()).collect::<Vec<_>>(),
        [Pattern::FLast, Pattern::First]
    );
    for candidate in &candidates {
        assert!(crate::address::parse_address(candidate.address()).is_ok());
    }
}

#[test]
fn supplied_candidates_keep_their_address() {
    let parsed = crate::address::parse_address("Jane@Example.org").unwrap();
    let candidate = Candidate::supplied(parsed);
    assert_eq!(candidate.address(), "Jane@example.org");
    assert_eq!(candidate.pattern(), Pattern::Supplied);
    assert_eq!(candidate.pattern().to_string(), "supplied");
}

fn density_strategy() -> impl Strategy<Value = Density> {
    prop_oneof![
        Just(Density::Light),
        Just(Density::Medium),
        Just(Density::Heavy)
    ]
}

proptest! {
    #[test]
    fn generation_is_deterministic(
        first in "[A-Za-z]{1,12}",
        last in "[A-Za-z]{1,12}",
        density in density_strategy(),
    ) {
        let a = generate(&first, &last, "example.com", density).unwrap();
        let b = generate(&first, &last, "example.com", density).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn higher_density_extends_lower(
        first in "[A-Za-z]{1,12}",
        last in "[A-Za-z]{1,12}",
    ) {
        let light = generate(&first, &last, "example.com", Density::Light).unwrap();
        let medium = generate(&first, &last, "example.com", Density::Medium).unwrap();
        let heavy = generate(&first, &last, "example.com", Density::Heavy).unwrap();
        prop_assert!(medium.starts_with(&light));
        prop_assert!(heavy.starts_with(&medium));
    }

    #[test]
    fn light_never_has_numeric_suffixes(
        first in "[A-Za-z]{1,12}",
        last in "[A-Za-z]{1,12}",
    ) {
        let light = generate(&first, &last, "example.com", Density::Light).unwrap();
        prop_assert!(light.iter().all(|c| !c.pattern().is_numbered()));
        prop_assert!(!light.is_empty());
    }
}
