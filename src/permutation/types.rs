use std::fmt;

use crate::address::EmailAddress;

use super::error::PermutationError;

/// How many patterns the generator emits.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Density {
    /// `first.last`, `flast`, `first`.
    #[default]
    Light = 1,
    /// Adds separators and initials combinations.
    Medium = 2,
    /// Adds reversed orderings, truncations and numeric suffixes.
    Heavy = 3,
}

impl Density {
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Density {
    type Error = PermutationError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Self::Light),
            2 => Ok(Self::Medium),
            3 => Ok(Self::Heavy),
            other => Err(PermutationError::InvalidDensity(other)),
        }
    }
}

/// Name pattern a local part was derived from.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    FirstDotLast,
    FLast,
    First,
    FirstLast,
    FDotLast,
    FUnderscoreLast,
    FirstUnderscoreLast,
    FirstDashLast,
    FirstL,
    FirstDotL,
    Initials,
    Last,
    LastDotFirst,
    LastUnderscoreFirst,
    LastFirst,
    LastF,
    LDotFirst,
    FLastTruncated,
    FirstTruncatedL,
    FirstDotLastNumbered(u8),
    FLastNumbered(u8),
    FirstLastNumbered(u8),
    /// Address handed in by the caller rather than generated.
    Supplied,
}

/// Name parts after sanitisation; ASCII atext only, never empty.
pub(crate) struct Names<'a> {
    pub first: &'a str,
    pub last: &'a str,
}

fn initial(s: &str) -> &str {
    &s[..1]
}

fn truncated(s: &str, len: usize) -> &str {
    &s[..s.len().min(len)]
}

impl Pattern {
    pub(crate) fn render(self, names: &Names<'_>) -> Option<String> {
        let (first, last) = (names.first, names.last);
        let (f, l) = (initial(first), initial(last));
        let local = match self {
            Self::FirstDotLast => format!("{first}.{last}"),
            Self::FLast => format!("{f}{last}"),
            Self::First => first.to_string(),
            Self::FirstLast => format!("{first}{last}"),
            Self::FDotLast => format!("{f}.{last}"),
            Self::FUnderscoreLast => format!("{f}_{last}"),
            Self::FirstUnderscoreLast => format!("{first}_{last}"),
            Self::FirstDashLast => format!("{first}-{last}"),
            Self::FirstL => format!("{first}{l}"),
            Self::FirstDotL => format!("{first}.{l}"),
            Self::Initials => format!("{f}{l}"),
            Self::Last => last.to_string(),
            Self::LastDotFirst => format!("{last}.{first}"),
            Self::LastUnderscoreFirst => format!("{last}_{first}"),
            Self::LastFirst => format!("{last}{first}"),
            Self::LastF => format!("{last}{f}"),
            Self::LDotFirst => format!("{l}.{first}"),
            Self::FLastTruncated => format!("{f}{}", truncated(last, 3)),
            Self::FirstTruncatedL => format!("{}{l}", truncated(first, 3)),
            Self::FirstDotLastNumbered(n) => format!("{first}.{last}{n}"),
            Self::FLastNumbered(n) => format!("{f}{last}{n}"),
            Self::FirstLastNumbered(n) => format!("{first}{last}{n}"),
            Self::Supplied => return None,
        };
        Some(local)
    }

    pub fn label(self) -> String {
        match self {
            Self::FirstDotLast => "first.last".into(),
            Self::FLast => "flast".into(),
            Self::First => "first".into(),
            Self::FirstLast => "firstlast".into(),
            Self::FDotLast => "f.last".into(),
            Self::FUnderscoreLast => "f_last".into(),
            Self::FirstUnderscoreLast => "first_last".into(),
            Self::FirstDashLast => "first-last".into(),
            Self::FirstL => "firstl".into(),
            Self::FirstDotL => "first.l".into(),
            Self::Initials => "fl".into(),
            Self::Last => "last".into(),
            Self::LastDotFirst => "last.first".into(),
            Self::LastUnderscoreFirst => "last_first".into(),
            Self::LastFirst => "lastfirst".into(),
            Self::LastF => "lastf".into(),
            Self::LDotFirst => "l.first".into(),
            Self::FLastTruncated => "flas".into(),
            Self::FirstTruncatedL => "firl".into(),
            Self::FirstDotLastNumbered(n) => format!("first.last{n}"),
            Self::FLastNumbered(n) => format!("flast{n}"),
            Self::FirstLastNumbered(n) => format!("firstlast{n}"),
            Self::Supplied => "supplied".into(),
        }
    }

    pub fn is_numbered(self) -> bool {
        matches!(
            self,
            Self::FirstDotLastNumbered(_) | Self::FLastNumbered(_) | Self::FirstLastNumbered(_)
        )
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A generated (or supplied) address. Fields are read-only once built.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    address: String,
    local_part: String,
    domain: String,
    pattern: Pattern,
}

impl Candidate {
    pub(crate) fn generated(local_part: String, domain: &str, pattern: Pattern) -> Self {
        Self {
            address: format!("{local_part}@{domain}"),
            local_part,
            domain: domain.to_string(),
            pattern,
        }
    }

    /// Wrap an address obtained elsewhere (scraping, operator input).
    pub fn supplied(address: EmailAddress) -> Self {
        Self {
            address: address.to_string(),
            local_part: address.local,
            domain: address.domain,
            pattern: Pattern::Supplied,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn local_part(&self) -> &str {
        &self.local_part
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}
