//! PICS Token Validation
//!
//! PICS tokens are short capability identifiers such as `OO.S.A0000` or
//! `DGGEN.S.C00.Rsp`. A token block in the mapping file holds raw strings that
//! may combine several tokens with `|` or `,`; each sub-token is checked on its
//! own.
//!
//! # Rules
//!
//! 1. No forbidden characters: `, & ( ) { } - ]` (underscore is fine)
//! 2. No global cluster attribute names (`AttributeList`, `FeatureMap`, ...)
//! 3. No numeric code followed by letters: `A####x`, `F##x`, `C##x`
//! 4. Server/client command tokens (`.S.C`, `.C.C`) must not extend the
//!    `.Rsp` / `.Txt` suffix

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Characters that never appear in a well-formed PICS token
pub const FORBIDDEN_CHARS: &[char] = &[',', '&', '(', ')', '{', '}', '-', ']'];

/// Global attribute names that must not be used as PICS tokens
pub const DENIED_ATTRIBUTES: &[&str] = &[
    "CurrentSessions",
    "AttributeList",
    "EventList",
    "CommandList",
    "FeatureMap",
    "ClusterRevision",
];

/// Attribute, feature and command codes with trailing letters
static MALFORMED_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    // Static pattern, covered by tests
    #[allow(clippy::unwrap_used)]
    Regex::new(r"A\d{4}[A-Za-z]+|F\d{2}[A-Za-z]+|C\d{2}[A-Za-z]+").unwrap()
});

/// `.Rsp` / `.Txt` followed by another alphanumeric character
static OVERLONG_SUFFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\.(?:Rsp|Txt)[A-Za-z0-9]").unwrap()
});

/// Validation rule that rejected a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PicsRule {
    /// Token contains a forbidden character
    ForbiddenCharacter,
    /// Token names a global cluster attribute
    DeniedAttribute,
    /// Attribute/feature/command code followed by letters
    MalformedCode,
    /// `.Rsp` / `.Txt` suffix followed by extra characters
    OverlongSuffix,
}

impl std::fmt::Display for PicsRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ForbiddenCharacter => write!(f, "forbidden character"),
            Self::DeniedAttribute => write!(f, "denied attribute name"),
            Self::MalformedCode => write!(f, "malformed code"),
            Self::OverlongSuffix => write!(f, "over-long response suffix"),
        }
    }
}

/// A single rule violation with the offending fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PicsViolation {
    /// Rule that matched
    pub rule: PicsRule,
    /// Offending fragment of the token
    pub detail: String,
}

impl std::fmt::Display for PicsViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.rule, self.detail)
    }
}

fn forbidden_character(token: &str) -> Option<PicsViolation> {
    token
        .chars()
        .find(|c| FORBIDDEN_CHARS.contains(c))
        .map(|c| PicsViolation {
            rule: PicsRule::ForbiddenCharacter,
            detail: c.to_string(),
        })
}

fn denied_attribute(token: &str) -> Option<PicsViolation> {
    DENIED_ATTRIBUTES
        .iter()
        .find(|name| token.contains(*name))
        .map(|name| PicsViolation {
            rule: PicsRule::DeniedAttribute,
            detail: (*name).to_string(),
        })
}

fn malformed_code(token: &str) -> Option<PicsViolation> {
    MALFORMED_CODE_REGEX.find(token).map(|m| PicsViolation {
        rule: PicsRule::MalformedCode,
        detail: m.as_str().to_string(),
    })
}

fn overlong_suffix(token: &str) -> Option<PicsViolation> {
    if !(token.contains(".S.C") || token.contains(".C.C")) {
        return None;
    }
    OVERLONG_SUFFIX_REGEX.find(token).map(|m| PicsViolation {
        rule: PicsRule::OverlongSuffix,
        detail: m.as_str().to_string(),
    })
}

const RULES: [fn(&str) -> Option<PicsViolation>; 4] = [
    forbidden_character,
    denied_attribute,
    malformed_code,
    overlong_suffix,
];

/// Check a single sub-token, reporting the first rule that matches
///
/// # Errors
///
/// Returns the first [`PicsViolation`] in rule order.
pub fn check_token(token: &str) -> std::result::Result<(), PicsViolation> {
    match RULES.iter().find_map(|rule| rule(token)) {
        Some(violation) => Err(violation),
        None => Ok(()),
    }
}

/// Every rule a sub-token violates, in rule order
#[must_use]
pub fn violations(token: &str) -> Vec<PicsViolation> {
    RULES.iter().filter_map(|rule| rule(token)).collect()
}

/// Split a raw token-block string into trimmed, non-empty sub-tokens
#[must_use]
pub fn split_token_block(raw: &str) -> Vec<&str> {
    raw.split(['|', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
