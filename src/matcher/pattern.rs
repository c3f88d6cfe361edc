//! Pattern matching implementation.

use std::str::FromStr;

use crate::config::SearchConfig;
use crate::crypto::DerivedAddress;

/// Fixed marker in front of every address body.
const ADDRESS_MARKER: &str = "0x";

/// Where in the address body the pattern has to appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// Match at the beginning of the address
    #[default]
    Prefix,
    /// Match at the end of the address
    Suffix,
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prefix" => Ok(Position::Prefix),
            "suffix" => Ok(Position::Suffix),
            _ => Err(format!("Unknown position: {} (expected prefix or suffix)", s)),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Prefix => write!(f, "prefix"),
            Position::Suffix => write!(f, "suffix"),
        }
    }
}

/// Decides whether `address` carries `pattern` at `position`.
///
/// The `0x` marker is stripped first. A pattern longer than the remaining
/// body never matches, and an empty pattern always does.
pub fn matches(address: &str, pattern: &str, position: Position, case_sensitive: bool) -> bool {
    let body = address.strip_prefix(ADDRESS_MARKER).unwrap_or(address);
    let body = body.as_bytes();
    let pattern = pattern.as_bytes();

    if pattern.len() > body.len() {
        return false;
    }

    let window = match position {
        Position::Prefix => &body[..pattern.len()],
        Position::Suffix => &body[body.len() - pattern.len()..],
    };

    if case_sensitive {
        window == pattern
    } else {
        window.eq_ignore_ascii_case(pattern)
    }
}

/// A pattern compiled from a [`SearchConfig`], owned by each worker.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// The pattern string, in the case the user supplied
    pattern: String,
    position: Position,
    case_sensitive: bool,
}

impl Pattern {
    /// Creates a new pattern.
    pub fn new(pattern: impl Into<String>, position: Position, case_sensitive: bool) -> Self {
        Self {
            pattern: pattern.into(),
            position,
            case_sensitive,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.pattern(), config.position(), config.case_sensitive())
    }

    /// Returns the pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Matches a derived address against this pattern.
    #[inline]
    pub fn matches(&self, address: &DerivedAddress) -> bool {
        matches(
            address.as_str(),
            &self.pattern,
            self.position,
            self.case_sensitive,
        )
    }

    /// Returns the estimated difficulty (number of attempts to find a match).
    ///
    /// Each hex character has 16 possible values. In case-sensitive mode every
    /// letter also has to land on the right checksum case, which halves the odds.
    pub fn estimated_difficulty(&self) -> u64 {
        let len = self.pattern.len() as u32;
        let base = 16u64.saturating_pow(len);
        if !self.case_sensitive {
            return base;
        }

        let letters = self
            .pattern
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .count() as u32;
        base.saturating_mul(2u64.saturating_pow(letters))
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        let diff = self.estimated_difficulty();
        match diff {
            0..=1_000 => "Very Easy (< 1 second)".into(),
            1_001..=100_000 => "Easy (seconds)".into(),
            100_001..=10_000_000 => "Medium (minutes)".into(),
            10_000_001..=1_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }
}
