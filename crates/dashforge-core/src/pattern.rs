//! Wildcard patterns over canonical metric codes.
//!
//! A pattern is matched against the whole `domain.Name` string. `*` matches
//! any run of characters (including none); everything else matches itself,
//! case-sensitively.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A glob-like pattern such as `market.Price*` or `*.Mvrv*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Pattern {
    source: String,
}

impl Pattern {
    /// Create a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for an empty or whitespace-bearing
    /// pattern.
    pub fn new(source: &str) -> Result<Self> {
        if source.is_empty() {
            return Err(Error::InvalidPattern {
                pattern: source.to_string(),
                reason: "pattern is empty".to_string(),
            });
        }
        if source.chars().any(char::is_whitespace) {
            return Err(Error::InvalidPattern {
                pattern: source.to_string(),
                reason: "pattern contains whitespace".to_string(),
            });
        }
        Ok(Self {
            source: source.to_string(),
        })
    }

    /// Pattern text as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True when the pattern has no wildcard and so matches one code only.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        !self.source.contains('*')
    }

    /// Test `text` against this pattern.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        if self.is_literal() {
            return self.source == text;
        }
        wildcard_match(self.source.as_bytes(), text.as_bytes())
    }
}

/// Greedy `*` matcher with single-point backtracking.
fn wildcard_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut star: Option<usize> = None;
    let mut resume = 0;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            star = Some(p);
            p += 1;
            resume = t;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some(s) = star {
            p = s + 1;
            resume += 1;
            t = resume;
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&b| b == b'*')
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl TryFrom<String> for Pattern {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(&s)
    }
}

impl From<Pattern> for String {
    fn from(p: Pattern) -> Self {
        p.source
    }
}
