//! Metric code normalization.
//!
//! Two surface syntaxes name the same metric:
//!
//! ```text
//! market.PriceUsdClose        dotted: domain.PascalName
//! /market/price_usd_close     path:   /domain/snake_name
//! ```
//!
//! Both normalize to a single canonical [`MetricCode`] whose string form
//! (`domain.Name`) is the lookup key used by every default layer.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical metric identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MetricCode {
    domain: String,
    name: String,
}

impl MetricCode {
    /// Normalize a raw metric identifier.
    ///
    /// Accepts `domain.PascalName` and `/domain/snake_name`. Parsing an
    /// already-canonical code returns the same code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMetricCode`] when there is no domain/name
    /// split, the domain has uppercase or foreign characters, or the name
    /// is empty or contains separators.
    pub fn parse(raw: &str) -> Result<Self> {
        let input = raw.trim();
        if input.is_empty() {
            return Err(Error::invalid_code(raw, "code is empty"));
        }

        if input.contains('/') {
            Self::parse_path(raw, input)
        } else if let Some((domain, name)) = input.split_once('.') {
            Self::parse_dotted(raw, domain, name)
        } else {
            Err(Error::invalid_code(
                raw,
                "expected `domain.Name` or `/domain/snake_name`",
            ))
        }
    }

    fn parse_dotted(raw: &str, domain: &str, name: &str) -> Result<Self> {
        validate_domain(raw, domain)?;
        if name.is_empty() {
            return Err(Error::invalid_code(raw, "name is empty"));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::invalid_code(
                raw,
                "name must be a single PascalCase token",
            ));
        }
        Ok(Self {
            domain: domain.to_string(),
            name: capitalize(name),
        })
    }

    fn parse_path(raw: &str, input: &str) -> Result<Self> {
        let mut segments = input.split('/').filter(|s| !s.is_empty());
        let Some(domain) = segments.next() else {
            return Err(Error::invalid_code(
                raw,
                "expected `domain.Name` or `/domain/snake_name`",
            ));
        };
        validate_domain(raw, domain)?;

        let mut name = String::new();
        for word in segments.flat_map(|s| s.split('_')).filter(|w| !w.is_empty()) {
            if !word.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(Error::invalid_code(
                    raw,
                    format!("name segment '{word}' contains a separator"),
                ));
            }
            name.push_str(&capitalize(word));
        }
        if name.is_empty() {
            return Err(Error::invalid_code(raw, "name is empty"));
        }

        Ok(Self {
            domain: domain.to_string(),
            name,
        })
    }

    /// Lowercase domain token, e.g. `market`.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// PascalCase name token, e.g. `PriceUsdClose`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical `domain.Name` string.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Human-readable chart title derived from the name.
    ///
    /// `MarketCapUsd` becomes `Market Cap Usd`; capital runs such as
    /// `MVRV` stay together.
    #[must_use]
    pub fn display_name(&self) -> String {
        let chars: Vec<char> = self.name.chars().collect();
        let mut out = String::with_capacity(self.name.len() + 4);
        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && c.is_ascii_uppercase() {
                let prev = chars[i - 1];
                let next_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
                if !prev.is_ascii_uppercase() || next_lower {
                    out.push(' ');
                }
            }
            out.push(c);
        }
        out
    }
}

fn validate_domain(raw: &str, domain: &str) -> Result<()> {
    if domain.is_empty() {
        return Err(Error::invalid_code(raw, "domain is empty"));
    }
    if domain.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(Error::invalid_code(raw, "domain must be lowercase"));
    }
    if let Some(c) = domain
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_'))
    {
        return Err(Error::invalid_code(
            raw,
            format!("domain contains invalid character {c:?}"),
        ));
    }
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(word.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

impl fmt::Display for MetricCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.domain, self.name)
    }
}

impl FromStr for MetricCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MetricCode {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<MetricCode> for String {
    fn from(code: MetricCode) -> Self {
        code.to_string()
    }
}
