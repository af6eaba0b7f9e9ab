//! Recipient addresses, validated at the batch boundary.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The address failed the minimal validity predicate.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("recipient address has no '@': {0}")]
pub struct InvalidRecipient(pub String);

/// A recipient address that passed the minimal validity predicate
/// (contains an `@` separator).
///
/// Construction is the batch boundary: once a batch holds `Recipient`
/// values, no per-attempt validation happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient(String);

impl Recipient {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Recipient {
    type Err = InvalidRecipient;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.contains('@') {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(InvalidRecipient(trimmed.to_string()))
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
