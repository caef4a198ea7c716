//! Utility functions and types.

use std::fmt::Debug;

/// Debug wrapper that hides a credential value.
///
/// - Empty values print as `EMPTY`.
/// - Values shorter than 12 characters are fully masked.
/// - Longer values keep their first and last three characters so two
///   session keys can still be told apart in logs.
///
/// Lengths are counted in characters, never bytes.
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.0.chars().count();
        match count {
            0 => f.write_str("EMPTY"),
            1..=11 => f.write_str("***"),
            _ => {
                let head: String = self.0.chars().take(3).collect();
                let tail: String = self.0.chars().skip(count - 3).collect();
                write!(f, "{head}***{tail}")
            }
        }
    }
}
