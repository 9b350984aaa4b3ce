//! Query normalization.
//!
//! Every cache key and adapter input is derived from a [`SearchQuery`], so two
//! raw strings that trim and case-fold to the same text share one cache entry.

use std::fmt;

/// Minimum number of characters a normalized query needs before any search runs.
pub const MIN_QUERY_LEN: usize = 2;

/// A trimmed, lower-cased search query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Normalize a raw user string.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, not bytes.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the query is long enough to be worth searching.
    pub fn meets_min_len(&self, min_len: usize) -> bool {
        self.len() >= min_len
    }

    /// Case-insensitive substring test against a single field.
    pub fn matches(&self, field: &str) -> bool {
        field.to_lowercase().contains(&self.0)
    }

    /// Case-insensitive substring test against any of the given fields.
    pub fn matches_any<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        fields.into_iter().any(|field| self.matches(field))
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SearchQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
