//! Result ordering.
//!
//! Results are ordered by, in turn:
//!
//! 1. title matches before results that only matched a secondary field
//! 2. source priority (project, post, item, page)
//! 3. newest `published_at` first; undated results after dated ones
//! 4. encounter order
//!
//! The sort is stable, so the last criterion needs no explicit key.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use scout_core::{SearchQuery, SearchResult};

type RankKey = (bool, u8, Reverse<Option<DateTime<Utc>>>);

fn rank_key(query: &SearchQuery, result: &SearchResult) -> RankKey {
    (!query.matches(&result.title), result.kind.priority(), Reverse(result.published_at))
}

/// Sort `results` in place for display.
pub fn rank(query: &SearchQuery, results: &mut [SearchResult]) {
    results.sort_by_cached_key(|result| rank_key(query, result));
}
