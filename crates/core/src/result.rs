//! Unified search result model and the `/api/search` wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of content a result points at.
///
/// Variants are declared in ranking priority order, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultType {
    StructuredProject,
    ContentPost,
    #[serde(rename = "item")]
    GenericItem,
    StaticPage,
}

impl ResultType {
    /// Prefix used to namespace result ids per source type.
    pub fn id_prefix(self) -> &'static str {
        match self {
            ResultType::StructuredProject => "project",
            ResultType::ContentPost => "post",
            ResultType::GenericItem => "item",
            ResultType::StaticPage => "page",
        }
    }

    /// Ranking priority; lower sorts first.
    pub fn priority(self) -> u8 {
        match self {
            ResultType::StructuredProject => 0,
            ResultType::ContentPost => 1,
            ResultType::GenericItem => 2,
            ResultType::StaticPage => 3,
        }
    }

    /// Build a namespaced id for a source-local identifier.
    pub fn namespaced_id(self, local_id: &str) -> String {
        format!("{}-{}", self.id_prefix(), local_id)
    }
}

/// A single search hit, regardless of which source produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Globally unique id, namespaced by source type.
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResultType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, rename = "publishedAt", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

/// Body of a `GET /api/search` response.
///
/// Too-short queries answer with only `results`; the other fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

impl SearchResponse {
    /// Response for a query that was rejected before searching.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn found(query: &str, results: Vec<SearchResult>, cached: bool) -> Self {
        Self { total: Some(results.len()), query: Some(query.to_string()), cached: Some(cached), results }
    }
}

/// Body of a failed `GET /api/search` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), results: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_type_serialization() {
        assert_eq!(serde_json::to_string(&ResultType::StructuredProject).unwrap(), r#""structured-project""#);
        assert_eq!(serde_json::to_string(&ResultType::ContentPost).unwrap(), r#""content-post""#);
        assert_eq!(serde_json::to_string(&ResultType::GenericItem).unwrap(), r#""item""#);
        assert_eq!(serde_json::to_string(&ResultType::StaticPage).unwrap(), r#""static-page""#);
    }

    #[test]
    fn test_priority_order() {
        assert!(ResultType::StructuredProject.priority() < ResultType::ContentPost.priority());
        assert!(ResultType::ContentPost.priority() < ResultType::GenericItem.priority());
        assert!(ResultType::GenericItem.priority() < ResultType::StaticPage.priority());
    }

    #[test]
    fn test_namespaced_ids_do_not_collide() {
        assert_eq!(ResultType::ContentPost.namespaced_id("42"), "post-42");
        assert_ne!(ResultType::ContentPost.namespaced_id("a"), ResultType::StaticPage.namespaced_id("a"));
    }

    #[test]
    fn test_empty_response_omits_metadata() {
        let json = serde_json::to_value(SearchResponse::empty()).unwrap();
        assert_eq!(json, serde_json::json!({ "results": [] }));
    }

    #[test]
    fn test_found_response_shape() {
        let json = serde_json::to_value(SearchResponse::found("rust", Vec::new(), true)).unwrap();
        assert_eq!(json["query"], "rust");
        assert_eq!(json["total"], 0);
        assert_eq!(json["cached"], true);
    }

    #[test]
    fn test_result_wire_field_names() {
        let result = SearchResult {
            id: "post-1".into(),
            title: "Hello".into(),
            description: "World".into(),
            url: "/blog/hello".into(),
            kind: ResultType::ContentPost,
            category: None,
            published_at: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "content-post");
        assert!(json.get("category").is_none());
        assert!(json.get("publishedAt").is_none());
    }
}
