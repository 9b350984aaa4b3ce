//! Local structured-content (project) index.
//!
//! Projects are loaded once from a JSON array; searching never touches the
//! filesystem again.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scout_core::{ResultType, SearchQuery, SearchResult};
use serde::{Deserialize, Serialize};

use super::{ContentSource, SourceError};

/// A project entry as stored in the index file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub slug: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Project {
    fn matches(&self, query: &SearchQuery) -> bool {
        query.matches(&self.title)
            || query.matches(&self.description)
            || query.matches_any(self.technologies.iter().chain(&self.tags).map(String::as_str))
    }

    fn to_result(&self) -> SearchResult {
        SearchResult {
            id: ResultType::StructuredProject.namespaced_id(&self.slug),
            title: self.title.clone(),
            description: self.description.clone(),
            url: format!("/projects/{}", self.slug),
            kind: ResultType::StructuredProject,
            category: self.category.clone(),
            published_at: self.published_at,
        }
    }
}

/// Searches an in-memory list of projects.
#[derive(Debug, Clone, Default)]
pub struct ProjectIndexSource {
    projects: Vec<Project>,
}

impl ProjectIndexSource {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    /// Load the index from a JSON file holding an array of projects.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SourceError::Load { path: path.display().to_string(), reason: e.to_string() })?;
        let projects: Vec<Project> = serde_json::from_str(&raw).map_err(|e| SourceError::Parse(e.to_string()))?;

        tracing::info!(path = %path.display(), count = projects.len(), "loaded project index");
        Ok(Self::new(projects))
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

#[async_trait]
impl ContentSource for ProjectIndexSource {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SourceError> {
        Ok(self.projects.iter().filter(|p| p.matches(query)).map(Project::to_result).collect())
    }

    fn name(&self) -> &'static str {
        "projects"
    }
}
