//! Static page source.
//!
//! A fixed, in-memory list of the site's top-level pages.

use async_trait::async_trait;
use scout_core::{ResultType, SearchQuery, SearchResult};

use super::{ContentSource, SourceError};

/// A page that exists regardless of content-management data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPage {
    pub path: String,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
}

impl StaticPage {
    pub fn new(path: &str, title: &str, description: &str, keywords: &[&str]) -> Self {
        Self {
            path: path.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Stable identifier derived from the path; the root page is `home`.
    fn slug(&self) -> String {
        let trimmed = self.path.trim_matches('/');
        if trimmed.is_empty() { "home".to_string() } else { trimmed.replace('/', "-") }
    }

    fn matches(&self, query: &SearchQuery) -> bool {
        query.matches(&self.title)
            || query.matches(&self.description)
            || query.matches_any(self.keywords.iter().map(String::as_str))
    }

    fn to_result(&self) -> SearchResult {
        SearchResult {
            id: ResultType::StaticPage.namespaced_id(&self.slug()),
            title: self.title.clone(),
            description: self.description.clone(),
            url: self.path.clone(),
            kind: ResultType::StaticPage,
            category: None,
            published_at: None,
        }
    }
}

/// Searches a fixed list of pages.
#[derive(Debug, Clone)]
pub struct StaticPageSource {
    pages: Vec<StaticPage>,
}

impl StaticPageSource {
    pub fn new(pages: Vec<StaticPage>) -> Self {
        Self { pages }
    }

    /// The site's built-in top-level pages.
    pub fn site_pages() -> Self {
        Self::new(vec![
            StaticPage::new("/", "Home", "Landing page with recent writing and featured projects", &["welcome", "index"]),
            StaticPage::new("/about", "About", "Background, experience and the tools I work with", &["bio", "resume", "cv"]),
            StaticPage::new("/projects", "Projects", "Everything I have built, with write-ups", &["portfolio", "work"]),
            StaticPage::new("/blog", "Blog", "Articles and notes on software engineering", &["articles", "posts", "writing"]),
            StaticPage::new("/contact", "Contact", "Ways to get in touch", &["email", "hire", "message"]),
        ])
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl Default for StaticPageSource {
    fn default() -> Self {
        Self::site_pages()
    }
}

#[async_trait]
impl ContentSource for StaticPageSource {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SourceError> {
        Ok(self.pages.iter().filter(|page| page.matches(query)).map(StaticPage::to_result).collect())
    }

    fn name(&self) -> &'static str {
        "pages"
    }
}
