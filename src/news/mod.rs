pub mod category;
pub mod fetcher;
pub mod service;
pub mod validator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A validated, sanitized article ready for display.
///
/// Constructed only by the validation pipeline; immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub content: String,
    pub url: String,
    pub image: String,
    pub published_at: DateTime<Utc>,
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
}

/// A validated response batch: only well-formed articles, input order
/// preserved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsBatch {
    pub total_articles: usize,
    pub articles: Vec<Article>,
}

impl NewsBatch {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            total_articles: articles.len(),
            articles,
        }
    }

    /// The uniform failure signal at the data-access boundary: callers
    /// treat an empty batch as "nothing to display".
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

/// Raw response envelope from the upstream API.
///
/// Article records stay as untyped JSON values here: a single malformed
/// element must be droppable by the validator without failing the whole
/// batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResponse {
    #[serde(default, rename = "totalArticles")]
    pub total_articles: Option<u64>,
    #[serde(default)]
    pub articles: Vec<serde_json::Value>,
}
