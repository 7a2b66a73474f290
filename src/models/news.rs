//! News article model
//!
//! Articles are authored outside this service; the site only reads the
//! published ones. Filtering runs over an already loaded list, the same way
//! the news page narrows what it fetched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: i64,
    pub title: String,
    /// Unique, URL-safe public key
    pub slug: String,
    pub excerpt: String,
    /// Body text, paragraphs separated by a blank line
    pub content: String,
    pub image_url: Option<String>,
    pub author: String,
    pub category: String,
    pub published_at: DateTime<Utc>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl NewsArticle {
    /// Split the body into paragraphs on blank lines.
    pub fn paragraphs(&self) -> Vec<&str> {
        self.content
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// Image to show, falling back to `fallback` when none is set
    pub fn image_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.image_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => fallback,
        }
    }
}

/// Input for inserting an article (seeding and tests)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNewsInput {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub image_url: Option<String>,
    pub author: String,
    pub category: String,
    pub published_at: DateTime<Utc>,
    pub is_published: bool,
}

impl CreateNewsInput {
    /// A published article with the given title, slug and category
    pub fn published(
        title: impl Into<String>,
        slug: impl Into<String>,
        category: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        let title = title.into();
        Self {
            excerpt: format!("Ringkasan {}", title),
            content: format!("{}\n\nParagraf kedua.", title),
            title,
            slug: slug.into(),
            image_url: None,
            author: "Redaksi".to_string(),
            category: category.into(),
            published_at,
            is_published: true,
        }
    }
}

/// Free-text query plus optional exact category
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewsFilter {
    #[serde(default, rename = "q")]
    pub query: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewsFilter {
    pub fn new(query: impl Into<String>, category: Option<String>) -> Self {
        Self {
            query: query.into(),
            category,
        }
    }

    /// Case-insensitive substring match on title or excerpt, and exact
    /// category match when one is selected. An empty category means "all".
    pub fn matches(&self, article: &NewsArticle) -> bool {
        let query = self.query.trim().to_lowercase();
        let text_ok = query.is_empty()
            || article.title.to_lowercase().contains(&query)
            || article.excerpt.to_lowercase().contains(&query);

        let category_ok = match self.category.as_deref() {
            Some(category) if !category.is_empty() => article.category == category,
            _ => true,
        };

        text_ok && category_ok
    }

    /// Keep the matching articles, preserving order
    pub fn apply<'a>(&self, articles: &'a [NewsArticle]) -> Vec<&'a NewsArticle> {
        articles.iter().filter(|a| self.matches(a)).collect()
    }
}

/// Distinct categories in first-seen order
pub fn categories(articles: &[NewsArticle]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for article in articles {
        if !seen.iter().any(|c| c == &article.category) {
            seen.push(article.category.clone());
        }
    }
    seen
}
