//! Content model and page logic for the Space Traveling blog.
//!
//! The crate sits between the remote content provider and the rendered pages:
//! it decodes provider documents, accumulates listing pages and derives the
//! article view model (including the reading-time estimate).

pub mod article_view;
pub mod error;
pub mod pagination;
pub mod prismic;
pub mod provider;
pub mod reading_time;
pub mod rich_text;

pub use error::{ContentError, Result};
pub use provider::{ContentProvider, SummaryPage, LISTING_PAGE_SIZE, PUBLICATION_TYPE};
pub use rich_text::RichTextBlock;

/// Listing representation of a published article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSummary {
    /// URL-safe slug, unique per article.
    pub uid: String,
    /// ISO-8601 timestamp of the first publication, if the provider has one.
    pub first_publication_date: Option<String>,
    /// Article title.
    pub title: String,
    /// One-line teaser shown under the title.
    pub subtitle: String,
    /// Display name of the author.
    pub author: String,
}

/// A headed part of an article body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSection {
    /// Section heading. Not counted as body text.
    pub heading: String,
    /// Ordered rich-text blocks of the section body.
    pub body: Vec<RichTextBlock>,
}

/// A full article as fetched by identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// URL-safe slug, unique per article.
    pub uid: String,
    /// ISO-8601 timestamp of the first publication, if the provider has one.
    pub first_publication_date: Option<String>,
    /// Article title.
    pub title: String,
    /// Banner image URL.
    pub banner: Option<String>,
    /// Display name of the author.
    pub author: String,
    /// Body sections in document order.
    pub sections: Vec<ArticleSection>,
}

impl Article {
    /// Reading time in whole minutes, recomputed from the current body.
    pub fn reading_time_minutes(&self) -> u32 {
        reading_time::estimate_reading_time(&self.sections)
    }
}
