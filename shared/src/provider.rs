//! The content provider seam: what the blog needs from a remote content
//! repository, independent of the concrete API.

use async_trait::async_trait;

use crate::{Article, ArticleSummary, Result};

/// Custom type of blog articles in the content repository.
pub const PUBLICATION_TYPE: &str = "publication";

/// Number of summaries requested per listing page.
pub const LISTING_PAGE_SIZE: u32 = 4;

/// One page of article summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryPage {
    /// Summaries in provider order.
    pub results: Vec<ArticleSummary>,
    /// Opaque locator of the following page; `None` on the last page.
    pub next_page: Option<String>,
}

/// Remote content source for the blog.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// First page of documents of `document_type`, in provider order.
    async fn query_by_type(&self, document_type: &str, page_size: u32) -> Result<SummaryPage>;

    /// The document of `document_type` whose uid is `uid`.
    async fn get_by_uid(&self, document_type: &str, uid: &str) -> Result<Article>;

    /// The page behind a locator returned in [`SummaryPage::next_page`].
    async fn fetch_page(&self, locator: &str) -> Result<SummaryPage>;
}
