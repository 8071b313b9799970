//! View model of the article page.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};

use crate::{rich_text, Article, ContentError};

/// Site name appended to page titles.
pub const SITE_NAME: &str = "SpaceTraveling";

/// pt-BR month abbreviations, January first.
const MONTH_ABBREVIATIONS: [&str; 12] =
    ["jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez"];

/// One rendered article section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionView {
    /// Section heading, plain text.
    pub heading: String,
    /// Sanitized body markup.
    pub html: String,
}

/// Everything the article page displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleView {
    /// Article slug.
    pub uid: String,
    /// Article title.
    pub title: String,
    /// Banner image URL.
    pub banner: Option<String>,
    /// Author display name.
    pub author: String,
    /// Publication date formatted for display; empty when unknown.
    pub published_on: String,
    /// Estimated reading time in whole minutes.
    pub reading_time_minutes: u32,
    /// Rendered body sections in document order.
    pub sections: Vec<SectionView>,
}

impl ArticleView {
    /// Builds the view model. The reading time is computed here, on every call.
    pub fn from_article(article: &Article) -> Self {
        Self {
            uid: article.uid.clone(),
            title: article.title.clone(),
            banner: article.banner.clone(),
            author: article.author.clone(),
            published_on: format_publication_date(article.first_publication_date.as_deref()),
            reading_time_minutes: article.reading_time_minutes(),
            sections: article
                .sections
                .iter()
                .map(|section| SectionView {
                    heading: section.heading.clone(),
                    html: rich_text::as_html(&section.body),
                })
                .collect(),
        }
    }

    /// Browser title of the article page.
    pub fn document_title(&self) -> String {
        format!("{} | {SITE_NAME}", self.title)
    }
}

/// Data phase of the article page.
#[derive(Debug)]
pub enum ArticlePhase {
    /// The route is not resolved yet; only a loading indicator is shown.
    Pending,
    /// The article was fetched and its view model built.
    Ready(Box<ArticleView>),
    /// The article could not be fetched.
    Failed(ContentError),
}

impl ArticlePhase {
    /// Phase for the result of fetching an article.
    pub fn from_fetch(result: crate::Result<Article>) -> Self {
        match result {
            Ok(article) => Self::Ready(Box::new(ArticleView::from_article(&article))),
            Err(err) => Self::Failed(err),
        }
    }
}

/// Formats a provider timestamp as `d MMM y` with pt-BR month abbreviations,
/// e.g. `15 mar 2021`. The date is taken in the timestamp's own offset.
///
/// Missing or unparseable timestamps format as an empty string.
pub fn format_publication_date(timestamp: Option<&str>) -> String {
    timestamp
        .and_then(parse_timestamp)
        .map(|date| {
            let month = MONTH_ABBREVIATIONS[date.month0() as usize];
            format!("{} {} {}", date.day(), month, date.year())
        })
        .unwrap_or_default()
}

fn parse_timestamp(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::<FixedOffset>::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}
