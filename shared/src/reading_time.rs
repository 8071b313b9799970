//! Reading-time estimate for article bodies.

use crate::{rich_text, ArticleSection};

/// Assumed reading speed.
pub const WORDS_PER_MINUTE: usize = 200;

/// Number of whitespace-separated tokens in `text`.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Words in a section body. The heading is not counted.
pub fn section_word_count(section: &ArticleSection) -> usize {
    count_words(&rich_text::as_text(&section.body))
}

/// Words across all sections.
pub fn total_word_count(sections: &[ArticleSection]) -> usize {
    sections.iter().map(section_word_count).sum()
}

/// Whole minutes needed for `words`, rounding any remainder up.
pub fn minutes_for_words(words: usize) -> u32 {
    u32::try_from(words.div_ceil(WORDS_PER_MINUTE)).unwrap_or(u32::MAX)
}

/// Estimated reading time of an article body in whole minutes.
///
/// The estimate depends only on the total word count, never on how the words
/// are split between sections.
pub fn estimate_reading_time(sections: &[ArticleSection]) -> u32 {
    minutes_for_words(total_word_count(sections))
}
