//! Structured rich text as delivered by the content provider, and its plain
//! text and HTML renditions.

use serde::Deserialize;

/// Block-level kind of a rich-text block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum BlockKind {
    /// Plain paragraph.
    #[default]
    Paragraph,
    /// Heading of level 1 to 6.
    Heading(u8),
    /// Preformatted text, whitespace preserved.
    Preformatted,
    /// Item of an unordered list.
    ListItem,
    /// Item of an ordered list.
    OrderedListItem,
    /// Any other block type (images, embeds, ...); rendered as a paragraph.
    Other(String),
}

impl From<String> for BlockKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "paragraph" => Self::Paragraph,
            "preformatted" => Self::Preformatted,
            "list-item" => Self::ListItem,
            "o-list-item" => Self::OrderedListItem,
            other => match other
                .strip_prefix("heading")
                .and_then(|level| level.parse::<u8>().ok())
                .filter(|level| (1..=6).contains(level))
            {
                Some(level) => Self::Heading(level),
                None => Self::Other(value),
            },
        }
    }
}

/// Inline formatting applied to a character range of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    /// Bold text.
    Strong,
    /// Emphasised text.
    Em,
    /// Link to an external URL.
    Hyperlink(String),
    /// Formatting this renderer does not know; the text stays plain.
    Other(String),
}

/// Formatting span over `[start, end)` in characters of the block text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawSpan")]
pub struct RichTextSpan {
    /// First character covered.
    pub start: usize,
    /// One past the last character covered.
    pub end: usize,
    /// Formatting to apply.
    pub kind: SpanKind,
}

#[derive(Deserialize)]
struct RawSpan {
    start: usize,
    end: usize,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<RawSpanData>,
}

#[derive(Deserialize)]
struct RawSpanData {
    #[serde(default)]
    url: Option<String>,
}

impl From<RawSpan> for RichTextSpan {
    fn from(raw: RawSpan) -> Self {
        let kind = match raw.kind.as_str() {
            "strong" => SpanKind::Strong,
            "em" => SpanKind::Em,
            "hyperlink" => match raw.data.and_then(|data| data.url) {
                Some(url) => SpanKind::Hyperlink(url),
                None => SpanKind::Other(raw.kind),
            },
            _ => SpanKind::Other(raw.kind),
        };
        Self {
            start: raw.start,
            end: raw.end,
            kind,
        }
    }
}

/// One block of rich text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RichTextBlock {
    /// Block-level kind.
    #[serde(rename = "type", default)]
    pub kind: BlockKind,
    /// Text content of the block.
    #[serde(default)]
    pub text: String,
    /// Inline formatting over `text`.
    #[serde(default)]
    pub spans: Vec<RichTextSpan>,
}

impl RichTextBlock {
    /// Unformatted paragraph block.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            text: text.into(),
            spans: Vec::new(),
        }
    }
}

/// Plain text of a block sequence, blocks joined by a single space.
pub fn as_text(blocks: &[RichTextBlock]) -> String {
    blocks
        .iter()
        .map(|block| block.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sanitized HTML for a block sequence.
///
/// Consecutive list items share one `<ul>`/`<ol>`. The generated markup is
/// passed through ammonia, so only its default allow-list reaches the page.
pub fn as_html(blocks: &[RichTextBlock]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list_tag = match block.kind {
            BlockKind::ListItem => Some("ul"),
            BlockKind::OrderedListItem => Some("ol"),
            _ => None,
        };
        if open_list != list_tag {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{tag}>"));
            }
            if let Some(tag) = list_tag {
                html.push_str(&format!("<{tag}>"));
            }
            open_list = list_tag;
        }

        let line_breaks = block.kind != BlockKind::Preformatted;
        let inline = render_inline(&block.text, &block.spans, line_breaks);
        html.push_str(&match &block.kind {
            BlockKind::Paragraph | BlockKind::Other(_) => format!("<p>{inline}</p>"),
            BlockKind::Heading(level) => format!("<h{level}>{inline}</h{level}>"),
            BlockKind::Preformatted => format!("<pre>{inline}</pre>"),
            BlockKind::ListItem | BlockKind::OrderedListItem => format!("<li>{inline}</li>"),
        });
    }
    if let Some(tag) = open_list {
        html.push_str(&format!("</{tag}>"));
    }

    ammonia::clean(&html)
}

fn span_tags(kind: &SpanKind) -> Option<(String, &'static str)> {
    match kind {
        SpanKind::Strong => Some(("<strong>".to_string(), "</strong>")),
        SpanKind::Em => Some(("<em>".to_string(), "</em>")),
        SpanKind::Hyperlink(url) => Some((format!(r#"<a href="{}">"#, escape_html(url)), "</a>")),
        SpanKind::Other(_) => None,
    }
}

/// Renders the text of one block with its spans applied.
///
/// The text is cut at every span boundary; each segment is wrapped in the tags
/// of all spans covering it, so overlapping spans still nest correctly.
fn render_inline(text: &str, spans: &[RichTextSpan], line_breaks: bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let mut active: Vec<(usize, usize, (String, &'static str))> = spans
        .iter()
        .filter_map(|span| {
            let end = span.end.min(len);
            if span.start >= end {
                return None;
            }
            span_tags(&span.kind).map(|tags| (span.start, end, tags))
        })
        .collect();
    active.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut bounds = vec![0, len];
    for (start, end, _) in &active {
        bounds.push(*start);
        bounds.push(*end);
    }
    bounds.sort_unstable();
    bounds.dedup();

    let mut out = String::with_capacity(text.len());
    for window in bounds.windows(2) {
        let (from, to) = (window[0], window[1]);
        let covering: Vec<&(String, &'static str)> = active
            .iter()
            .filter(|(start, end, _)| *start <= from && *end >= to)
            .map(|(_, _, tags)| tags)
            .collect();

        for (open, _) in &covering {
            out.push_str(open);
        }
        let segment: String = chars[from..to].iter().collect();
        let escaped = escape_html(&segment);
        if line_breaks {
            out.push_str(&escaped.replace('\n', "<br />"));
        } else {
            out.push_str(&escaped);
        }
        for (_, close) in covering.iter().rev() {
            out.push_str(close);
        }
    }
    out
}

/// Escapes text for HTML element content and double-quoted attribute values.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
