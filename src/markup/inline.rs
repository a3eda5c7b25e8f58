//! Inline bold markup (`**bold**`) transformation.
//!
//! The upstream generator marks emphasis with double asterisks. A line is
//! scanned once, left to right: an opening `**` pairs with the next `**`,
//! which makes matching non-greedy and lets several bold regions share a
//! line. A trailing unpaired `**` is kept as literal text.

use serde::{Deserialize, Serialize};

/// The bold delimiter emitted by the summary generator.
pub const BOLD_MARKER: &str = "**";

/// A contiguous run of text tagged plain or bold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum InlineSpan {
    /// Unstyled text
    Plain(String),
    /// Bold text
    Bold(String),
}

impl InlineSpan {
    /// The raw text of the span.
    pub fn text(&self) -> &str {
        match self {
            InlineSpan::Plain(text) | InlineSpan::Bold(text) => text,
        }
    }

    /// Whether the span is bold.
    pub fn is_bold(&self) -> bool {
        matches!(self, InlineSpan::Bold(_))
    }
}

/// One line of rich text: an ordered list of inline spans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText {
    spans: Vec<InlineSpan>,
}

impl RichText {
    /// Create empty rich text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rich text consisting of a single plain span.
    pub fn plain(text: impl Into<String>) -> Self {
        let mut rich = Self::new();
        rich.push_plain(text);
        rich
    }

    /// Rich text consisting of a single bold span.
    pub fn bold(text: impl Into<String>) -> Self {
        let mut rich = Self::new();
        rich.push_bold(text);
        rich
    }

    /// Append plain text, merging with a preceding plain span.
    pub fn push_plain(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(InlineSpan::Plain(prev)) => prev.push_str(&text),
            _ => self.spans.push(InlineSpan::Plain(text)),
        }
    }

    /// Append a bold span. Empty text is ignored.
    pub fn push_bold(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.spans.push(InlineSpan::Bold(text));
        }
    }

    /// The spans in order.
    pub fn spans(&self) -> &[InlineSpan] {
        &self.spans
    }

    /// Consume into spans.
    pub fn into_spans(self) -> Vec<InlineSpan> {
        self.spans
    }

    /// Concatenated text without any markup.
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(InlineSpan::text).collect()
    }

    /// Number of bold spans.
    pub fn bold_count(&self) -> usize {
        self.spans.iter().filter(|s| s.is_bold()).count()
    }

    /// Check if there is no text at all.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Render to the renderer's rich-text markup.
    ///
    /// Text is escaped first; `<b>` tags are then added only around bold
    /// spans, so user text can never introduce markup of its own.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            match span {
                InlineSpan::Plain(text) => out.push_str(&escape_markup(text)),
                InlineSpan::Bold(text) => {
                    out.push_str("<b>");
                    out.push_str(&escape_markup(text));
                    out.push_str("</b>");
                }
            }
        }
        out
    }
}

impl From<Vec<InlineSpan>> for RichText {
    fn from(spans: Vec<InlineSpan>) -> Self {
        let mut rich = RichText::new();
        for span in spans {
            match span {
                InlineSpan::Plain(text) => rich.push_plain(text),
                InlineSpan::Bold(text) => rich.push_bold(text),
            }
        }
        rich
    }
}

/// Escape characters that carry structure in rich-text markup.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Split a line into plain and bold spans.
///
/// Never fails: an unterminated marker is literal text.
pub fn parse_inline(line: &str) -> RichText {
    let mut rich = RichText::new();
    let mut rest = line;

    while let Some(open) = rest.find(BOLD_MARKER) {
        let after_open = &rest[open + BOLD_MARKER.len()..];
        let Some(close) = after_open.find(BOLD_MARKER) else {
            break;
        };
        rich.push_plain(&rest[..open]);
        rich.push_bold(&after_open[..close]);
        rest = &after_open[close + BOLD_MARKER.len()..];
    }

    rich.push_plain(rest);
    rich
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(s: &str) -> InlineSpan {
        InlineSpan::Plain(s.to_string())
    }

    fn bold(s: &str) -> InlineSpan {
        InlineSpan::Bold(s.to_string())
    }

    #[test]
    fn test_leading_bold_then_plain() {
        let rich = parse_inline("**38.5度**の発熱");
        assert_eq!(rich.spans(), &[bold("38.5度"), plain("の発熱")]);
    }

    #[test]
    fn test_adjacent_bold_regions_are_separate() {
        let rich = parse_inline("**腹痛**と**嘔吐**あり");
        assert_eq!(
            rich.spans(),
            &[bold("腹痛"), plain("と"), bold("嘔吐"), plain("あり")]
        );
        assert_eq!(rich.bold_count(), 2);
    }

    #[test]
    fn test_no_markup_is_single_plain_span() {
        let rich = parse_inline("発症は昨日");
        assert_eq!(rich.spans(), &[plain("発症は昨日")]);
    }

    #[test]
    fn test_unpaired_marker_is_literal() {
        let rich = parse_inline("痛みは**強い");
        assert_eq!(rich.spans(), &[plain("痛みは**強い")]);
        assert_eq!(rich.bold_count(), 0);
    }

    #[test]
    fn test_odd_marker_count_keeps_trailing_marker() {
        let rich = parse_inline("a **b** c **d");
        assert_eq!(rich.spans(), &[plain("a "), bold("b"), plain(" c **d")]);
    }

    #[test]
    fn test_empty_bold_is_dropped() {
        let rich = parse_inline("x****y");
        assert_eq!(rich.spans(), &[plain("xy")]);
    }

    #[test]
    fn test_plain_text_drops_markers() {
        let rich = parse_inline("体温 **38.5度**、脈拍 **110**");
        assert_eq!(rich.plain_text(), "体温 38.5度、脈拍 110");
    }

    // ==================== Escaping ====================

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape_markup("a<b>&c"), "a&lt;b&gt;&amp;c");
        assert_eq!(escape_markup("腹痛"), "腹痛");
    }

    #[test]
    fn test_markup_escapes_before_bold() {
        let rich = parse_inline("**<script>**&co");
        assert_eq!(rich.to_markup(), "<b>&lt;script&gt;</b>&amp;co");
    }

    #[test]
    fn test_markup_of_unpaired_line_is_escaped_original() {
        let line = "x < 3 **y";
        let rich = parse_inline(line);
        assert_eq!(rich.to_markup(), escape_markup(line));
    }

    #[test]
    fn test_reparse_of_escaped_unpaired_line_stays_plain() {
        let line = "血圧 <140 **要確認";
        let escaped = escape_markup(line);
        let again = parse_inline(&escaped);
        assert_eq!(again.bold_count(), 0);
        assert_eq!(again.plain_text(), escaped);
    }

    #[test]
    fn test_from_spans_merges_plain() {
        let rich = RichText::from(vec![plain("a"), plain("b"), bold(""), bold("c")]);
        assert_eq!(rich.spans(), &[plain("ab"), bold("c")]);
    }
}
