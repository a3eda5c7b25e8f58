//! Structural line classification.
//!
//! A line is a Heading, a Bullet or Body text depending only on its
//! trimmed prefix. Blank lines produce nothing.

use serde::{Deserialize, Serialize};

use super::inline::{parse_inline, RichText, BOLD_MARKER};

/// Structural kind of a non-blank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Section heading
    Heading,
    /// Bulleted list item
    Bullet,
    /// Plain paragraph
    Body,
}

/// Prefix conventions used by the summary generator.
///
/// The glyph set has varied between generator prompts, so it is kept as
/// configuration rather than hard-coded in the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupConventions {
    /// Heading markers that are removed from the displayed text
    pub heading_markers: Vec<String>,

    /// Heading triggers that remain part of the displayed text (e.g. `【`)
    pub heading_labels: Vec<String>,

    /// Bullet markers, removed from the displayed text
    pub bullet_markers: Vec<String>,
}

impl MarkupConventions {
    /// Create the default convention set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stripped heading marker.
    pub fn with_heading_marker(mut self, marker: impl Into<String>) -> Self {
        self.heading_markers.push(marker.into());
        self
    }

    /// Add a kept heading label opener.
    pub fn with_heading_label(mut self, opener: impl Into<String>) -> Self {
        self.heading_labels.push(opener.into());
        self
    }

    /// Add a bullet marker.
    pub fn with_bullet_marker(mut self, marker: impl Into<String>) -> Self {
        self.bullet_markers.push(marker.into());
        self
    }

    fn heading_marker_at(&self, text: &str) -> Option<&str> {
        self.heading_markers
            .iter()
            .find(|m| !m.is_empty() && text.starts_with(m.as_str()))
            .map(String::as_str)
    }

    fn is_heading(&self, text: &str) -> bool {
        self.heading_marker_at(text).is_some()
            || self
                .heading_labels
                .iter()
                .any(|l| !l.is_empty() && text.starts_with(l.as_str()))
    }

    fn bullet_marker_at(&self, text: &str) -> Option<&str> {
        self.bullet_markers
            .iter()
            .find(|m| !m.is_empty() && text.starts_with(m.as_str()))
            .map(String::as_str)
    }

    /// Remove every leading heading marker and the whitespace after it.
    fn strip_heading<'a>(&self, mut text: &'a str) -> &'a str {
        while let Some(marker) = self.heading_marker_at(text) {
            text = text[marker.len()..].trim_start();
        }
        text
    }
}

impl Default for MarkupConventions {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            heading_markers: owned(&["■", "◆", "#"]),
            heading_labels: owned(&["【"]),
            bullet_markers: owned(&["- ", "* ", "・", "•"]),
        }
    }
}

/// A non-blank line with its structural kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    /// Structural kind
    pub kind: LineKind,
    /// The original line, trimmed
    pub raw: &'a str,
    /// Display text with the structural prefix removed
    pub content: &'a str,
}

impl ClassifiedLine<'_> {
    /// Apply the inline bold transformation to the display text.
    pub fn transform(&self) -> TransformedLine {
        TransformedLine {
            kind: self.kind,
            text: parse_inline(self.content),
        }
    }
}

/// A classified line whose display text went through inline transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformedLine {
    /// Structural kind
    pub kind: LineKind,
    /// Rich text to display
    pub text: RichText,
}

/// Inner text of a line wrapped entirely in a single bold pair.
fn unwrap_bold_line(trimmed: &str) -> Option<&str> {
    let inner = trimmed
        .strip_prefix(BOLD_MARKER)?
        .strip_suffix(BOLD_MARKER)?;
    if inner.contains(BOLD_MARKER) {
        return None;
    }
    Some(inner.trim())
}

/// Classify one line. Returns `None` for blank lines.
pub fn classify_line<'a>(
    line: &'a str,
    conventions: &MarkupConventions,
) -> Option<ClassifiedLine<'a>> {
    let raw = line.trim();
    if raw.is_empty() {
        return None;
    }

    // `**■ 主訴**`: headings are rendered bold anyway, so look through the wrapper.
    if let Some(inner) = unwrap_bold_line(raw) {
        if conventions.is_heading(inner) {
            return Some(ClassifiedLine {
                kind: LineKind::Heading,
                raw,
                content: conventions.strip_heading(inner),
            });
        }
    }

    if conventions.is_heading(raw) {
        return Some(ClassifiedLine {
            kind: LineKind::Heading,
            raw,
            content: conventions.strip_heading(raw),
        });
    }

    if let Some(marker) = conventions.bullet_marker_at(raw) {
        return Some(ClassifiedLine {
            kind: LineKind::Bullet,
            raw,
            content: raw[marker.len()..].trim_start(),
        });
    }

    Some(ClassifiedLine {
        kind: LineKind::Body,
        raw,
        content: raw,
    })
}

/// Classify every non-blank line of a text, in order.
pub fn classify_text<'a>(text: &'a str, conventions: &MarkupConventions) -> Vec<ClassifiedLine<'a>> {
    text.split('\n')
        .filter_map(|line| classify_line(line, conventions))
        .collect()
}

/// Classify and inline-transform every non-blank line of a text.
///
/// Lines left with no display text (a bare `■`, an empty `****`) are dropped.
pub fn transform_text(text: &str, conventions: &MarkupConventions) -> Vec<TransformedLine> {
    classify_text(text, conventions)
        .iter()
        .map(ClassifiedLine::transform)
        .filter(|line| !line.text.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(line: &str) -> Option<LineKind> {
        classify_line(line, &MarkupConventions::default()).map(|c| c.kind)
    }

    fn content_of(line: &str) -> String {
        classify_line(line, &MarkupConventions::default())
            .map(|c| c.content.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn test_blank_lines_produce_nothing() {
        assert_eq!(kind_of(""), None);
        assert_eq!(kind_of("   \t "), None);
        assert_eq!(kind_of("\r"), None);
    }

    #[test]
    fn test_heading_markers() {
        assert_eq!(kind_of("■ 主訴"), Some(LineKind::Heading));
        assert_eq!(kind_of("## 経過"), Some(LineKind::Heading));
        assert_eq!(kind_of("◆既往歴"), Some(LineKind::Heading));
        assert_eq!(kind_of("【患者サマリー】"), Some(LineKind::Heading));
    }

    #[test]
    fn test_heading_content_strips_markers_but_keeps_label() {
        assert_eq!(content_of("  ■ 主訴 "), "主訴");
        assert_eq!(content_of("### 経過"), "経過");
        assert_eq!(content_of("## 【患者サマリー】（医師提示用）"), "【患者サマリー】（医師提示用）");
        assert_eq!(content_of("【所見】"), "【所見】");
    }

    #[test]
    fn test_bold_wrapped_heading() {
        let line = classify_line("**■ 主訴（一番辛いこと）**", &MarkupConventions::default()).unwrap();
        assert_eq!(line.kind, LineKind::Heading);
        assert_eq!(line.content, "主訴（一番辛いこと）");
    }

    #[test]
    fn test_bold_wrapped_body_stays_body() {
        let line = classify_line("**至急受診を推奨**", &MarkupConventions::default()).unwrap();
        assert_eq!(line.kind, LineKind::Body);
        assert_eq!(line.content, "**至急受診を推奨**");
    }

    #[test]
    fn test_bullet_markers() {
        assert_eq!(kind_of("- 腹痛"), Some(LineKind::Bullet));
        assert_eq!(kind_of("* 発熱"), Some(LineKind::Bullet));
        assert_eq!(kind_of("・嘔気"), Some(LineKind::Bullet));
        assert_eq!(kind_of("• cough"), Some(LineKind::Bullet));
        assert_eq!(content_of("-   腹痛"), "腹痛");
        assert_eq!(content_of("・嘔気"), "嘔気");
    }

    #[test]
    fn test_dash_without_space_is_body() {
        assert_eq!(kind_of("-5度"), Some(LineKind::Body));
        assert_eq!(kind_of("-"), Some(LineKind::Body));
    }

    #[test]
    fn test_bold_is_not_a_bullet() {
        assert_eq!(kind_of("**38.5度**の発熱"), Some(LineKind::Body));
    }

    #[test]
    fn test_heading_wins_over_bullet() {
        let conventions = MarkupConventions::default().with_bullet_marker("■");
        let line = classify_line("■ 主訴", &conventions).unwrap();
        assert_eq!(line.kind, LineKind::Heading);
    }

    #[test]
    fn test_custom_conventions() {
        let conventions = MarkupConventions::default()
            .with_heading_marker("▼")
            .with_bullet_marker("→");
        assert_eq!(
            classify_line("▼ 症状", &conventions).map(|c| c.kind),
            Some(LineKind::Heading)
        );
        assert_eq!(
            classify_line("→ 頭痛", &conventions).map(|c| c.content),
            Some("頭痛")
        );
    }

    #[test]
    fn test_classify_text_preserves_order_and_drops_blanks() {
        let lines = classify_text("■ 主訴\r\n\n- 腹痛\n\n発症は昨日\n", &MarkupConventions::default());
        let kinds: Vec<LineKind> = lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![LineKind::Heading, LineKind::Bullet, LineKind::Body]
        );
        assert_eq!(lines[0].content, "主訴");
    }

    #[test]
    fn test_transform_text_applies_inline() {
        let lines = transform_text("- **腹痛**が強い", &MarkupConventions::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].kind, LineKind::Bullet);
        assert_eq!(lines[0].text.bold_count(), 1);
        assert_eq!(lines[0].text.plain_text(), "腹痛が強い");
    }

    #[test]
    fn test_transform_text_drops_lines_without_text() {
        let lines = transform_text("■\n#\n****\n■ 主訴\n- 腹痛", &MarkupConventions::default());
        let kinds: Vec<LineKind> = lines.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![LineKind::Heading, LineKind::Bullet]);
        assert!(lines.iter().all(|l| !l.text.is_empty()));
    }
}
