//! Line wrapping and pagination.
//!
//! Latin text breaks at whitespace; CJK text may break between any two
//! characters. A word wider than the frame is split by character.

use std::mem;

use crate::font::TextShaper;
use crate::geometry::GeometryProfile;
use crate::layout::{Alignment, BlockStyle};
use crate::markup::InlineSpan;

/// Tolerance for floating point width comparisons, in points.
const WIDTH_EPSILON: f32 = 0.01;

/// A run of same-weight text on one line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Fragment {
    pub text: String,
    pub bold: bool,
    pub width: f32,
}

/// One wrapped line, before placement.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Line {
    pub fragments: Vec<Fragment>,
    pub width: f32,
}

impl Line {
    fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    fn push(&mut self, glyph: &Glyph) {
        match self.fragments.last_mut() {
            Some(last) if last.bold == glyph.bold => {
                last.text.push(glyph.ch);
                last.width += glyph.width;
            }
            _ => self.fragments.push(Fragment {
                text: glyph.ch.to_string(),
                bold: glyph.bold,
                width: glyph.width,
            }),
        }
        self.width += glyph.width;
    }

    /// Plain text of the line.
    #[cfg(test)]
    pub fn text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct Glyph {
    ch: char,
    bold: bool,
    width: f32,
}

#[derive(Debug)]
enum Token {
    Space(Glyph),
    Word(Vec<Glyph>),
}

/// Characters that allow a line break on either side.
fn breaks_anywhere(ch: char) -> bool {
    matches!(ch as u32,
        0x2E80..=0x9FFF      // CJK radicals, punctuation, kana, unified ideographs
        | 0x25A0..=0x25FF    // geometric shapes (■ ◆)
        | 0xAC00..=0xD7AF    // Hangul syllables
        | 0xF900..=0xFAFF    // CJK compatibility ideographs
        | 0xFF00..=0xFFEF    // half/full-width forms
        | 0x20000..=0x2FFFF) // CJK extensions
}

fn tokenize(spans: &[InlineSpan], style: &BlockStyle, shaper: &TextShaper<'_>) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word: Vec<Glyph> = Vec::new();

    for span in spans {
        let bold = style.bold || span.is_bold();
        for ch in span.text().chars() {
            let ch = if ch == '\t' { ' ' } else { ch };
            let glyph = Glyph {
                ch,
                bold,
                width: shaper.advance(ch, style.font_size, bold),
            };
            if ch.is_whitespace() {
                if !word.is_empty() {
                    tokens.push(Token::Word(mem::take(&mut word)));
                }
                tokens.push(Token::Space(Glyph { ch: ' ', ..glyph }));
            } else if breaks_anywhere(ch) {
                if !word.is_empty() {
                    tokens.push(Token::Word(mem::take(&mut word)));
                }
                tokens.push(Token::Word(vec![glyph]));
            } else {
                word.push(glyph);
            }
        }
    }
    if !word.is_empty() {
        tokens.push(Token::Word(word));
    }
    tokens
}

/// Wrap spans to `max_width`.
pub(crate) fn wrap(
    spans: &[InlineSpan],
    style: &BlockStyle,
    max_width: f32,
    shaper: &TextShaper<'_>,
) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut line = Line::default();
    let mut pending_space: Option<Glyph> = None;

    for token in tokenize(spans, style, shaper) {
        match token {
            Token::Space(glyph) => {
                if !line.is_empty() {
                    pending_space = Some(glyph);
                }
            }
            Token::Word(glyphs) => {
                let word_width: f32 = glyphs.iter().map(|g| g.width).sum();
                let space = pending_space.take();
                let space_width = space.map_or(0.0, |g| g.width);

                if !line.is_empty() && line.width + space_width + word_width > max_width + WIDTH_EPSILON {
                    lines.push(mem::take(&mut line));
                } else if let Some(space) = space {
                    line.push(&space);
                }

                if word_width > max_width + WIDTH_EPSILON {
                    for glyph in &glyphs {
                        if !line.is_empty() && line.width + glyph.width > max_width + WIDTH_EPSILON {
                            lines.push(mem::take(&mut line));
                        }
                        line.push(glyph);
                    }
                } else {
                    for glyph in &glyphs {
                        line.push(glyph);
                    }
                }
            }
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// A line positioned on a page. Coordinates are PDF user space (origin bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlacedLine {
    pub x: f32,
    pub baseline: f32,
    pub font_size: f32,
    pub fragments: Vec<Fragment>,
}

/// Lines of one page, top to bottom.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PageContent {
    pub lines: Vec<PlacedLine>,
}

/// Stacks lines top-down and starts a new page when the frame is full.
pub(crate) struct Paginator<'g> {
    geometry: &'g GeometryProfile,
    pages: Vec<PageContent>,
    current: PageContent,
    cursor: f32,
}

impl<'g> Paginator<'g> {
    pub fn new(geometry: &'g GeometryProfile) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            current: PageContent::default(),
            cursor: geometry.page_height - geometry.margin,
        }
    }

    fn bottom(&self) -> f32 {
        self.geometry.margin
    }

    fn new_page(&mut self) {
        self.pages.push(mem::take(&mut self.current));
        self.cursor = self.geometry.page_height - self.geometry.margin;
    }

    /// Vertical space; a spacer that does not fit ends the page and is dropped.
    pub fn add_spacer(&mut self, height: f32) {
        if self.cursor - height < self.bottom() {
            if !self.current.lines.is_empty() {
                self.new_page();
            }
        } else {
            self.cursor -= height;
        }
    }

    pub fn add_line(&mut self, line: Line, style: &BlockStyle) {
        if self.cursor - style.leading < self.bottom() && !self.current.lines.is_empty() {
            self.new_page();
        }

        let x = match style.alignment {
            Alignment::Left => self.geometry.margin,
            Alignment::Center => {
                let free = (self.geometry.content_width() - line.width).max(0.0);
                self.geometry.margin + free / 2.0
            }
        };
        // Center the glyph box inside the leading.
        let baseline = self.cursor - style.font_size - (style.leading - style.font_size) / 2.0;

        self.current.lines.push(PlacedLine {
            x,
            baseline,
            font_size: style.font_size,
            fragments: line.fragments,
        });
        self.cursor -= style.leading;
    }

    /// Finish; always yields at least one page.
    pub fn finish(mut self) -> Vec<PageContent> {
        if !self.current.lines.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontResolution;
    use crate::geometry::resolve;

    fn style(size: f32) -> BlockStyle {
        BlockStyle {
            font_size: size,
            leading: size * 1.2,
            alignment: Alignment::Left,
            bold: false,
        }
    }

    fn plain(text: &str) -> Vec<InlineSpan> {
        vec![InlineSpan::Plain(text.to_string())]
    }

    #[test]
    fn test_short_text_single_line() {
        let fonts = FontResolution::builtin();
        let shaper = TextShaper::new(&fonts).unwrap();
        let lines = wrap(&plain("hello world"), &style(10.0), 500.0, &shaper);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "hello world");
    }

    #[test]
    fn test_wraps_at_spaces_without_edge_spaces() {
        let fonts = FontResolution::builtin();
        let shaper = TextShaper::new(&fonts).unwrap();
        // "aaaa" at 10pt = 22.24pt wide
        let lines = wrap(&plain("aaaa  aaaa aaaa"), &style(10.0), 50.0, &shaper);
        let texts: Vec<String> = lines.iter().map(Line::text).collect();
        assert_eq!(texts, vec!["aaaa aaaa", "aaaa"]);
        for line in &lines {
            assert!(line.width <= 50.0 + WIDTH_EPSILON);
        }
    }

    #[test]
    fn test_cjk_breaks_between_characters() {
        let fonts = FontResolution::builtin();
        let shaper = TextShaper::new(&fonts).unwrap();
        // Each unmapped glyph is measured as '?' (556 units): 5.56pt at 10pt.
        let lines = wrap(&plain("発症は昨日から"), &style(10.0), 12.0, &shaper);
        assert!(lines.len() > 1);
        let joined: String = lines.iter().map(Line::text).collect();
        assert_eq!(joined, "発症は昨日から");
    }

    #[test]
    fn test_overlong_word_is_split() {
        let fonts = FontResolution::builtin();
        let shaper = TextShaper::new(&fonts).unwrap();
        let word = "x".repeat(40);
        let lines = wrap(&plain(&word), &style(10.0), 50.0, &shaper);
        assert!(lines.len() > 1);
        assert_eq!(lines.iter().map(Line::text).collect::<String>(), word);
    }

    #[test]
    fn test_bold_fragments_are_kept() {
        let fonts = FontResolution::builtin();
        let shaper = TextShaper::new(&fonts).unwrap();
        let spans = vec![
            InlineSpan::Bold("38.5".to_string()),
            InlineSpan::Plain(" fever".to_string()),
        ];
        let lines = wrap(&spans, &style(10.0), 500.0, &shaper);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].fragments.len(), 2);
        assert!(lines[0].fragments[0].bold);
        assert!(!lines[0].fragments[1].bold);
    }

    #[test]
    fn test_whitespace_only_yields_no_lines() {
        let fonts = FontResolution::builtin();
        let shaper = TextShaper::new(&fonts).unwrap();
        assert!(wrap(&plain("   "), &style(10.0), 100.0, &shaper).is_empty());
    }

    // ==================== Pagination ====================

    #[test]
    fn test_paginator_empty_yields_one_page() {
        let geometry = resolve("A4");
        let pages = Paginator::new(&geometry).finish();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].lines.is_empty());
    }

    #[test]
    fn test_paginator_breaks_pages() {
        let geometry = resolve("A4");
        let mut paginator = Paginator::new(&geometry);
        let st = style(11.0);
        let per_page = (geometry.content_height() / st.leading).floor() as usize;

        for _ in 0..per_page + 1 {
            let line = Line {
                fragments: vec![Fragment {
                    text: "x".into(),
                    bold: false,
                    width: 5.0,
                }],
                width: 5.0,
            };
            paginator.add_line(line, &st);
        }
        let pages = paginator.finish();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].lines.len(), per_page);
        assert_eq!(pages[1].lines.len(), 1);
        for line in &pages[0].lines {
            assert!(line.baseline >= geometry.margin);
        }
    }

    #[test]
    fn test_centered_line() {
        let geometry = resolve("A4");
        let mut paginator = Paginator::new(&geometry);
        let mut st = style(18.0);
        st.alignment = Alignment::Center;
        let line = Line {
            fragments: vec![Fragment {
                text: "T".into(),
                bold: true,
                width: 100.0,
            }],
            width: 100.0,
        };
        paginator.add_line(line, &st);
        let pages = paginator.finish();
        let x = pages[0].lines[0].x;
        assert!((x - (geometry.page_width - 100.0) / 2.0).abs() < 0.01);
    }
}
