//! Layout block types.

use serde::{Deserialize, Serialize};

use crate::geometry::{GeometryProfile, LEADING_RATIO};
use crate::markup::{escape_markup, InlineSpan, RichText};

/// Glyph shown before every heading.
pub const SECTION_MARKER: &str = "■ ";

/// Glyph shown before every bullet item.
pub const BULLET_GLYPH: &str = "• ";

/// Horizontal alignment of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Flush left
    #[default]
    Left,
    /// Centered in the frame
    Center,
}

/// Typesetting parameters the encoder needs for one text block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStyle {
    /// Font size in points
    pub font_size: f32,
    /// Baseline-to-baseline distance in points
    pub leading: f32,
    /// Horizontal alignment
    pub alignment: Alignment,
    /// Render every span bold
    pub bold: bool,
}

impl BlockStyle {
    fn new(font_size: f32, alignment: Alignment, bold: bool) -> Self {
        Self {
            font_size,
            leading: font_size * LEADING_RATIO,
            alignment,
            bold,
        }
    }
}

/// One structural unit ready for encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum LayoutBlock {
    /// Document title
    Title {
        /// Title text
        text: String,
    },
    /// Vertical space
    Spacer {
        /// Height in points
        height: f32,
    },
    /// Section heading, prefix already removed
    Heading {
        /// Heading text
        text: RichText,
        /// Font size in points
        font_size: f32,
    },
    /// Bulleted item, prefix already removed
    Bullet {
        /// Item text
        text: RichText,
    },
    /// Body paragraph
    Body {
        /// Paragraph text
        text: RichText,
    },
}

impl LayoutBlock {
    /// Whether this is a spacer.
    pub fn is_spacer(&self) -> bool {
        matches!(self, LayoutBlock::Spacer { .. })
    }

    /// Text style for text blocks; `None` for spacers.
    pub fn style(&self, geometry: &GeometryProfile) -> Option<BlockStyle> {
        match self {
            LayoutBlock::Title { .. } => Some(BlockStyle::new(
                geometry.title_font_size,
                Alignment::Center,
                true,
            )),
            LayoutBlock::Spacer { .. } => None,
            LayoutBlock::Heading { font_size, .. } => {
                Some(BlockStyle::new(*font_size, Alignment::Left, true))
            }
            LayoutBlock::Bullet { .. } | LayoutBlock::Body { .. } => Some(BlockStyle::new(
                geometry.base_font_size,
                Alignment::Left,
                false,
            )),
        }
    }

    /// Spans as displayed, including the canonical heading/bullet glyph.
    pub fn display_spans(&self) -> Vec<InlineSpan> {
        let mut spans = Vec::new();
        match self {
            LayoutBlock::Title { text } => spans.push(InlineSpan::Bold(text.clone())),
            LayoutBlock::Spacer { .. } => {}
            LayoutBlock::Heading { text, .. } => {
                spans.push(InlineSpan::Plain(SECTION_MARKER.to_string()));
                spans.extend(text.spans().iter().cloned());
            }
            LayoutBlock::Bullet { text } => {
                spans.push(InlineSpan::Plain(BULLET_GLYPH.to_string()));
                spans.extend(text.spans().iter().cloned());
            }
            LayoutBlock::Body { text } => spans.extend(text.spans().iter().cloned()),
        }
        spans
    }

    /// Plain text as displayed.
    pub fn display_text(&self) -> String {
        self.display_spans().iter().map(InlineSpan::text).collect()
    }

    /// The renderer rich-text markup for this block.
    pub fn to_markup(&self) -> String {
        match self {
            LayoutBlock::Title { text } => format!("<title>{}</title>", escape_markup(text)),
            LayoutBlock::Spacer { height } => format!("<spacer height=\"{:.1}\"/>", height),
            LayoutBlock::Heading { text, font_size } => format!(
                "<heading size=\"{:.1}\"><b>{}{}</b></heading>",
                font_size,
                escape_markup(SECTION_MARKER),
                text.to_markup()
            ),
            LayoutBlock::Bullet { text } => format!(
                "<bullet>{}{}</bullet>",
                escape_markup(BULLET_GLYPH),
                text.to_markup()
            ),
            LayoutBlock::Body { text } => format!("<para>{}</para>", text.to_markup()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::resolve;

    #[test]
    fn test_heading_display_has_section_marker() {
        let block = LayoutBlock::Heading {
            text: RichText::plain("主訴"),
            font_size: 13.0,
        };
        assert_eq!(block.display_text(), "■ 主訴");
    }

    #[test]
    fn test_bullet_display_has_bullet_glyph() {
        let block = LayoutBlock::Bullet {
            text: RichText::plain("腹痛"),
        };
        assert_eq!(block.display_text(), "• 腹痛");
    }

    #[test]
    fn test_styles() {
        let a4 = resolve("A4");
        let title = LayoutBlock::Title {
            text: "T".into(),
        };
        let style = title.style(&a4).unwrap();
        assert_eq!(style.alignment, Alignment::Center);
        assert!(style.bold);
        assert_eq!(style.font_size, a4.title_font_size);

        let body = LayoutBlock::Body {
            text: RichText::plain("x"),
        };
        let style = body.style(&a4).unwrap();
        assert_eq!(style.font_size, a4.base_font_size);
        assert!((style.leading - a4.base_font_size * LEADING_RATIO).abs() < 1e-6);

        assert!(LayoutBlock::Spacer { height: 4.0 }.style(&a4).is_none());
    }

    #[test]
    fn test_markup_escapes_text() {
        let block = LayoutBlock::Body {
            text: RichText::plain("a<b"),
        };
        assert_eq!(block.to_markup(), "<para>a&lt;b</para>");
    }
}
