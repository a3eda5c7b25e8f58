//! Assembles layout blocks from transformed lines.

use crate::font::FontResolution;
use crate::geometry::GeometryProfile;
use crate::markup::{LineKind, TransformedLine};

use super::{DocumentLayout, LayoutBlock};

/// Title used when none is configured.
pub const DEFAULT_TITLE: &str = "医師提示用サマリー";

/// Space after the title, in points.
pub const TITLE_GAP: f32 = 12.0;

/// Space before every heading, in points.
pub const HEADING_GAP: f32 = 6.0;

/// Space after every content block, in points.
pub const BLOCK_GAP: f32 = 4.0;

/// Builds the ordered block list for one document.
#[derive(Debug, Clone)]
pub struct LayoutBuilder {
    title: String,
}

impl LayoutBuilder {
    /// Create a builder with the default title.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Build the layout set in the resolved font. Block order follows line
    /// order exactly.
    pub fn build(
        &self,
        geometry: GeometryProfile,
        fonts: &FontResolution,
        lines: &[TransformedLine],
    ) -> DocumentLayout {
        let mut blocks = Vec::with_capacity(2 + lines.len() * 3);

        blocks.push(LayoutBlock::Title {
            text: self.title.clone(),
        });
        blocks.push(LayoutBlock::Spacer { height: TITLE_GAP });

        for line in lines {
            let text = line.text.clone();
            match line.kind {
                LineKind::Heading => {
                    blocks.push(LayoutBlock::Spacer {
                        height: HEADING_GAP,
                    });
                    blocks.push(LayoutBlock::Heading {
                        text,
                        font_size: geometry.heading_font_size(),
                    });
                }
                LineKind::Bullet => blocks.push(LayoutBlock::Bullet { text }),
                LineKind::Body => blocks.push(LayoutBlock::Body { text }),
            }
            blocks.push(LayoutBlock::Spacer { height: BLOCK_GAP });
        }

        DocumentLayout {
            geometry,
            font_name: fonts.font_name().to_string(),
            blocks,
        }
    }
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }
}
