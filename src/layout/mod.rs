//! Document layout: turns classified lines into an ordered block list.

mod block;
mod builder;

pub use block::{Alignment, BlockStyle, LayoutBlock, BULLET_GLYPH, SECTION_MARKER};
pub use builder::{LayoutBuilder, BLOCK_GAP, DEFAULT_TITLE, HEADING_GAP, TITLE_GAP};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::GeometryProfile;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// A complete layout: geometry plus blocks in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    /// Page geometry
    pub geometry: GeometryProfile,
    /// Font every text block is set in
    pub font_name: String,
    /// Blocks, title first
    pub blocks: Vec<LayoutBlock>,
}

impl DocumentLayout {
    /// Blocks that carry text (everything except spacers).
    pub fn content_blocks(&self) -> impl Iterator<Item = &LayoutBlock> {
        self.blocks.iter().filter(|b| !b.is_spacer())
    }

    /// The title text.
    pub fn title(&self) -> Option<&str> {
        match self.blocks.first() {
            Some(LayoutBlock::Title { text }) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Total number of blocks, spacers included.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Serialize the layout.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        let result = match format {
            JsonFormat::Pretty => serde_json::to_string_pretty(self),
            JsonFormat::Compact => serde_json::to_string(self),
        };

        result.map_err(|e| Error::Other(format!("JSON serialization error: {}", e)))
    }

    /// One markup line per block.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            out.push_str(&block.to_markup());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontResolution;
    use crate::geometry::resolve;
    use crate::markup::{transform_text, MarkupConventions};

    fn sample() -> DocumentLayout {
        let lines = transform_text("■ 主訴\n- **腹痛**", &MarkupConventions::default());
        LayoutBuilder::new().build(resolve("A4"), &FontResolution::builtin(), &lines)
    }

    #[test]
    fn test_to_json_pretty() {
        let json = sample().to_json(JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"heading\""));
        assert!(json.contains("主訴"));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = sample().to_json(JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"bold\""));
    }

    #[test]
    fn test_json_round_trip() {
        let layout = sample();
        let json = layout.to_json(JsonFormat::Compact).unwrap();
        let back: DocumentLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layout);
    }

    #[test]
    fn test_to_markup() {
        let markup = sample().to_markup();
        assert!(markup.starts_with("<title>"));
        assert!(markup.contains("<bullet>• <b>腹痛</b></bullet>"));
    }
}
