//! Rendered documents with metadata and statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::geometry::PageSize;
use crate::layout::{DocumentLayout, LayoutBlock};

/// Media type of every rendered document.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Filename stem suggested to the downloader.
pub const DEFAULT_FILENAME_STEM: &str = "medical_summary";

/// A finished document, ready to hand to the caller.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// The encoded PDF
    pub bytes: Vec<u8>,

    /// Declared media type
    pub content_type: &'static str,

    /// Suggested download filename
    pub filename: String,

    /// Rendering statistics
    pub stats: RenderStats,
}

impl RenderedDocument {
    /// Create a document with the default filename.
    pub fn new(bytes: Vec<u8>, stats: RenderStats) -> Self {
        Self {
            bytes,
            content_type: PDF_CONTENT_TYPE,
            filename: filename_for(DEFAULT_FILENAME_STEM, None),
            stats,
        }
    }

    /// Replace the filename stem (`.pdf` is appended).
    pub fn with_filename_stem(mut self, stem: &str) -> Self {
        self.filename = filename_for(stem, None);
        self
    }

    /// Suffix the filename with a date, as used for saved records.
    pub fn dated_filename(&self, date: NaiveDate) -> String {
        let stem = self.filename.strip_suffix(".pdf").unwrap_or(&self.filename);
        filename_for(stem, Some(date))
    }

    /// Size of the document in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the document has no bytes (never true for a rendered document).
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn filename_for(stem: &str, date: Option<NaiveDate>) -> String {
    let stem = if stem.trim().is_empty() {
        DEFAULT_FILENAME_STEM
    } else {
        stem.trim()
    };
    match date {
        Some(date) => format!("{}_{}.pdf", stem, date.format("%Y-%m-%d")),
        None => format!("{}.pdf", stem),
    }
}

/// Statistics collected while rendering one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Output size class
    pub page_size: PageSize,

    /// Pages written
    pub page_count: usize,

    /// Layout blocks, spacers included
    pub block_count: usize,

    /// Heading blocks
    pub heading_count: usize,

    /// Bullet blocks
    pub bullet_count: usize,

    /// Body paragraphs
    pub body_count: usize,

    /// Bold spans across all blocks
    pub bold_span_count: usize,

    /// Wrapped text lines drawn
    pub line_count: usize,

    /// Characters drawn with a substitute glyph
    pub substituted_glyphs: usize,

    /// Active font name
    pub font_name: String,
}

impl RenderStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the blocks of a layout.
    pub fn from_layout(layout: &DocumentLayout) -> Self {
        let mut stats = Self {
            page_size: layout.geometry.size,
            block_count: layout.block_count(),
            font_name: layout.font_name.clone(),
            ..Self::default()
        };

        for block in &layout.blocks {
            match block {
                LayoutBlock::Heading { text, .. } => {
                    stats.heading_count += 1;
                    stats.bold_span_count += text.bold_count();
                }
                LayoutBlock::Bullet { text } => {
                    stats.bullet_count += 1;
                    stats.bold_span_count += text.bold_count();
                }
                LayoutBlock::Body { text } => {
                    stats.body_count += 1;
                    stats.bold_span_count += text.bold_count();
                }
                LayoutBlock::Title { .. } | LayoutBlock::Spacer { .. } => {}
            }
        }
        stats
    }

    /// Merge another stats instance into this one (used for batch totals).
    pub fn merge(&mut self, other: &RenderStats) {
        self.page_count += other.page_count;
        self.block_count += other.block_count;
        self.heading_count += other.heading_count;
        self.bullet_count += other.bullet_count;
        self.body_count += other.body_count;
        self.bold_span_count += other.bold_span_count;
        self.line_count += other.line_count;
        self.substituted_glyphs += other.substituted_glyphs;
    }
}
