//! PDF encoding of a [`DocumentLayout`].
//!
//! The encoder wraps every text block to the content width, stacks lines
//! top-down between the margins, and starts new pages as needed. Output is
//! deterministic for a fixed creation date.

mod flow;
mod writer;

pub use writer::PDF_VERSION;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::font::{FontResolution, TextShaper};
use crate::layout::{DocumentLayout, LayoutBlock};

use flow::Paginator;
use writer::DocumentInfo;

/// Result of encoding one layout.
#[derive(Debug, Clone)]
pub struct EncodedDocument {
    /// The complete PDF file
    pub bytes: Vec<u8>,
    /// Number of pages written
    pub page_count: usize,
    /// Number of text lines drawn
    pub line_count: usize,
    /// Characters drawn with a substitute glyph
    pub substituted_glyphs: usize,
}

/// Encodes layouts with one resolved font.
#[derive(Debug, Clone, Copy)]
pub struct PdfEncoder<'f> {
    fonts: &'f FontResolution,
}

impl<'f> PdfEncoder<'f> {
    /// Create an encoder using the given font resolution.
    pub fn new(fonts: &'f FontResolution) -> Self {
        Self { fonts }
    }

    /// Encode a layout. `creation_date` defaults to now.
    pub fn encode(
        &self,
        layout: &DocumentLayout,
        creation_date: Option<DateTime<Utc>>,
    ) -> Result<EncodedDocument> {
        self.encode_inner(layout, creation_date).map_err(|e| {
            log::error!("PDF generation failed: {}", e);
            match e {
                Error::Encode { .. } => e,
                other => Error::encode(other),
            }
        })
    }

    fn encode_inner(
        &self,
        layout: &DocumentLayout,
        creation_date: Option<DateTime<Utc>>,
    ) -> Result<EncodedDocument> {
        let geometry = &layout.geometry;
        if layout.font_name != self.fonts.font_name() {
            log::warn!(
                "Layout was built for {} but is encoded with {}",
                layout.font_name,
                self.fonts.font_name()
            );
        }
        let mut shaper = TextShaper::new(self.fonts)?;
        let mut paginator = Paginator::new(geometry);
        let mut line_count = 0;

        for block in &layout.blocks {
            match (block, block.style(geometry)) {
                (LayoutBlock::Spacer { height }, _) => paginator.add_spacer(*height),
                (_, Some(style)) => {
                    let spans = block.display_spans();
                    for line in flow::wrap(&spans, &style, geometry.content_width(), &shaper) {
                        paginator.add_line(line, &style);
                        line_count += 1;
                    }
                }
                (_, None) => {}
            }
        }

        let pages = paginator.finish();
        let info = DocumentInfo {
            title: layout.title().unwrap_or_default(),
            creation_date: creation_date.unwrap_or_else(Utc::now),
        };
        let bytes = writer::write_document(&pages, geometry, &mut shaper, &info)?;

        let substituted_glyphs = shaper.substituted();
        if substituted_glyphs > 0 {
            log::debug!(
                "{} characters not covered by {} were substituted",
                substituted_glyphs,
                self.fonts.font_name()
            );
        }
        log::debug!(
            "Encoded {} pages, {} lines, {} bytes ({})",
            pages.len(),
            line_count,
            bytes.len(),
            geometry.size
        );

        Ok(EncodedDocument {
            bytes,
            page_count: pages.len(),
            line_count,
            substituted_glyphs,
        })
    }
}
