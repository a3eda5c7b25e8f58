//! # medsum
//!
//! Printable clinician summaries from generator text.
//!
//! The summarization service emits loosely structured text: `■` headings,
//! `- ` bullets and `**bold**` spans. This library classifies each line,
//! builds a layout for the requested paper size and encodes it as a
//! paginated PDF with an embedded Japanese-capable font.
//!
//! ## Quick Start
//!
//! ```no_run
//! use medsum::render_pdf;
//!
//! fn main() -> medsum::Result<()> {
//!     let doc = render_pdf("■ 主訴\n- **38.5度**の発熱", "A4")?;
//!     std::fs::write(&doc.filename, &doc.bytes)?;
//!     println!("{} pages", doc.stats.page_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Three paper sizes**: A4, B5 and 80 mm receipt rolls
//! - **Font fallback**: an embedded TrueType font when one is available,
//!   Helvetica otherwise; rendering never fails because of fonts
//! - **Deterministic output**: pin the creation date for identical bytes
//! - **Parallel batches**: independent documents render on the rayon pool

pub mod cleanup;
pub mod document;
pub mod encoder;
pub mod error;
pub mod font;
pub mod geometry;
pub mod inspect;
pub mod layout;
pub mod markup;
pub mod options;
pub mod payload;

// Re-export commonly used types
pub use cleanup::{CleanupOptions, CleanupPipeline, CleanupPreset};
pub use document::{RenderStats, RenderedDocument, PDF_CONTENT_TYPE};
pub use encoder::{EncodedDocument, PdfEncoder};
pub use error::{Error, Result};
pub use font::{EmbeddedFont, FontConfig, FontResolution, FontSource, FONT_PATH_ENV};
pub use geometry::{resolve, GeometryProfile, PageSize};
pub use inspect::{inspect_pdf, FontInfo, InspectReport};
pub use layout::{DocumentLayout, JsonFormat, LayoutBlock, LayoutBuilder};
pub use markup::{InlineSpan, LineKind, MarkupConventions, RichText};
pub use options::RenderOptions;
pub use payload::{SummaryPayload, SummaryRecord};

use std::borrow::Cow;
use std::sync::Arc;

use rayon::prelude::*;

/// Render text to a PDF with the process-wide font and default options.
///
/// Unknown size tokens render as A4.
///
/// # Example
///
/// ```no_run
/// let doc = medsum::render_pdf("■ 主訴\n腹痛", "Receipt").unwrap();
/// assert_eq!(doc.content_type, "application/pdf");
/// ```
pub fn render_pdf(text: &str, size: &str) -> Result<RenderedDocument> {
    SummaryRenderer::new().render(text, size)
}

/// Build the layout for text without encoding it.
///
/// # Example
///
/// ```
/// use medsum::{layout_text, LayoutBlock};
///
/// let layout = layout_text("■ 主訴\n- 腹痛", "B5");
/// assert!(matches!(layout.blocks[0], LayoutBlock::Title { .. }));
/// ```
pub fn layout_text(text: &str, size: &str) -> DocumentLayout {
    SummaryRenderer::with_fonts(Arc::new(FontResolution::builtin())).layout(text, size)
}

/// Parse a raw generator answer and render its summary.
pub fn render_payload(raw: &str, size: &str) -> Result<RenderedDocument> {
    let payload = SummaryPayload::parse(raw)?;
    SummaryRenderer::new().render_payload(&payload, size)
}

/// One document in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    /// Text to render
    pub text: String,
    /// Size token
    pub size: String,
}

impl RenderJob {
    /// Create a job.
    pub fn new(text: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: size.into(),
        }
    }
}

/// Renders summaries with one resolved font and one set of options.
///
/// The renderer holds no per-document state; share it freely between
/// threads.
///
/// # Example
///
/// ```no_run
/// use medsum::{FontConfig, RenderOptions, SummaryRenderer};
///
/// let renderer = SummaryRenderer::with_font_config(&FontConfig::from_env())
///     .with_options(RenderOptions::new().with_title("Medical Summary"));
/// let doc = renderer.render("■ Chief complaint\n- headache", "B5")?;
/// # Ok::<(), medsum::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SummaryRenderer {
    fonts: Arc<FontResolution>,
    options: RenderOptions,
    cleanup: Option<CleanupPipeline>,
}

impl SummaryRenderer {
    /// Create a renderer using the process-wide font resolution.
    pub fn new() -> Self {
        Self::with_fonts(FontResolution::global())
    }

    /// Create a renderer using the given font resolution.
    pub fn with_fonts(fonts: Arc<FontResolution>) -> Self {
        let options = RenderOptions::default();
        Self {
            fonts,
            cleanup: options.cleanup.clone().map(CleanupPipeline::new),
            options,
        }
    }

    /// Resolve fonts from a config and create a renderer.
    pub fn with_font_config(config: &FontConfig) -> Self {
        Self::with_fonts(Arc::new(FontResolution::resolve(config)))
    }

    /// Set rendering options.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.cleanup = options.cleanup.clone().map(CleanupPipeline::new);
        self.options = options;
        self
    }

    /// The active options.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// The active font resolution.
    pub fn fonts(&self) -> &FontResolution {
        &self.fonts
    }

    fn prepare<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.cleanup {
            Some(pipeline) => Cow::Owned(pipeline.process(text)),
            None => Cow::Borrowed(text),
        }
    }

    /// Classify and lay out text for the given size token.
    pub fn layout(&self, text: &str, size: &str) -> DocumentLayout {
        let text = self.prepare(text);
        let lines = markup::transform_text(&text, &self.options.conventions);
        LayoutBuilder::new()
            .with_title(self.options.title.as_str())
            .build(geometry::resolve(size), &self.fonts, &lines)
    }

    /// Render text to a PDF.
    pub fn render(&self, text: &str, size: &str) -> Result<RenderedDocument> {
        let layout = self.layout(text, size);
        self.render_layout(&layout)
    }

    /// Encode an already built layout.
    pub fn render_layout(&self, layout: &DocumentLayout) -> Result<RenderedDocument> {
        let encoded = PdfEncoder::new(&self.fonts).encode(layout, self.options.creation_date)?;

        let mut stats = RenderStats::from_layout(layout);
        stats.page_count = encoded.page_count;
        stats.line_count = encoded.line_count;
        stats.substituted_glyphs = encoded.substituted_glyphs;

        log::info!(
            "Rendered {} ({} pages, {} blocks, font {})",
            layout.geometry.size,
            stats.page_count,
            stats.block_count,
            stats.font_name
        );

        Ok(RenderedDocument::new(encoded.bytes, stats).with_filename_stem(&self.options.filename_stem))
    }

    /// Render a generator payload, adding the explanation when enabled.
    pub fn render_payload(&self, payload: &SummaryPayload, size: &str) -> Result<RenderedDocument> {
        let text = payload.to_document_text(self.options.include_explanation);
        self.render(&text, size)
    }

    /// Render a stored record.
    pub fn render_record(&self, record: &SummaryRecord, size: &str) -> Result<RenderedDocument> {
        self.render(&record.to_document_text(), size)
    }

    /// Render independent jobs in parallel. Results keep the input order.
    pub fn render_batch(&self, jobs: &[RenderJob]) -> Vec<Result<RenderedDocument>> {
        jobs.par_iter()
            .map(|job| self.render(&job.text, &job.size))
            .collect()
    }
}

impl Default for SummaryRenderer {
    fn default() -> Self {
        Self::new()
    }
}
