//! Minimal markup understood by the renderer.
//!
//! Only what the summary generator is instructed to emit is supported:
//! `**bold**` spans, heading prefixes and bullet prefixes. This is not a
//! Markdown parser.

mod classify;
mod inline;

pub use classify::{
    classify_line, classify_text, transform_text, ClassifiedLine, LineKind, MarkupConventions,
    TransformedLine,
};
pub use inline::{escape_markup, parse_inline, InlineSpan, RichText, BOLD_MARKER};
