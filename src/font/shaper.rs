//! Per-document glyph measurement and string encoding.

use std::collections::BTreeMap;

use ttf_parser::{Face, GlyphId};

use super::builtin;
use super::{EmbeddedFont, FontResolution, FontSource};
use crate::error::Result;

/// A glyph used in the document: the character it renders and its width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UsedGlyph {
    pub ch: char,
    pub width: i32,
}

/// Measures and encodes text with the resolved font for one document.
///
/// Embedded fonts are addressed by glyph id (Identity-H), builtin fonts by
/// WinAnsi byte. Glyph usage is recorded so the writer can emit widths and
/// a ToUnicode map for exactly what was drawn.
pub(crate) enum TextShaper<'a> {
    Embedded {
        font: &'a EmbeddedFont,
        face: Face<'a>,
        used: BTreeMap<u16, UsedGlyph>,
        missing: usize,
    },
    Builtin {
        substituted: usize,
    },
}

impl<'a> TextShaper<'a> {
    pub fn new(resolution: &'a FontResolution) -> Result<Self> {
        Ok(match resolution.source() {
            FontSource::Embedded(font) => TextShaper::Embedded {
                font,
                face: font.face()?,
                used: BTreeMap::new(),
                missing: 0,
            },
            FontSource::Builtin => TextShaper::Builtin { substituted: 0 },
        })
    }

    /// Advance width of one character in points.
    pub fn advance(&self, ch: char, size: f32, bold: bool) -> f32 {
        match self {
            TextShaper::Embedded { font, face, .. } => {
                let upem = font.units_per_em().max(1);
                let gid = face.glyph_index(ch).unwrap_or(GlyphId(0));
                let advance = face.glyph_hor_advance(gid).unwrap_or(upem);
                f32::from(advance) * size / f32::from(upem)
            }
            TextShaper::Builtin { .. } => {
                let byte = builtin::winansi_byte(ch).unwrap_or(builtin::SUBSTITUTE);
                f32::from(builtin::width(byte, bold)) * size / 1000.0
            }
        }
    }

    /// Width of a string in points.
    #[cfg(test)]
    pub fn measure(&self, text: &str, size: f32, bold: bool) -> f32 {
        text.chars().map(|c| self.advance(c, size, bold)).sum()
    }

    /// Encode text for a `Tj` operand, recording glyph usage.
    pub fn encode(&mut self, text: &str) -> Vec<u8> {
        match self {
            TextShaper::Embedded {
                font,
                face,
                used,
                missing,
            } => {
                let mut bytes = Vec::with_capacity(text.len() * 2);
                for ch in text.chars() {
                    let gid = match face.glyph_index(ch) {
                        Some(gid) => gid,
                        None => {
                            *missing += 1;
                            GlyphId(0)
                        }
                    };
                    used.entry(gid.0).or_insert_with(|| {
                        let advance = face
                            .glyph_hor_advance(gid)
                            .unwrap_or(font.units_per_em());
                        UsedGlyph {
                            ch,
                            width: font.to_pdf_units(i32::from(advance)),
                        }
                    });
                    bytes.extend_from_slice(&gid.0.to_be_bytes());
                }
                bytes
            }
            TextShaper::Builtin { substituted } => text
                .chars()
                .map(|ch| {
                    builtin::winansi_byte(ch).unwrap_or_else(|| {
                        *substituted += 1;
                        builtin::SUBSTITUTE
                    })
                })
                .collect(),
        }
    }

    /// Font resource name for the given weight.
    pub fn resource_name(&self, bold: bool) -> &'static str {
        match self {
            TextShaper::Embedded { .. } => "F1",
            TextShaper::Builtin { .. } if bold => "F2",
            TextShaper::Builtin { .. } => "F1",
        }
    }

    /// Whether bold has to be synthesised (single embedded face).
    pub fn synthesizes_bold(&self) -> bool {
        matches!(self, TextShaper::Embedded { .. })
    }

    /// The embedded font and the glyphs drawn with it, if embedding.
    pub fn embedded_glyphs(&self) -> Option<(&'a EmbeddedFont, &BTreeMap<u16, UsedGlyph>)> {
        match self {
            TextShaper::Embedded { font, used, .. } => Some((*font, used)),
            TextShaper::Builtin { .. } => None,
        }
    }

    /// Characters drawn with a fallback glyph so far.
    pub fn substituted(&self) -> usize {
        match self {
            TextShaper::Embedded { missing, .. } => *missing,
            TextShaper::Builtin { substituted } => *substituted,
        }
    }
}
