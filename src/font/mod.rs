//! Font resolution.
//!
//! One font is resolved per process: the first configured TrueType file that
//! can be embedded and covers the probe text wins. When none qualifies the
//! builtin Helvetica family is used instead; resolution itself never fails.
//! The result is immutable and shared between concurrent renders.

mod builtin;
mod shaper;

pub(crate) use builtin::{BOLD as BUILTIN_BOLD, REGULAR as BUILTIN_REGULAR};
pub(crate) use shaper::{TextShaper, UsedGlyph};

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use ttf_parser::Face;

use crate::error::{Error, Result};

/// Environment variable naming the preferred font file.
pub const FONT_PATH_ENV: &str = "MEDSUM_FONT_PATH";

/// Characters a candidate font must map to be accepted.
pub const DEFAULT_PROBE_TEXT: &str = "主訴発熱診察";

const DEFAULT_CANDIDATES: &[&str] = &[
    "fonts/ipaexg.ttf",
    "/usr/share/fonts/opentype/ipaexfont-gothic/ipaexg.ttf",
    "/usr/share/fonts/truetype/fonts-japanese-gothic.ttf",
    "/usr/share/fonts/truetype/takao-gothic/TakaoPGothic.ttf",
    "/Library/Fonts/ipaexg.ttf",
];

/// Where to look for an embeddable font.
#[derive(Debug, Clone)]
pub struct FontConfig {
    /// Candidate font files, tried in order
    pub candidates: Vec<PathBuf>,

    /// Text whose characters the font must cover
    pub probe_text: String,
}

impl FontConfig {
    /// Create a config with the default candidate list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config with no candidates (always resolves to the builtin font).
    pub fn empty() -> Self {
        Self {
            candidates: Vec::new(),
            probe_text: DEFAULT_PROBE_TEXT.to_string(),
        }
    }

    /// Default config with the path from `MEDSUM_FONT_PATH` tried first.
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var_os(FONT_PATH_ENV) {
            Some(path) if !path.is_empty() => config.with_primary(path),
            _ => config,
        }
    }

    /// Try this font before every other candidate.
    pub fn with_primary(mut self, path: impl Into<PathBuf>) -> Self {
        self.candidates.insert(0, path.into());
        self
    }

    /// Append a candidate font.
    pub fn with_candidate(mut self, path: impl Into<PathBuf>) -> Self {
        self.candidates.push(path.into());
        self
    }

    /// Set the probe text used to check script coverage.
    pub fn with_probe_text(mut self, text: impl Into<String>) -> Self {
        self.probe_text = text.into();
        self
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES.iter().map(PathBuf::from).collect(),
            probe_text: DEFAULT_PROBE_TEXT.to_string(),
        }
    }
}

/// A TrueType font accepted for embedding.
#[derive(Debug, Clone)]
pub struct EmbeddedFont {
    name: String,
    data: Arc<[u8]>,
    origin: Option<PathBuf>,
    units_per_em: u16,
    ascent: i16,
    descent: i16,
    cap_height: i16,
    bbox: [i16; 4],
}

impl EmbeddedFont {
    /// Validate font data for embedding and script coverage.
    pub fn load(data: impl Into<Arc<[u8]>>, origin: Option<PathBuf>, probe_text: &str) -> Result<Self> {
        let data: Arc<[u8]> = data.into();

        if ttf_parser::fonts_in_collection(&data).is_some() {
            return Err(Error::Font("font collections cannot be embedded".into()));
        }

        let face = Face::parse(&data, 0).map_err(|e| Error::Font(e.to_string()))?;

        if face.tables().glyf.is_none() {
            return Err(Error::Font("no TrueType outlines (glyf table)".into()));
        }

        let missing: String = probe_text
            .chars()
            .filter(|c| !c.is_whitespace() && face.glyph_index(*c).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::Font(format!("no glyphs for {:?}", missing)));
        }

        let name = postscript_name(&face)
            .or_else(|| {
                origin
                    .as_deref()
                    .and_then(Path::file_stem)
                    .map(|s| sanitize_font_name(&s.to_string_lossy()))
            })
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "EmbeddedFont".to_string());

        let bb = face.global_bounding_box();
        let font = Self {
            name,
            units_per_em: face.units_per_em(),
            ascent: face.ascender(),
            descent: face.descender(),
            cap_height: face.capital_height().unwrap_or(face.ascender()),
            bbox: [bb.x_min, bb.y_min, bb.x_max, bb.y_max],
            origin,
            data: Arc::clone(&data),
        };
        Ok(font)
    }

    /// Load and validate a font file.
    pub fn open(path: &Path, probe_text: &str) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::load(data, Some(path.to_path_buf()), probe_text)
    }

    /// PostScript name used as `BaseFont`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw font file bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// File the font was loaded from, if any.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Parse the face. Cannot fail for data that passed [`EmbeddedFont::load`].
    pub(crate) fn face(&self) -> Result<Face<'_>> {
        Face::parse(&self.data, 0).map_err(|e| Error::Font(e.to_string()))
    }

    /// Scale a font-unit value to the PDF 1000-unit glyph space.
    pub(crate) fn to_pdf_units(&self, value: i32) -> i32 {
        let upem = i32::from(self.units_per_em.max(1));
        (value * 1000 + upem / 2).div_euclid(upem)
    }

    pub(crate) fn ascent(&self) -> i32 {
        self.to_pdf_units(i32::from(self.ascent))
    }

    pub(crate) fn descent(&self) -> i32 {
        self.to_pdf_units(i32::from(self.descent))
    }

    pub(crate) fn cap_height(&self) -> i32 {
        self.to_pdf_units(i32::from(self.cap_height))
    }

    pub(crate) fn bbox(&self) -> [i32; 4] {
        self.bbox.map(|v| self.to_pdf_units(i32::from(v)))
    }

    pub(crate) fn units_per_em(&self) -> u16 {
        self.units_per_em
    }
}

/// The font that text is rendered with.
#[derive(Debug, Clone)]
pub enum FontSource {
    /// A TrueType font embedded into every document
    Embedded(EmbeddedFont),
    /// The viewer-provided Helvetica family (not embedded)
    Builtin,
}

/// Outcome of font resolution, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct FontResolution {
    source: FontSource,
    fallback_reason: Option<String>,
}

static GLOBAL: OnceLock<Arc<FontResolution>> = OnceLock::new();

impl FontResolution {
    /// Resolve from the configured candidates, falling back to Helvetica.
    pub fn resolve(config: &FontConfig) -> Self {
        let mut failures = Vec::new();

        for path in &config.candidates {
            if !path.is_file() {
                log::debug!("Font candidate {} not found", path.display());
                continue;
            }
            match EmbeddedFont::open(path, &config.probe_text) {
                Ok(font) => {
                    log::info!("Using font {} from {}", font.name(), path.display());
                    return Self::embedded(font);
                }
                Err(e) => {
                    log::debug!("Font candidate {} rejected: {}", path.display(), e);
                    failures.push(format!("{}: {}", path.display(), e));
                }
            }
        }

        let reason = if failures.is_empty() {
            "no font candidate found".to_string()
        } else {
            failures.join("; ")
        };
        Self::fallback(reason)
    }

    /// Resolve from in-memory font data, falling back to Helvetica.
    pub fn from_bytes(data: Vec<u8>, probe_text: &str) -> Self {
        match EmbeddedFont::load(data, None, probe_text) {
            Ok(font) => Self::embedded(font),
            Err(e) => Self::fallback(e.to_string()),
        }
    }

    /// Use an already validated font.
    pub fn embedded(font: EmbeddedFont) -> Self {
        Self {
            source: FontSource::Embedded(font),
            fallback_reason: None,
        }
    }

    /// Use the builtin font deliberately.
    pub fn builtin() -> Self {
        Self {
            source: FontSource::Builtin,
            fallback_reason: None,
        }
    }

    fn fallback(reason: String) -> Self {
        log::warn!(
            "No embeddable font available ({}); falling back to {}, unsupported glyphs will not render",
            reason,
            builtin::REGULAR
        );
        Self {
            source: FontSource::Builtin,
            fallback_reason: Some(reason),
        }
    }

    /// Process-wide resolution from [`FontConfig::from_env`], computed once.
    pub fn global() -> Arc<FontResolution> {
        GLOBAL
            .get_or_init(|| Arc::new(Self::resolve(&FontConfig::from_env())))
            .clone()
    }

    /// The active font source.
    pub fn source(&self) -> &FontSource {
        &self.source
    }

    /// Name of the active font.
    pub fn font_name(&self) -> &str {
        match &self.source {
            FontSource::Embedded(font) => font.name(),
            FontSource::Builtin => builtin::REGULAR,
        }
    }

    /// Whether a font is embedded into documents.
    pub fn is_embedded(&self) -> bool {
        matches!(self.source, FontSource::Embedded(_))
    }

    /// Whether resolution had to fall back to the builtin font.
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }

    /// Why the fallback was used.
    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback_reason.as_deref()
    }
}

impl Default for FontResolution {
    fn default() -> Self {
        Self::builtin()
    }
}

fn postscript_name(face: &Face<'_>) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
        .find_map(|n| n.to_string())
        .map(|n| sanitize_font_name(&n))
}

/// Restrict a font name to characters valid in a PDF name without escaping.
fn sanitize_font_name(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else if c.is_whitespace() {
                Some('-')
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_falls_back() {
        let resolution = FontResolution::resolve(&FontConfig::empty());
        assert!(!resolution.is_embedded());
        assert!(resolution.is_fallback());
        assert_eq!(resolution.font_name(), "Helvetica");
        assert_eq!(resolution.fallback_reason(), Some("no font candidate found"));
    }

    #[test]
    fn test_missing_files_fall_back() {
        let config = FontConfig::empty()
            .with_candidate("/nonexistent/a.ttf")
            .with_candidate("/nonexistent/b.ttf");
        let resolution = FontResolution::resolve(&config);
        assert!(resolution.is_fallback());
    }

    #[test]
    fn test_garbage_bytes_fall_back() {
        let resolution = FontResolution::from_bytes(b"definitely not a font".to_vec(), "A");
        assert!(!resolution.is_embedded());
        assert!(resolution.fallback_reason().unwrap().starts_with("Font error"));
    }

    #[test]
    fn test_garbage_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"\x00\x01\x00\x00garbage").unwrap();

        let resolution = FontResolution::resolve(&FontConfig::empty().with_candidate(&path));
        assert!(resolution.is_fallback());
        assert!(resolution.fallback_reason().unwrap().contains("broken.ttf"));
    }

    #[test]
    fn test_builtin_is_not_a_fallback() {
        let resolution = FontResolution::builtin();
        assert!(!resolution.is_fallback());
        assert!(!resolution.is_embedded());
    }

    #[test]
    fn test_with_primary_goes_first() {
        let config = FontConfig::new().with_primary("/tmp/first.ttf");
        assert_eq!(config.candidates[0], PathBuf::from("/tmp/first.ttf"));
        assert!(config.candidates.len() > 1);
    }

    #[test]
    fn test_sanitize_font_name() {
        assert_eq!(sanitize_font_name("IPAex Gothic"), "IPAex-Gothic");
        assert_eq!(sanitize_font_name("Noto/Sans(JP)"), "NotoSansJP");
    }

    #[test]
    fn test_resolution_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FontResolution>();
        assert_send_sync::<Arc<FontResolution>>();
    }
}
