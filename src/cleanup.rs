//! Input cleanup applied before line classification.
//!
//! Generator output arrives through several hops (JSON, HTTP forms, copy and
//! paste) and picks up stray carriage returns, byte order marks and
//! zero-width characters on the way. None of the steps touch the markup
//! characters that classification depends on.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Cleanup preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPreset {
    /// Line endings and NFC only
    Minimal,
    /// Everything
    #[default]
    Standard,
}

/// Options for input cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Convert CRLF and lone CR to LF
    pub normalize_line_endings: bool,

    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Remove zero-width characters, BOM, U+FFFD and control characters
    pub remove_invisible: bool,

    /// Replace tabs with a single space
    pub expand_tabs: bool,

    /// Strip whitespace at the end of every line
    pub trim_line_ends: bool,

    /// Maximum consecutive newlines (0 = unlimited)
    pub max_consecutive_newlines: u8,
}

impl CleanupOptions {
    /// Create options from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        match preset {
            CleanupPreset::Minimal => Self::minimal(),
            CleanupPreset::Standard => Self::standard(),
        }
    }

    /// Minimal cleanup options.
    pub fn minimal() -> Self {
        Self {
            normalize_line_endings: true,
            normalize_unicode: true,
            remove_invisible: false,
            expand_tabs: false,
            trim_line_ends: false,
            max_consecutive_newlines: 0,
        }
    }

    /// Standard cleanup options.
    pub fn standard() -> Self {
        Self {
            normalize_line_endings: true,
            normalize_unicode: true,
            remove_invisible: true,
            expand_tabs: true,
            trim_line_ends: true,
            max_consecutive_newlines: 2,
        }
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// Text cleanup pipeline.
#[derive(Debug, Clone)]
pub struct CleanupPipeline {
    options: CleanupOptions,
    line_end_regex: Option<Regex>,
    newline_run_regex: Option<Regex>,
}

impl CleanupPipeline {
    /// Create a new cleanup pipeline with the given options.
    pub fn new(options: CleanupOptions) -> Self {
        let newline_run_regex = match options.max_consecutive_newlines {
            0 => None,
            max => compile(&format!(r"\n{{{},}}", usize::from(max) + 1)),
        };
        Self {
            options,
            line_end_regex: compile(r"(?m)[ \t\u{3000}]+$"),
            newline_run_regex,
        }
    }

    /// Create a pipeline from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        Self::new(CleanupOptions::from_preset(preset))
    }

    /// The options this pipeline runs with.
    pub fn options(&self) -> &CleanupOptions {
        &self.options
    }

    /// Process text through the cleanup pipeline.
    pub fn process(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.options.normalize_line_endings {
            result = result.replace("\r\n", "\n").replace('\r', "\n");
        }

        if self.options.normalize_unicode {
            result = result.nfc().collect();
        }

        if self.options.remove_invisible {
            result.retain(|c| !is_invisible(c));
        }

        if self.options.expand_tabs {
            result = result.replace('\t', " ");
        }

        if self.options.trim_line_ends {
            if let Some(re) = &self.line_end_regex {
                result = re.replace_all(&result, "").into_owned();
            }
        }

        if let Some(re) = &self.newline_run_regex {
            let replacement = "\n".repeat(usize::from(self.options.max_consecutive_newlines));
            result = re.replace_all(&result, replacement.as_str()).into_owned();
        }

        result
    }
}

impl Default for CleanupPipeline {
    fn default() -> Self {
        Self::new(CleanupOptions::default())
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("Cleanup pattern {:?} rejected: {}", pattern, e);
            None
        }
    }
}

fn is_invisible(c: char) -> bool {
    match c {
        '\n' | '\t' => false,
        '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{FFFD}' => true,
        c => c.is_control(),
    }
}
