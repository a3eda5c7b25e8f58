//! Rendering options and configuration.

use chrono::{DateTime, Utc};

use crate::cleanup::{CleanupOptions, CleanupPreset};
use crate::document::DEFAULT_FILENAME_STEM;
use crate::layout::DEFAULT_TITLE;
use crate::markup::MarkupConventions;

/// Options for rendering a summary document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Title block text
    pub title: String,

    /// Heading and bullet prefixes
    pub conventions: MarkupConventions,

    /// Input cleanup (None = render the text exactly as given)
    pub cleanup: Option<CleanupOptions>,

    /// Append the patient-facing note when rendering a payload
    pub include_explanation: bool,

    /// Fixed creation timestamp (None = time of rendering)
    pub creation_date: Option<DateTime<Utc>>,

    /// Download filename without extension
    pub filename_stem: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the markup conventions.
    pub fn with_conventions(mut self, conventions: MarkupConventions) -> Self {
        self.conventions = conventions;
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup_preset(mut self, preset: CleanupPreset) -> Self {
        self.cleanup = Some(CleanupOptions::from_preset(preset));
        self
    }

    /// Disable input cleanup.
    pub fn without_cleanup(mut self) -> Self {
        self.cleanup = None;
        self
    }

    /// Include or drop the patient-facing note.
    pub fn with_explanation(mut self, include: bool) -> Self {
        self.include_explanation = include;
        self
    }

    /// Pin the creation timestamp; identical input then yields identical bytes.
    pub fn with_creation_date(mut self, date: DateTime<Utc>) -> Self {
        self.creation_date = Some(date);
        self
    }

    /// Set the download filename stem.
    pub fn with_filename_stem(mut self, stem: impl Into<String>) -> Self {
        self.filename_stem = stem.into();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            conventions: MarkupConventions::default(),
            cleanup: Some(CleanupOptions::default()),
            include_explanation: false,
            creation_date: None,
            filename_stem: DEFAULT_FILENAME_STEM.to_string(),
        }
    }
}
