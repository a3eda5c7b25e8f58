//! Page geometry profiles for the supported output sizes.

use serde::{Deserialize, Serialize};

/// PDF points per millimetre.
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Heading size is the body size plus this many points.
pub const HEADING_SIZE_DELTA: f32 = 2.0;

/// Line leading as a multiple of the font size.
pub const LEADING_RATIO: f32 = 1.2;

const A4_BODY_SIZE: f32 = 11.0;
const A4_TITLE_SIZE: f32 = 18.0;
const RECEIPT_BODY_SIZE: f32 = 8.0;

/// Convert millimetres to points.
pub fn mm(value: f32) -> f32 {
    value * POINTS_PER_MM
}

/// Output size class selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PageSize {
    /// ISO A4 (210 × 297 mm)
    #[default]
    A4,
    /// ISO B5 (176 × 250 mm)
    B5,
    /// 80 mm thermal receipt roll
    Receipt,
}

impl PageSize {
    /// Resolve a size token; unknown or empty tokens resolve to A4.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "a4" => PageSize::A4,
            "b5" => PageSize::B5,
            "receipt" => PageSize::Receipt,
            other => {
                if !other.is_empty() {
                    log::debug!("Unknown page size token {:?}, using A4", token);
                }
                PageSize::A4
            }
        }
    }

    /// The canonical token for this size.
    pub fn token(&self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::B5 => "B5",
            PageSize::Receipt => "Receipt",
        }
    }

    /// The geometry profile for this size.
    pub fn profile(&self) -> GeometryProfile {
        match self {
            PageSize::A4 => GeometryProfile {
                size: PageSize::A4,
                page_width: mm(210.0),
                page_height: mm(297.0),
                margin: mm(20.0),
                base_font_size: A4_BODY_SIZE,
                title_font_size: A4_TITLE_SIZE,
            },
            PageSize::B5 => GeometryProfile {
                size: PageSize::B5,
                page_width: mm(176.0),
                page_height: mm(250.0),
                margin: mm(15.0),
                base_font_size: 10.0,
                title_font_size: 16.0,
            },
            // Narrow medium: title shrinks with the body size.
            PageSize::Receipt => GeometryProfile {
                size: PageSize::Receipt,
                page_width: mm(80.0),
                page_height: mm(297.0),
                margin: mm(4.0),
                base_font_size: RECEIPT_BODY_SIZE,
                title_font_size: A4_TITLE_SIZE * RECEIPT_BODY_SIZE / A4_BODY_SIZE,
            },
        }
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Resolved page dimensions, margins and font sizing. All lengths in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryProfile {
    /// Size class this profile was resolved from
    pub size: PageSize,
    /// Page width
    pub page_width: f32,
    /// Page height
    pub page_height: f32,
    /// Uniform margin on all four sides
    pub margin: f32,
    /// Body text size
    pub base_font_size: f32,
    /// Title size
    pub title_font_size: f32,
}

impl GeometryProfile {
    /// Heading font size.
    pub fn heading_font_size(&self) -> f32 {
        self.base_font_size + HEADING_SIZE_DELTA
    }

    /// Width available for text.
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Height available for text on one page.
    pub fn content_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin
    }

    /// Page width in millimetres.
    pub fn width_mm(&self) -> f32 {
        self.page_width / POINTS_PER_MM
    }
}

impl Default for GeometryProfile {
    fn default() -> Self {
        PageSize::default().profile()
    }
}

/// Resolve a size token to its geometry profile. Never fails.
pub fn resolve(token: &str) -> GeometryProfile {
    PageSize::from_token(token).profile()
}
