//! Read-back inspection of produced documents.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A font referenced from a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontInfo {
    /// Resource name (`F1`, `F2`, ...)
    pub resource: String,
    /// `BaseFont` entry
    pub base_font: String,
    /// `Subtype` entry (`Type0`, `Type1`, ...)
    pub subtype: String,
}

/// What a document looks like from the outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectReport {
    /// PDF header version
    pub version: String,
    /// Number of pages
    pub page_count: usize,
    /// MediaBox width and height of every page, in points
    pub page_sizes: Vec<(f32, f32)>,
    /// Info dictionary title
    pub title: Option<String>,
    /// Info dictionary producer
    pub producer: Option<String>,
    /// Raw info dictionary creation date
    pub creation_date: Option<String>,
    /// Fonts used by any page, deduplicated by resource name
    pub fonts: Vec<FontInfo>,
}

impl InspectReport {
    /// Whether any page uses a composite (embedded CID) font.
    pub fn has_composite_font(&self) -> bool {
        self.fonts.iter().any(|f| f.subtype == "Type0")
    }
}

/// Load a PDF from memory and describe it.
pub fn inspect_pdf(bytes: &[u8]) -> Result<InspectReport> {
    let doc = Document::load_mem(bytes)?;
    let pages = doc.get_pages();

    let mut page_sizes = Vec::with_capacity(pages.len());
    let mut fonts = BTreeMap::new();
    for page_id in pages.values() {
        page_sizes.push(media_box(&doc, *page_id));

        for (name, dict) in doc.get_page_fonts(*page_id)? {
            let resource = String::from_utf8_lossy(&name).to_string();
            fonts.entry(resource.clone()).or_insert_with(|| FontInfo {
                resource,
                base_font: name_entry(dict, b"BaseFont").unwrap_or_else(|| "Unknown".to_string()),
                subtype: name_entry(dict, b"Subtype").unwrap_or_default(),
            });
        }
    }

    let info = doc
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_dictionary(id))
        .ok();

    Ok(InspectReport {
        version: doc.version.to_string(),
        page_count: pages.len(),
        page_sizes,
        title: info.and_then(|d| string_entry(d, b"Title")),
        producer: info.and_then(|d| string_entry(d, b"Producer")),
        creation_date: info.and_then(|d| string_entry(d, b"CreationDate")),
        fonts: fonts.into_values().collect(),
    })
}

fn media_box(doc: &Document, page_id: lopdf::ObjectId) -> (f32, f32) {
    let values: Option<Vec<f32>> = doc
        .get_dictionary(page_id)
        .and_then(|page| page.get(b"MediaBox"))
        .and_then(Object::as_array)
        .ok()
        .map(|array| array.iter().filter_map(|o| o.as_float().ok()).collect());

    match values.as_deref() {
        Some([x0, y0, x1, y1]) => (x1 - x0, y1 - y0),
        _ => (0.0, 0.0),
    }
}

fn name_entry(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key)
        .and_then(Object::as_name)
        .ok()
        .map(|n| String::from_utf8_lossy(n).to_string())
}

fn string_entry(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Decode a PDF text string (UTF-16BE with BOM, otherwise UTF-8 or Latin-1).
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => s,
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
