//! Serializes paginated lines into a PDF document.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{DateTime, Utc};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::flow::{PageContent, PlacedLine};
use crate::error::{Error, Result};
use crate::font::{EmbeddedFont, TextShaper, UsedGlyph, BUILTIN_BOLD, BUILTIN_REGULAR};
use crate::geometry::GeometryProfile;

/// PDF version written into the header.
pub const PDF_VERSION: &str = "1.7";

/// Stroke width for synthesized bold, relative to the font size.
const FAUX_BOLD_STROKE: f32 = 0.03;

/// Entries per `beginbfchar` section (the CMap format caps it at 100).
const BFCHAR_CHUNK: usize = 100;

/// Document information dictionary values.
#[derive(Debug, Clone)]
pub(crate) struct DocumentInfo<'a> {
    pub title: &'a str,
    pub creation_date: DateTime<Utc>,
}

/// Build the PDF for the given pages and return its bytes.
pub(crate) fn write_document(
    pages: &[PageContent],
    geometry: &GeometryProfile,
    shaper: &mut TextShaper<'_>,
    info: &DocumentInfo<'_>,
) -> Result<Vec<u8>> {
    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    // Content first: encoding records which glyphs the font objects must describe.
    let mut content_ids = Vec::with_capacity(pages.len());
    for page in pages {
        let data = page_content(page, shaper)?;
        content_ids.push(doc.add_object(compressed_stream(Dictionary::new(), &data)?));
    }

    let fonts = font_resources(&mut doc, shaper)?;
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
        "ProcSet" => vec![Object::Name(b"PDF".to_vec()), Object::Name(b"Text".to_vec())],
    });

    let media_box: Vec<Object> = vec![
        Object::Integer(0),
        Object::Integer(0),
        geometry.page_width.into(),
        geometry.page_height.into(),
    ];

    let mut kids = Vec::with_capacity(content_ids.len());
    for content_id in content_ids {
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => media_box.clone(),
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Reference(resources_id),
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let info_id = doc.add_object(info_dictionary(info));
    doc.trailer.set("Info", Object::Reference(info_id));

    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(Error::encode)?;
    Ok(out)
}

fn page_content(page: &PageContent, shaper: &mut TextShaper<'_>) -> Result<Vec<u8>> {
    let mut operations = Vec::new();
    for line in &page.lines {
        line_operations(line, shaper, &mut operations);
    }
    Content { operations }.encode().map_err(Error::encode)
}

fn line_operations(line: &PlacedLine, shaper: &mut TextShaper<'_>, ops: &mut Vec<Operation>) {
    if line.fragments.is_empty() {
        return;
    }

    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Td", vec![line.x.into(), line.baseline.into()]));

    let mut current_font: Option<&'static str> = None;
    let mut current_mode: Option<bool> = None;

    for fragment in &line.fragments {
        let font = shaper.resource_name(fragment.bold);
        if current_font != Some(font) {
            ops.push(Operation::new(
                "Tf",
                vec![Object::Name(font.as_bytes().to_vec()), line.font_size.into()],
            ));
            current_font = Some(font);
        }

        if shaper.synthesizes_bold() && current_mode != Some(fragment.bold) {
            if fragment.bold {
                ops.push(Operation::new("Tr", vec![Object::Integer(2)]));
                ops.push(Operation::new(
                    "w",
                    vec![(line.font_size * FAUX_BOLD_STROKE).into()],
                ));
            } else {
                ops.push(Operation::new("Tr", vec![Object::Integer(0)]));
            }
            current_mode = Some(fragment.bold);
        }

        let bytes = shaper.encode(&fragment.text);
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(bytes, StringFormat::Hexadecimal)],
        ));
    }

    ops.push(Operation::new("ET", vec![]));
}

/// The `/Font` resource dictionary.
fn font_resources(doc: &mut Document, shaper: &TextShaper<'_>) -> Result<Dictionary> {
    let mut fonts = Dictionary::new();
    match shaper.embedded_glyphs() {
        Some((font, used)) => {
            let font_id = embed_font(doc, font, used)?;
            fonts.set(shaper.resource_name(false), Object::Reference(font_id));
        }
        None => {
            for bold in [false, true] {
                let base_font = if bold { BUILTIN_BOLD } else { BUILTIN_REGULAR };
                let font_id = doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => base_font,
                    "Encoding" => "WinAnsiEncoding",
                });
                fonts.set(shaper.resource_name(bold), Object::Reference(font_id));
            }
        }
    }
    Ok(fonts)
}

/// Embed a TrueType font as a Type0/CIDFontType2 composite with Identity-H encoding.
fn embed_font(
    doc: &mut Document,
    font: &EmbeddedFont,
    used: &BTreeMap<u16, UsedGlyph>,
) -> Result<ObjectId> {
    let base_font = Object::Name(font.name().as_bytes().to_vec());

    let font_file_id = doc.add_object(compressed_stream(
        dictionary! { "Length1" => font.data().len() as i64 },
        font.data(),
    )?);

    let [x_min, y_min, x_max, y_max] = font.bbox();
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_font.clone(),
        "Flags" => 4i64,
        "FontBBox" => [x_min, y_min, x_max, y_max]
            .iter()
            .map(|v| Object::Integer(i64::from(*v)))
            .collect::<Vec<_>>(),
        "ItalicAngle" => 0i64,
        "Ascent" => i64::from(font.ascent()),
        "Descent" => i64::from(font.descent()),
        "CapHeight" => i64::from(font.cap_height()),
        "StemV" => 80i64,
        "FontFile2" => Object::Reference(font_file_id),
    });

    let widths: Vec<Object> = used
        .iter()
        .flat_map(|(gid, glyph)| {
            [
                Object::Integer(i64::from(*gid)),
                Object::Array(vec![Object::Integer(i64::from(glyph.width))]),
            ]
        })
        .collect();

    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => base_font.clone(),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0i64,
        },
        "FontDescriptor" => Object::Reference(descriptor_id),
        "DW" => 1000i64,
        "W" => widths,
        "CIDToGIDMap" => "Identity",
    });

    let cmap = to_unicode_cmap(used);
    let to_unicode_id = doc.add_object(compressed_stream(Dictionary::new(), cmap.as_bytes())?);

    Ok(doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => base_font,
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(cid_font_id)],
        "ToUnicode" => Object::Reference(to_unicode_id),
    }))
}

/// A ToUnicode CMap so drawn text stays extractable.
fn to_unicode_cmap(used: &BTreeMap<u16, UsedGlyph>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );

    // .notdef has no meaningful code point
    let entries: Vec<(u16, char)> = used
        .iter()
        .filter(|(gid, _)| **gid != 0)
        .map(|(gid, glyph)| (*gid, glyph.ch))
        .collect();

    for chunk in entries.chunks(BFCHAR_CHUNK) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, ch) in chunk {
            let mut units = [0u16; 2];
            let hex: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{:04X}", u))
                .collect();
            cmap.push_str(&format!("<{:04X}> <{}>\n", gid, hex));
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
    );
    cmap
}

fn info_dictionary(info: &DocumentInfo<'_>) -> Dictionary {
    let producer = format!("medsum {}", env!("CARGO_PKG_VERSION"));
    dictionary! {
        "Title" => text_string(info.title),
        "Creator" => Object::string_literal("medsum"),
        "Producer" => Object::string_literal(producer),
        "CreationDate" => Object::string_literal(pdf_date(&info.creation_date)),
    }
}

/// A PDF text string: UTF-16BE with byte order mark.
fn text_string(text: &str) -> Object {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Format a timestamp as a PDF date string.
fn pdf_date(date: &DateTime<Utc>) -> String {
    date.format("D:%Y%m%d%H%M%S+00'00'").to_string()
}

fn compressed_stream(mut dict: Dictionary, data: &[u8]) -> Result<Stream> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(Error::encode)?;
    let compressed = encoder.finish().map_err(Error::encode)?;

    dict.set("Filter", "FlateDecode");
    Ok(Stream::new(dict, compressed))
}
