//! Per-page font inspection.

use super::{lookup, lookup_dict, lookup_name, page_resources, strip_subset_tag};
use crate::models::{FontInfo, PageFonts};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use tracing::debug;

/// Form XObjects nested deeper than this are not searched for fonts.
const MAX_FORM_DEPTH: usize = 8;

/// Lists the fonts each page uses, directly or through Form XObjects.
/// Pages are numbered from zero.
pub fn extract_fonts(doc: &Document) -> Vec<PageFonts> {
    doc.get_pages()
        .into_iter()
        .enumerate()
        .map(|(index, (_, page_id))| {
            let mut fonts = Vec::new();
            if let Some(resources) = page_resources(doc, page_id) {
                collect_fonts(doc, resources, 0, &mut HashSet::new(), &mut fonts);
            }
            debug!("Page {} references {} font(s)", index, fonts.len());
            PageFonts { page: index, fonts }
        })
        .collect()
}

/// Adds the fonts of `resources` and of the forms it declares, skipping repeats.
fn collect_fonts(
    doc: &Document,
    resources: &Dictionary,
    depth: usize,
    visited: &mut HashSet<ObjectId>,
    fonts: &mut Vec<FontInfo>,
) {
    if let Some(font_dict) = lookup_dict(doc, resources, b"Font") {
        for font in fonts_in(doc, font_dict) {
            if !fonts.iter().any(|f| f.name == font.name && f.xref == font.xref) {
                fonts.push(font);
            }
        }
    }
    if depth >= MAX_FORM_DEPTH {
        return;
    }
    let Some(xobjects) = lookup_dict(doc, resources, b"XObject") else {
        return;
    };
    for (_, obj) in xobjects.iter() {
        let Object::Reference(id) = obj else {
            continue;
        };
        if !visited.insert(*id) {
            continue;
        }
        let Ok(Object::Stream(form)) = doc.get_object(*id) else {
            continue;
        };
        if lookup_name(doc, &form.dict, b"Subtype").as_deref() != Some("Form") {
            continue;
        }
        if let Some(form_resources) = lookup_dict(doc, &form.dict, b"Resources") {
            collect_fonts(doc, form_resources, depth + 1, visited, fonts);
        }
    }
}

fn fonts_in(doc: &Document, font_dict: &Dictionary) -> Vec<FontInfo> {
    font_dict
        .iter()
        .filter_map(|(name, obj)| {
            let (xref, dict) = match obj {
                Object::Reference(id) => (id.0, doc.get_object(*id).ok()?.as_dict().ok()?),
                Object::Dictionary(dict) => (0, dict),
                _ => return None,
            };
            Some(describe(doc, String::from_utf8_lossy(name).into_owned(), xref, dict))
        })
        .collect()
}

fn describe(doc: &Document, name: String, xref: u32, font: &Dictionary) -> FontInfo {
    let font_type = lookup_name(doc, font, b"Subtype").unwrap_or_default();
    let base_font = lookup_name(doc, font, b"BaseFont").unwrap_or_default();

    let encoding = match lookup(doc, font, b"Encoding") {
        Some(Object::Name(name)) => String::from_utf8_lossy(name).into_owned(),
        Some(Object::Dictionary(dict)) => lookup_name(doc, dict, b"BaseEncoding")
            .unwrap_or_else(|| "Custom".to_string()),
        Some(Object::Stream(_)) => "Embedded CMap".to_string(),
        _ => String::new(),
    };

    FontInfo {
        xref,
        ext: embedded_program(doc, font).to_string(),
        font_type,
        base_font,
        name,
        encoding,
    }
}

/// Kind of font program embedded through the font descriptor.
fn embedded_program(doc: &Document, font: &Dictionary) -> &'static str {
    // Composite fonts keep their descriptor on the descendant CIDFont.
    let holder = match lookup(doc, font, b"DescendantFonts") {
        Some(Object::Array(items)) => items
            .first()
            .and_then(|first| super::resolve(doc, first))
            .and_then(|obj| obj.as_dict().ok())
            .unwrap_or(font),
        _ => font,
    };
    let Some(descriptor) = lookup_dict(doc, holder, b"FontDescriptor") else {
        return "n/a";
    };

    if descriptor.has(b"FontFile") {
        "pfa"
    } else if descriptor.has(b"FontFile2") {
        "ttf"
    } else if let Some(program) = lookup_dict(doc, descriptor, b"FontFile3") {
        match lookup_name(doc, program, b"Subtype").as_deref() {
            Some("Type1C") => "cff",
            Some("CIDFontType0C") => "cid",
            Some("OpenType") => "otf",
            _ => "n/a",
        }
    } else {
        "n/a"
    }
}

/// Display name for a font row: base font without subset tag, or the resource name.
pub fn display_name(font: &FontInfo) -> &str {
    if font.base_font.is_empty() {
        &font.name
    } else {
        strip_subset_tag(&font.base_font)
    }
}
