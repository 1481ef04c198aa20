//! PDF collaborators built on `lopdf` and `pdf-extract`.
//!
//! Includes:
//! - `fonts`: per-page font inspection, Form XObjects included.
//! - `text`: positioned text spans through `pdf-extract`.
//! - `layout`: grouping spans into lines, cells and paragraphs.
//! - `tables`: text-alignment table detection.
//! - `split`: one single-page file per source page.
//! - `writer`: building base-14 PDFs from placed text.

#[cfg(test)]
pub(crate) mod fixtures;
mod fonts;
mod layout;
mod split;
mod tables;
mod text;
mod writer;

pub use fonts::*;
pub use layout::*;
pub use split::*;
pub use tables::*;
pub use text::*;
pub use writer::*;

use crate::error::Result;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::Path;
use tracing::{debug, error};

/// Opens a PDF from disk.
pub fn load(path: &Path) -> Result<Document> {
    let doc = Document::load(path).map_err(|e| {
        error!("Failed to load PDF {}: {}", path.display(), e);
        e
    })?;
    debug!(
        "Loaded {} ({} pages, version {})",
        path.display(),
        doc.get_pages().len(),
        doc.version
    );
    Ok(doc)
}

/// Follows a reference to its object; any other object is returned as is.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Looks up `key` in `dict` and follows a reference if there is one.
pub(crate) fn lookup<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().and_then(|obj| resolve(doc, obj))
}

pub(crate) fn lookup_dict<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    match lookup(doc, dict, key)? {
        Object::Dictionary(d) => Some(d),
        Object::Stream(s) => Some(&s.dict),
        _ => None,
    }
}

pub(crate) fn lookup_name(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match lookup(doc, dict, key)? {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// A page attribute, looked up through `/Parent` when the page does not set it.
pub(crate) fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    // Page trees are shallow; the bound only guards against cyclic /Parent links.
    for _ in 0..64 {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        node = lookup_dict(doc, node, b"Parent")?;
    }
    None
}

/// The resource dictionary of a page, following `/Parent` for inherited resources.
pub(crate) fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    match resolve(doc, inherited(doc, page_id, b"Resources")?)? {
        Object::Dictionary(resources) => Some(resources),
        _ => None,
    }
}

/// Strips the six-letter subset tag from an embedded font name (`ABCDEF+Arial` -> `Arial`).
pub fn strip_subset_tag(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => rest,
        _ => name,
    }
}
