//! Hand-built PDF pages for tests that need objects `PdfBuilder` never writes.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// A one-page Letter document whose page draws `operations` with `resources`.
pub(crate) fn single_page(resources: Dictionary, operations: Vec<Operation>) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content = Content { operations }.encode().unwrap();
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => resources,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

pub(crate) fn first_page(doc: &Document) -> ObjectId {
    *doc.get_pages().get(&1).unwrap()
}

/// Replaces the first page's resources.
pub(crate) fn set_resources(doc: &mut Document, resources: Dictionary) {
    let page_id = first_page(doc);
    doc.get_dictionary_mut(page_id)
        .unwrap()
        .set("Resources", resources);
}

pub(crate) fn helvetica() -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Shows `text` with font resource `font` at (`x`, `y`) inside its own text object.
pub(crate) fn show(font: &str, size: i64, x: i64, y: i64, text: Object) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![text]),
        Operation::new("ET", vec![]),
    ]
}

pub(crate) const GRID: [[&str; 3]; 2] = [["Item", "Qty", "Price"], ["Widget", "4", "9.50"]];

/// A page whose only content is `/Fm1 Do`, where the form draws a 3x2 Helvetica grid
/// with its own font resources.
pub(crate) fn form_grid_document() -> Document {
    let mut operations = Vec::new();
    for (row, y) in GRID.iter().zip([700, 686]) {
        for (cell, x) in row.iter().zip([72, 220, 320]) {
            operations.extend(show("F1", 10, x, y, Object::string_literal(*cell)));
        }
    }
    let form = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => helvetica() } },
        },
        Content { operations }.encode().unwrap(),
    );

    let mut doc = single_page(dictionary! {}, vec![Operation::new("Do", vec!["Fm1".into()])]);
    let form_id = doc.add_object(form);
    set_resources(
        &mut doc,
        dictionary! { "XObject" => dictionary! { "Fm1" => form_id } },
    );
    doc
}
