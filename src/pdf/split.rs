//! Splits a PDF into single-page documents.
//!
//! Every page is copied into a fresh document together with the objects it
//! references, so the cost of one page does not grow with the size of the source.
//! Attributes the page inherits from the page tree are set on the copy directly.

use super::inherited;
use crate::error::Result;
use crate::models::SplitPage;
use indicatif::ProgressBar;
use lopdf::{dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Page attributes a page may inherit from its ancestors.
const INHERITED_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// File name of the `number`-th (one-based) page produced by a split.
pub fn page_file_name(number: usize) -> String {
    format!("page_{number}.pdf")
}

/// Copies the objects reachable from one page into a new document.
struct PageCopy<'a> {
    source: &'a Document,
    page_id: ObjectId,
    target: Document,
    /// Source id to target id, for every object copied or queued.
    ids: BTreeMap<ObjectId, ObjectId>,
    pending: Vec<ObjectId>,
}

impl<'a> PageCopy<'a> {
    fn new(source: &'a Document, page_id: ObjectId) -> Self {
        PageCopy {
            source,
            page_id,
            target: Document::with_version(source.version.clone()),
            ids: BTreeMap::new(),
            pending: Vec::new(),
        }
    }

    fn is_other_page(&self, id: ObjectId) -> bool {
        id != self.page_id
            && matches!(
                self.source.get_object(id),
                Ok(Object::Dictionary(dict)) if dict.type_name().ok() == Some("Page")
            )
    }

    /// The target reference for a source reference. Links to other pages become null.
    fn map(&mut self, id: ObjectId) -> Object {
        if let Some(new_id) = self.ids.get(&id) {
            return Object::Reference(*new_id);
        }
        if self.is_other_page(id) {
            return Object::Null;
        }
        let new_id = self.target.new_object_id();
        self.ids.insert(id, new_id);
        self.pending.push(id);
        Object::Reference(new_id)
    }

    fn rewrite(&mut self, object: &mut Object) {
        match object {
            Object::Reference(id) => {
                let id = *id;
                *object = self.map(id);
            },
            Object::Array(items) => {
                for item in items.iter_mut() {
                    self.rewrite(item);
                }
            },
            Object::Dictionary(dict) => {
                for (_, value) in dict.iter_mut() {
                    self.rewrite(value);
                }
            },
            Object::Stream(stream) => {
                for (_, value) in stream.dict.iter_mut() {
                    self.rewrite(value);
                }
            },
            _ => {},
        }
    }

    /// Copies queued objects until nothing new is referenced.
    fn drain(&mut self) {
        while let Some(id) = self.pending.pop() {
            let mut object = self.source.get_object(id).cloned().unwrap_or(Object::Null);
            self.rewrite(&mut object);
            if let Some(new_id) = self.ids.get(&id) {
                self.target.objects.insert(*new_id, object);
            }
        }
    }
}

/// A document holding only `page_id` of `source`.
fn single_page_document(source: &Document, page_id: ObjectId) -> Result<Document> {
    let mut page = source.get_dictionary(page_id)?.clone();
    for key in INHERITED_KEYS {
        if !page.has(key) {
            if let Some(value) = inherited(source, page_id, key) {
                page.set(key.to_vec(), value.clone());
            }
        }
    }
    page.remove(b"Parent");

    let mut copy = PageCopy::new(source, page_id);
    let pages_id = copy.target.new_object_id();
    let new_page_id = copy.target.new_object_id();
    copy.ids.insert(page_id, new_page_id);

    for (_, value) in page.iter_mut() {
        copy.rewrite(value);
    }
    copy.drain();
    page.set("Parent", pages_id);

    let mut doc = copy.target;
    doc.objects.insert(new_page_id, Object::Dictionary(page));
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![new_page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    Ok(doc)
}

/// Writes `page_<n>.pdf` into `output_dir` for every page of `doc`.
///
/// The directory must already exist.
pub fn split_pages(doc: &Document, output_dir: &Path, progress: &ProgressBar) -> Result<Vec<SplitPage>> {
    let pages = doc.get_pages();
    progress.set_length(pages.len() as u64);

    let mut written = Vec::with_capacity(pages.len());
    for (number, page_id) in pages {
        let mut single = single_page_document(doc, page_id)?;
        let path = output_dir.join(page_file_name(number as usize));
        single.save(&path)?;
        debug!(
            "Extracted page {} to {} ({} objects)",
            number,
            path.display(),
            single.objects.len()
        );

        written.push(SplitPage {
            page: number as usize,
            path,
        });
        progress.inc(1);
    }
    progress.finish_and_clear();

    info!("Split {} page(s) into {}", written.len(), output_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{first_page, helvetica, show, single_page};
    use crate::pdf::{document_spans, group_lines, PdfBuilder, Placement};
    use lopdf::Object as PdfObject;

    fn numbered_document(pages: usize) -> Document {
        let mut builder = PdfBuilder::new();
        for n in 1..=pages {
            builder.add_page(vec![Placement::new(
                72.0,
                700.0,
                "Helvetica",
                12.0,
                &format!("This is page {n}"),
            )]);
        }
        builder.into_document().unwrap()
    }

    #[test]
    fn every_page_becomes_its_own_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = numbered_document(3);

        let written = split_pages(&doc, dir.path(), &ProgressBar::hidden()).unwrap();
        assert_eq!(written.len(), 3);

        for (index, page) in written.iter().enumerate() {
            let number = index + 1;
            assert_eq!(page.page, number);
            assert_eq!(page.path, dir.path().join(format!("page_{number}.pdf")));

            let single = Document::load(&page.path).unwrap();
            assert_eq!(single.get_pages().len(), 1);
            let spans = document_spans(&single).unwrap().remove(0);
            let lines = group_lines(spans);
            assert_eq!(lines[0].text(), format!("This is page {number}"));
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn page_files_do_not_grow_with_the_source() {
        let small = tempfile::tempdir().unwrap();
        let large = tempfile::tempdir().unwrap();
        split_pages(&numbered_document(1), small.path(), &ProgressBar::hidden()).unwrap();
        split_pages(&numbered_document(40), large.path(), &ProgressBar::hidden()).unwrap();

        let objects = |dir: &Path, number: usize| {
            Document::load(dir.join(page_file_name(number)))
                .unwrap()
                .objects
                .len()
        };
        assert_eq!(objects(large.path(), 1), objects(small.path(), 1));
        assert_eq!(objects(large.path(), 40), objects(small.path(), 1));
    }

    #[test]
    fn inherited_attributes_are_set_on_the_page() {
        let mut doc = single_page(
            dictionary! { "Font" => dictionary! { "F1" => helvetica() } },
            show("F1", 12, 72, 700, PdfObject::string_literal("Inherited")),
        );
        let page_id = first_page(&doc);
        let page = doc.get_dictionary_mut(page_id).unwrap();
        let resources = page.remove(b"Resources").unwrap();
        let media_box = page.remove(b"MediaBox").unwrap();
        let pages_id = page.get(b"Parent").unwrap().as_reference().unwrap();
        let pages = doc.get_dictionary_mut(pages_id).unwrap();
        pages.set("Resources", resources);
        pages.set("MediaBox", media_box);
        pages.set("Rotate", 90);

        let single = single_page_document(&doc, page_id).unwrap();
        let page = single.get_dictionary(first_page(&single)).unwrap();
        assert!(page.has(b"Resources"));
        assert!(page.has(b"MediaBox"));
        assert_eq!(page.get(b"Rotate").unwrap().as_i64().unwrap(), 90);

        let spans = document_spans(&single).unwrap().remove(0);
        assert_eq!(spans[0].text, "Inherited");
    }

    #[test]
    fn links_to_other_pages_are_dropped() {
        let mut doc = numbered_document(2);
        let pages = doc.get_pages();
        let (first, second) = (pages[&1], pages[&2]);
        let link = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
            "P" => first,
            "Dest" => vec![second.into(), "Fit".into()],
        });
        doc.get_dictionary_mut(first)
            .unwrap()
            .set("Annots", vec![link.into()]);

        let single = single_page_document(&doc, first).unwrap();
        assert_eq!(single.get_pages().len(), 1);
        let page_id = first_page(&single);
        let annots = single
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Annots")
            .unwrap()
            .as_array()
            .unwrap();
        let annot = single
            .get_dictionary(annots[0].as_reference().unwrap())
            .unwrap();
        assert_eq!(annot.get(b"P").unwrap().as_reference().unwrap(), page_id);
        let dest = annot.get(b"Dest").unwrap().as_array().unwrap();
        assert_eq!(dest[0], PdfObject::Null);
    }

    #[test]
    fn missing_output_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = numbered_document(1);
        let result = split_pages(&doc, &dir.path().join("absent"), &ProgressBar::hidden());
        assert!(result.is_err());
    }
}
