//! Writes PDFs made of placed text using the standard 14 fonts.

use crate::error::Result;
use chrono::Local;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::path::Path;
use tracing::{debug, info};

/// US Letter, in points.
pub const LETTER: PageSize = PageSize {
    width: 612.0,
    height: 792.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// A string drawn at a fixed baseline position.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    /// Base font name, e.g. `Helvetica-Bold`.
    pub font: String,
    pub size: f32,
    pub text: String,
}

impl Placement {
    pub fn new(x: f32, y: f32, font: &str, size: f32, text: &str) -> Self {
        Placement {
            x,
            y,
            font: font.to_string(),
            size,
            text: text.to_string(),
        }
    }
}

/// Chooses the standard 14 font closest to a document font name.
pub fn standard_font(name: &str, bold: bool, italic: bool) -> &'static str {
    let lower = name.to_ascii_lowercase();
    let bold = bold || lower.contains("bold");
    let italic = italic || lower.contains("italic") || lower.contains("oblique");

    let monospace = ["courier", "mono", "consolas", "menlo"]
        .iter()
        .any(|k| lower.contains(k));
    let serif = !lower.contains("sans")
        && ["times", "serif", "georgia", "cambria", "garamond", "book", "roman"]
            .iter()
            .any(|k| lower.contains(k));

    match (monospace, serif, bold, italic) {
        (true, _, false, false) => "Courier",
        (true, _, true, false) => "Courier-Bold",
        (true, _, false, true) => "Courier-Oblique",
        (true, _, true, true) => "Courier-BoldOblique",
        (false, true, false, false) => "Times-Roman",
        (false, true, true, false) => "Times-Bold",
        (false, true, false, true) => "Times-Italic",
        (false, true, true, true) => "Times-BoldItalic",
        (false, false, false, false) => "Helvetica",
        (false, false, true, false) => "Helvetica-Bold",
        (false, false, false, true) => "Helvetica-Oblique",
        (false, false, true, true) => "Helvetica-BoldOblique",
    }
}

/// Approximate advance width of `text` in a standard font, in points.
pub fn text_width(font: &str, size: f32, text: &str) -> f32 {
    let em = if font.starts_with("Courier") {
        0.6
    } else if font.starts_with("Times") {
        0.47
    } else {
        0.52
    };
    text.chars().count() as f32 * em * size
}

/// Encodes text for a WinAnsiEncoding font; unmappable characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            c if (' '..='~').contains(&c) || ('\u{A0}'..='\u{FF}').contains(&c) => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Collects pages of placed text and turns them into a `lopdf::Document`.
#[derive(Debug, Clone)]
pub struct PdfBuilder {
    page_size: PageSize,
    pages: Vec<Vec<Placement>>,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::with_page_size(LETTER)
    }

    pub fn with_page_size(page_size: PageSize) -> Self {
        PdfBuilder {
            page_size,
            pages: Vec::new(),
        }
    }

    pub fn add_page(&mut self, placements: Vec<Placement>) {
        self.pages.push(placements);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn into_document(self) -> Result<Document> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        // One font object per distinct base font, named F1, F2, ... in first-use order.
        let mut fonts: Vec<(String, ObjectId)> = Vec::new();
        for placement in self.pages.iter().flatten() {
            if !fonts.iter().any(|(name, _)| *name == placement.font) {
                let id = doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => Object::Name(placement.font.as_bytes().to_vec()),
                    "Encoding" => "WinAnsiEncoding",
                });
                fonts.push((placement.font.clone(), id));
            }
        }
        let mut font_dict = Dictionary::new();
        for (index, (_, id)) in fonts.iter().enumerate() {
            font_dict.set(format!("F{}", index + 1), *id);
        }
        let resources_id = doc.add_object(dictionary! { "Font" => font_dict });

        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            self.page_size.width.into(),
            self.page_size.height.into(),
        ];

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for placements in &self.pages {
            let mut operations = Vec::with_capacity(placements.len() * 5);
            for placement in placements {
                let index = fonts
                    .iter()
                    .position(|(name, _)| *name == placement.font)
                    .unwrap_or(0);
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![
                        Object::Name(format!("F{}", index + 1).into_bytes()),
                        placement.size.into(),
                    ],
                ));
                operations.push(Operation::new(
                    "Td",
                    vec![placement.x.into(), placement.y.into()],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(
                        encode_win_ansi(&placement.text),
                        StringFormat::Literal,
                    )],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => media_box.clone(),
            });
            kids.push(page_id.into());
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
            "Pages" => pages_id,
        });
        let created = Local::now().format("D:%Y%m%d%H%M%S").to_string();
        let info_id = doc.add_object(dictionary! {
            "Producer" => Object::string_literal(concat!("docshift ", env!("CARGO_PKG_VERSION"))),
            "CreationDate" => Object::string_literal(created),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        debug!("Built PDF with {} page(s) and {} font(s)", count, fonts.len());
        Ok(doc)
    }

    /// Builds the document and writes it to `path`.
    pub fn save(self, path: &Path) -> Result<usize> {
        let pages = self.pages.len();
        let mut doc = self.into_document()?;
        doc.save(path)?;
        info!("Wrote {} page(s) to {}", pages, path.display());
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Arial", false, false, "Helvetica")]
    #[case("Calibri", true, false, "Helvetica-Bold")]
    #[case("Times New Roman", false, true, "Times-Italic")]
    #[case("Georgia-BoldItalic", false, false, "Times-BoldItalic")]
    #[case("Courier New", false, false, "Courier")]
    #[case("DejaVu Sans Mono", true, true, "Courier-BoldOblique")]
    #[case("Liberation Sans", false, false, "Helvetica")]
    fn fonts_map_to_standard_families(
        #[case] name: &str,
        #[case] bold: bool,
        #[case] italic: bool,
        #[case] expected: &str,
    ) {
        assert_eq!(standard_font(name, bold, italic), expected);
    }

    #[test]
    fn win_ansi_encoding_keeps_latin1_and_replaces_the_rest() {
        assert_eq!(encode_win_ansi("Café"), b"Caf\xe9".to_vec());
        assert_eq!(encode_win_ansi("\u{201C}ok\u{201D}"), vec![0x93, b'o', b'k', 0x94]);
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
    }

    #[test]
    fn builder_writes_one_page_per_placement_list() {
        let mut builder = PdfBuilder::new();
        builder.add_page(vec![Placement::new(72.0, 720.0, "Helvetica", 12.0, "one")]);
        builder.add_page(vec![Placement::new(72.0, 720.0, "Courier", 12.0, "two")]);
        builder.add_page(vec![]);
        let doc = builder.into_document().unwrap();
        assert_eq!(doc.get_pages().len(), 3);
        assert!(doc.trailer.get(b"Info").is_ok());
    }

    #[test]
    fn saved_documents_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let mut builder = PdfBuilder::new();
        builder.add_page(vec![Placement::new(72.0, 720.0, "Times-Roman", 12.0, "hello")]);
        assert_eq!(builder.save(&path).unwrap(), 1);
        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
