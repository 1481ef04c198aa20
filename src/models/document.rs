//! Defines data structures for the application.
//!
//! Includes structs for:
//! - Selecting one of the menu operations (`Operation`).
//! - Describing operation inputs (`PageRange`, `StyledText`).
//! - Structuring operation results for CLI output (`PageFonts`, `ExtractedTable`, `SplitPage`, `Outcome`).

use serde::Serialize;
use std::path::PathBuf;

/// The five operations offered by the interactive menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    DocxToPdf,
    PdfToDocx,
    ExtractFonts,
    ExtractTables,
    SplitPdf,
}

impl Operation {
    /// All menu operations, in menu order.
    pub const ALL: [Operation; 5] = [
        Operation::DocxToPdf,
        Operation::PdfToDocx,
        Operation::ExtractFonts,
        Operation::ExtractTables,
        Operation::SplitPdf,
    ];

    /// Parses an operator-supplied selector by exact match against `"1"` to `"5"`.
    pub fn from_selector(selector: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.selector() == selector)
    }

    pub fn selector(self) -> &'static str {
        match self {
            Operation::DocxToPdf => "1",
            Operation::PdfToDocx => "2",
            Operation::ExtractFonts => "3",
            Operation::ExtractTables => "4",
            Operation::SplitPdf => "5",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Operation::DocxToPdf => "Convert DOCX to PDF",
            Operation::PdfToDocx => "Convert PDF to DOCX",
            Operation::ExtractFonts => "Extract Fonts from PDF",
            Operation::ExtractTables => "Extract Tables from PDF",
            Operation::SplitPdf => "Split PDF into Pages",
        }
    }

    /// Prompts for the operation's parameters, in the order they are collected.
    pub fn prompts(self) -> &'static [&'static str] {
        match self {
            Operation::DocxToPdf => &[
                "Enter the path to the DOCX file",
                "Enter the path to save the PDF file",
            ],
            Operation::PdfToDocx => &[
                "Enter the path to the PDF file",
                "Enter the path to save the DOCX file",
            ],
            Operation::ExtractFonts | Operation::ExtractTables => {
                &["Enter the path to the PDF file"]
            },
            Operation::SplitPdf => &[
                "Enter the path to the PDF file",
                "Enter the directory to save the split pages",
            ],
        }
    }
}

/// Zero-based page window for PDF to DOCX conversion. `end` is exclusive.
///
/// The default window covers every page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageRange {
    pub start: usize,
    pub end: Option<usize>,
}

impl PageRange {
    /// Resolves the range against a document with `page_count` pages.
    ///
    /// An open end runs to the last page; an end past the last page is clamped.
    pub fn resolve(&self, page_count: usize) -> Option<std::ops::Range<usize>> {
        let end = self.end.map_or(page_count, |end| end.min(page_count));
        (self.start < end).then_some(self.start..end)
    }
}

/// Text plus the single run style applied to it by the document builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledText {
    pub text: String,
    pub font_name: String,
    /// Size in points.
    pub font_size: f32,
}

/// One font referenced by a PDF page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FontInfo {
    /// Object number of the font dictionary, 0 when it is inline.
    pub xref: u32,
    /// Kind of embedded font program (`ttf`, `cff`, ...), `n/a` when not embedded.
    pub ext: String,
    /// Font subtype, e.g. `Type1`, `TrueType`, `Type0`.
    pub font_type: String,
    pub base_font: String,
    /// Resource name the page content uses, e.g. `F1`.
    pub name: String,
    pub encoding: String,
}

/// Fonts of a single page. `page` is zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFonts {
    pub page: usize,
    pub fonts: Vec<FontInfo>,
}

/// A grid of cells detected on a page. `page` is one-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedTable {
    pub page: usize,
    pub rows: Vec<Vec<Option<String>>>,
}

/// A single-page file produced by splitting. `page` is one-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitPage {
    pub page: usize,
    pub path: PathBuf,
}

/// The success payload of an operation, handed to the reporting layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Converted {
        input: PathBuf,
        output: PathBuf,
        pages: usize,
    },
    Fonts {
        input: PathBuf,
        pages: Vec<PageFonts>,
    },
    Tables {
        input: PathBuf,
        tables: Vec<ExtractedTable>,
    },
    Split {
        input: PathBuf,
        pages: Vec<SplitPage>,
    },
    Created {
        output: PathBuf,
    },
}
