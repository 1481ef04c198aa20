//! Reads the text and run formatting of a DOCX file.
//!
//! Only `word/document.xml` and the document defaults in `word/styles.xml` are
//! consulted. Line breaks are kept as `'\n'`, tabs as `'\t'` and page breaks as
//! form feeds (`'\u{c}'`) inside run text. Each table row is flattened into a
//! single paragraph whose cells are separated by a tab run.

use crate::error::{AppError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::{debug, info};
use zip::ZipArchive;

/// Form feed marks an explicit page break inside run text.
pub const PAGE_BREAK: char = '\u{c}';

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocxRun {
    pub text: String,
    pub font: Option<String>,
    /// Size in points.
    pub size: Option<f32>,
    pub bold: bool,
    pub italic: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocxParagraph {
    pub runs: Vec<DocxRun>,
    pub page_break_before: bool,
}

#[cfg(test)]
impl DocxParagraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocxDocument {
    pub paragraphs: Vec<DocxParagraph>,
    /// Run font from `w:docDefaults`, if declared.
    pub default_font: Option<String>,
    /// Run size in points from `w:docDefaults`, if declared.
    pub default_size: Option<f32>,
}

/// Reads a DOCX file from disk.
pub fn read_docx(path: &Path) -> Result<DocxDocument> {
    let file = File::open(path)?;
    let document = read_docx_from(file)?;
    info!(
        "Read {} paragraph(s) from {}",
        document.paragraphs.len(),
        path.display()
    );
    Ok(document)
}

/// Reads a DOCX container from any seekable reader.
pub fn read_docx_from<R: Read + Seek>(reader: R) -> Result<DocxDocument> {
    let mut archive = ZipArchive::new(reader)?;

    let body = read_part(&mut archive, "word/document.xml")?.ok_or_else(|| {
        AppError::Document("missing word/document.xml; not a Word document".to_string())
    })?;
    let (default_font, default_size) = match read_part(&mut archive, "word/styles.xml")? {
        Some(styles) => parse_doc_defaults(&styles)?,
        None => (None, None),
    };

    Ok(DocxDocument {
        paragraphs: parse_body(&body)?,
        default_font,
        default_size,
    })
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut part = match archive.by_name(name) {
        Ok(part) => part,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    part.read_to_string(&mut content)?;
    Ok(Some(content))
}

/// Extract an attribute value by key from an element
fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Check if w:val attribute is explicitly "0" or "false" (formatting off)
fn is_off(e: &BytesStart) -> bool {
    matches!(get_attr(e, b"w:val").as_deref(), Some("0" | "false" | "off"))
}

fn half_points(e: &BytesStart) -> Option<f32> {
    get_attr(e, b"w:val")
        .and_then(|v| v.parse::<f32>().ok())
        .filter(|v| *v > 0.0)
        .map(|v| v / 2.0)
}

fn run_font(e: &BytesStart) -> Option<String> {
    get_attr(e, b"w:ascii").or_else(|| get_attr(e, b"w:hAnsi"))
}

fn parse_doc_defaults(xml: &str) -> Result<(Option<String>, Option<f32>)> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut in_defaults = false;
    let (mut font, mut size) = (None, None);

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"w:rPrDefault" => in_defaults = true,
            Event::End(e) if e.name().as_ref() == b"w:rPrDefault" => in_defaults = false,
            Event::Empty(e) if in_defaults => match e.name().as_ref() {
                b"w:rFonts" => font = run_font(&e),
                b"w:sz" => size = half_points(&e),
                _ => {},
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }
    debug!("Document defaults: font {:?}, size {:?}", font, size);
    Ok((font, size))
}

#[derive(Default)]
struct BodyWalker {
    paragraphs: Vec<DocxParagraph>,
    paragraph: DocxParagraph,
    run: DocxRun,
    in_run: bool,
    in_run_props: bool,
    in_para_props: bool,
    in_text: bool,
    /// Runs of the table row being flattened, if inside one.
    row: Option<Vec<DocxRun>>,
}

impl BodyWalker {
    fn element(&mut self, e: &BytesStart, is_empty: bool) {
        match e.name().as_ref() {
            b"w:p" => {
                self.paragraph = DocxParagraph::default();
                if is_empty {
                    self.end_paragraph();
                }
            },
            b"w:pPr" if !is_empty => self.in_para_props = true,
            b"w:pageBreakBefore" if self.in_para_props => {
                self.paragraph.page_break_before = !is_off(e);
            },
            b"w:r" if !is_empty => {
                self.run = DocxRun::default();
                self.in_run = true;
            },
            b"w:rPr" if self.in_run && !is_empty => self.in_run_props = true,
            b"w:rFonts" if self.in_run_props => self.run.font = run_font(e),
            b"w:sz" if self.in_run_props => self.run.size = half_points(e),
            b"w:b" if self.in_run_props => self.run.bold = !is_off(e),
            b"w:i" if self.in_run_props => self.run.italic = !is_off(e),
            b"w:t" if self.in_run && !is_empty => self.in_text = true,
            b"w:tab" if self.in_run && !self.in_run_props => self.run.text.push('\t'),
            b"w:br" if self.in_run => {
                if get_attr(e, b"w:type").as_deref() == Some("page") {
                    self.run.text.push(PAGE_BREAK);
                } else {
                    self.run.text.push('\n');
                }
            },
            b"w:cr" if self.in_run => self.run.text.push('\n'),
            b"w:tr" if !is_empty => self.row = Some(Vec::new()),
            b"w:tc" => {
                if let Some(row) = self.row.as_mut() {
                    if !row.is_empty() {
                        row.push(DocxRun {
                            text: "\t".to_string(),
                            ..DocxRun::default()
                        });
                    }
                }
            },
            _ => {},
        }
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"w:t" => self.in_text = false,
            b"w:rPr" => self.in_run_props = false,
            b"w:pPr" => self.in_para_props = false,
            b"w:r" if self.in_run => {
                self.in_run = false;
                let run = std::mem::take(&mut self.run);
                if !run.text.is_empty() {
                    self.paragraph.runs.push(run);
                }
            },
            b"w:p" => self.end_paragraph(),
            b"w:tr" => {
                if let Some(runs) = self.row.take() {
                    self.paragraphs.push(DocxParagraph {
                        runs,
                        page_break_before: false,
                    });
                }
            },
            _ => {},
        }
    }

    fn end_paragraph(&mut self) {
        let paragraph = std::mem::take(&mut self.paragraph);
        match self.row.as_mut() {
            Some(row) => {
                // Paragraphs inside one cell are joined with a space.
                let needs_space = row.last().is_some_and(|r| r.text != "\t");
                if needs_space && !paragraph.runs.is_empty() {
                    row.push(DocxRun {
                        text: " ".to_string(),
                        ..DocxRun::default()
                    });
                }
                row.extend(paragraph.runs);
            },
            None => self.paragraphs.push(paragraph),
        }
    }
}

fn parse_body(xml: &str) -> Result<Vec<DocxParagraph>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut walker = BodyWalker::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => walker.element(&e, false),
            Event::Empty(e) => walker.element(&e, true),
            Event::End(e) => walker.end(e.name().as_ref()),
            Event::Text(e) if walker.in_text => walker.run.text.push_str(&e.unescape()?),
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }
    Ok(walker.paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p>
      <w:pPr><w:rPr><w:b/></w:rPr></w:pPr>
      <w:r><w:rPr><w:rFonts w:ascii="Georgia" w:hAnsi="Georgia"/><w:b/><w:sz w:val="28"/></w:rPr><w:t>Title</w:t></w:r>
    </w:p>
    <w:p>
      <w:r><w:t xml:space="preserve">Fish &amp; chips </w:t></w:r>
      <w:r><w:rPr><w:i/><w:b w:val="0"/></w:rPr><w:t>today</w:t><w:br/><w:t>only</w:t></w:r>
    </w:p>
    <w:p/>
    <w:p><w:pPr><w:pageBreakBefore/></w:pPr><w:r><w:t>Next page</w:t><w:br w:type="page"/></w:r></w:p>
    <w:tbl>
      <w:tr>
        <w:tc><w:p><w:r><w:t>Name</w:t></w:r></w:p></w:tc>
        <w:tc><w:p><w:r><w:t>Qty</w:t></w:r></w:p><w:p><w:r><w:t>(units)</w:t></w:r></w:p></w:tc>
      </w:tr>
    </w:tbl>
  </w:body>
</w:document>"#;

    #[test]
    fn paragraphs_runs_and_styles_are_read() {
        let paragraphs = parse_body(BODY).unwrap();
        assert_eq!(paragraphs.len(), 5);

        let title = &paragraphs[0].runs[0];
        assert_eq!(title.text, "Title");
        assert_eq!(title.font.as_deref(), Some("Georgia"));
        assert_eq!(title.size, Some(14.0));
        assert!(title.bold);
        assert_eq!(paragraphs[0].runs.len(), 1);

        assert_eq!(paragraphs[1].text(), "Fish & chips today\nonly");
        assert!(paragraphs[1].runs[1].italic);
        assert!(!paragraphs[1].runs[1].bold);

        assert!(paragraphs[2].runs.is_empty());

        assert!(paragraphs[3].page_break_before);
        assert!(paragraphs[3].text().ends_with(PAGE_BREAK));
    }

    #[test]
    fn table_rows_flatten_to_tab_separated_paragraphs() {
        let paragraphs = parse_body(BODY).unwrap();
        assert_eq!(paragraphs[4].text(), "Name\tQty (units)");
    }

    #[test]
    fn doc_defaults_supply_font_and_size() {
        let styles = r#"<w:styles xmlns:w="x"><w:docDefaults><w:rPrDefault><w:rPr>
            <w:rFonts w:ascii="Calibri" w:hAnsi="Calibri"/><w:sz w:val="22"/>
            </w:rPr></w:rPrDefault></w:docDefaults>
            <w:style w:styleId="Big"><w:rPr><w:sz w:val="48"/></w:rPr></w:style></w:styles>"#;
        let (font, size) = parse_doc_defaults(styles).unwrap();
        assert_eq!(font.as_deref(), Some("Calibri"));
        assert_eq!(size, Some(11.0));
    }

    #[test]
    fn non_zip_input_is_an_archive_error() {
        let result = read_docx_from(std::io::Cursor::new(b"plain text, not a zip".to_vec()));
        assert!(matches!(result, Err(AppError::Zip(_))));
    }
}
