//! DOCX to PDF: reads runs from the DOCX and flows them onto pages.

use crate::config::DEFAULT_FONT_SIZE;
use crate::docx::{read_docx, DocxDocument, DocxParagraph, PAGE_BREAK};
use crate::error::Result;
use crate::pdf::{standard_font, text_width, PageSize, PdfBuilder, Placement, LETTER};
use std::path::Path;
use tracing::{debug, info};

const LINE_HEIGHT: f32 = 1.2;
const PARAGRAPH_SPACING: f32 = 0.5;
const TAB: &str = "    ";

/// Page geometry used when flowing text.
#[derive(Debug, Clone, Copy)]
pub struct FlowSettings {
    pub page: PageSize,
    pub margin: f32,
}

impl Default for FlowSettings {
    fn default() -> Self {
        FlowSettings {
            page: LETTER,
            margin: 72.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Piece {
    font: &'static str,
    size: f32,
    text: String,
    width: f32,
}

struct Flow {
    settings: FlowSettings,
    builder: PdfBuilder,
    page: Vec<Placement>,
    cursor_y: f32,
    line: Vec<Piece>,
    line_width: f32,
}

impl Flow {
    fn new(settings: FlowSettings) -> Self {
        Flow {
            settings,
            builder: PdfBuilder::with_page_size(settings.page),
            page: Vec::new(),
            cursor_y: settings.page.height - settings.margin,
            line: Vec::new(),
            line_width: 0.0,
        }
    }

    fn available_width(&self) -> f32 {
        self.settings.page.width - 2.0 * self.settings.margin
    }

    fn page_started(&self) -> bool {
        self.cursor_y < self.settings.page.height - self.settings.margin
    }

    fn break_page(&mut self) {
        if !self.line.is_empty() {
            self.flush_line(DEFAULT_FONT_SIZE);
        }
        let page = std::mem::take(&mut self.page);
        self.builder.add_page(page);
        self.cursor_y = self.settings.page.height - self.settings.margin;
    }

    /// Places the pending line; an empty line advances by `min_size`.
    fn flush_line(&mut self, min_size: f32) {
        let size = if self.line.is_empty() {
            min_size
        } else {
            self.line.iter().map(|p| p.size).fold(0.0, f32::max)
        };
        let height = size * LINE_HEIGHT;
        if self.cursor_y - height < self.settings.margin && self.page_started() {
            let line = std::mem::take(&mut self.line);
            self.break_page();
            self.line = line;
        }

        let baseline = self.cursor_y - size;
        let mut x = self.settings.margin;
        for piece in std::mem::take(&mut self.line) {
            if !piece.text.trim().is_empty() {
                self.page.push(Placement::new(
                    x,
                    baseline,
                    piece.font,
                    piece.size,
                    piece.text.trim_end(),
                ));
            }
            x += piece.width;
        }
        self.cursor_y -= height;
        self.line_width = 0.0;
    }

    fn push(&mut self, piece: Piece) {
        let is_space = piece.text.trim().is_empty();
        if self.line_width + piece.width > self.available_width() && !self.line.is_empty() {
            self.flush_line(piece.size);
            if is_space {
                return;
            }
        }
        if is_space && self.line.is_empty() {
            return;
        }
        if piece.width > self.available_width() {
            self.push_hard_wrapped(piece);
            return;
        }

        self.line_width += piece.width;
        match self.line.last_mut() {
            Some(last) if last.font == piece.font && last.size == piece.size => {
                last.text.push_str(&piece.text);
                last.width += piece.width;
            },
            _ => self.line.push(piece),
        }
    }

    /// Breaks a word wider than the text column at character boundaries.
    fn push_hard_wrapped(&mut self, piece: Piece) {
        let mut chunk = String::new();
        for c in piece.text.chars() {
            let candidate = format!("{chunk}{c}");
            if text_width(piece.font, piece.size, &candidate) > self.available_width() && !chunk.is_empty() {
                let width = text_width(piece.font, piece.size, &chunk);
                self.line.push(Piece {
                    text: std::mem::take(&mut chunk),
                    width,
                    ..piece.clone()
                });
                self.flush_line(piece.size);
                chunk.push(c);
            } else {
                chunk = candidate;
            }
        }
        if !chunk.is_empty() {
            let width = text_width(piece.font, piece.size, &chunk);
            self.line_width += width;
            self.line.push(Piece {
                text: chunk,
                width,
                ..piece
            });
        }
    }

    fn paragraph(&mut self, paragraph: &DocxParagraph, defaults: &DocxDocument) {
        if paragraph.page_break_before && (self.page_started() || !self.page.is_empty()) {
            self.break_page();
        }

        let fallback_font = defaults.default_font.as_deref().unwrap_or("Helvetica");
        let fallback_size = defaults.default_size.unwrap_or(DEFAULT_FONT_SIZE);
        let mut paragraph_size = fallback_size;
        let mut ended_with_page_break = false;

        for run in &paragraph.runs {
            let font = standard_font(run.font.as_deref().unwrap_or(fallback_font), run.bold, run.italic);
            let size = run.size.unwrap_or(fallback_size);
            paragraph_size = size;

            for token in tokens(&run.text) {
                ended_with_page_break = false;
                match token {
                    "\n" => self.flush_line(size),
                    t if t.starts_with(PAGE_BREAK) => {
                        self.break_page();
                        ended_with_page_break = true;
                    },
                    text => {
                        let text = if text == "\t" { TAB } else { text };
                        self.push(Piece {
                            font,
                            size,
                            text: text.to_string(),
                            width: text_width(font, size, text),
                        });
                    },
                }
            }
        }

        if !self.line.is_empty() {
            self.flush_line(paragraph_size);
        } else if paragraph.runs.is_empty() {
            // An empty paragraph still takes one line.
            self.flush_line(paragraph_size);
        }
        if !ended_with_page_break {
            self.cursor_y -= paragraph_size * PARAGRAPH_SPACING;
        }
    }

    fn finish(mut self) -> PdfBuilder {
        if !self.line.is_empty() {
            self.flush_line(DEFAULT_FONT_SIZE);
        }
        if !self.page.is_empty() || self.builder.page_count() == 0 {
            let page = std::mem::take(&mut self.page);
            self.builder.add_page(page);
        }
        self.builder
    }
}

/// Splits run text into words, single whitespace characters and break markers.
fn tokens(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() || c == PAGE_BREAK {
            if let Some(s) = start.take() {
                out.push(&text[s..i]);
            }
            out.push(&text[i..i + c.len_utf8()]);
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push(&text[s..]);
    }
    out
}

/// Lays out a parsed DOCX document as PDF pages.
pub fn layout_document(document: &DocxDocument, settings: FlowSettings) -> PdfBuilder {
    let mut flow = Flow::new(settings);
    for paragraph in &document.paragraphs {
        flow.paragraph(paragraph, document);
    }
    let builder = flow.finish();
    debug!("Laid out {} page(s)", builder.page_count());
    builder
}

/// Converts the DOCX at `input` into a PDF at `output`. Returns the page count.
pub fn docx_to_pdf(input: &Path, output: &Path) -> Result<usize> {
    let document = read_docx(input)?;
    let pages = layout_document(&document, FlowSettings::default()).save(output)?;
    info!(
        "Converted {} to {} ({} page(s))",
        input.display(),
        output.display(),
        pages
    );
    Ok(pages)
}
