//! Positioned text spans, read through `pdf-extract`.
//!
//! `pdf-extract` walks every page's content stream, including Form XObjects, and
//! decodes glyphs through ToUnicode maps, `/Encoding` and `/Differences`. The
//! characters it reports are merged into spans while each one continues the
//! previous on the same baseline.

use crate::error::{AppError, Result};
use lopdf::{Document, Object};
use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// Characters starting within this fraction of the font size of the previous
/// character's end continue its span.
const JOIN_TOLERANCE_EM: f32 = 0.1;

/// A run of characters drawn next to each other at one size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// Left edge of the span's baseline, in page space.
    pub x: f32,
    /// Baseline height, in page space (origin at the bottom of the page).
    pub y: f32,
    pub width: f32,
    /// Font size after all scaling has been applied.
    pub font_size: f32,
    pub text: String,
}

impl TextSpan {
    pub fn x_end(&self) -> f32 {
        self.x + self.width
    }

    fn continues(&self, x: f32, y: f32, size: f32) -> bool {
        let tolerance = JOIN_TOLERANCE_EM * self.font_size.max(size);
        (self.y - y).abs() <= tolerance
            && (x - self.x_end()).abs() <= tolerance
            && (self.font_size - size).abs() <= 0.5
    }
}

/// Collects the spans of every page `pdf-extract` visits, in page order.
#[derive(Debug, Default)]
struct SpanCollector {
    pages: Vec<Vec<TextSpan>>,
    current: Option<TextSpan>,
}

impl SpanCollector {
    fn flush(&mut self) {
        let Some(span) = self.current.take() else {
            return;
        };
        if span.text.trim().is_empty() {
            return;
        }
        if let Some(page) = self.pages.last_mut() {
            page.push(span);
        }
    }
}

impl OutputDev for SpanCollector {
    fn begin_page(
        &mut self,
        _page_num: u32,
        _media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.flush();
        self.pages.push(Vec::new());
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        self.flush();
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        text: &str,
    ) -> std::result::Result<(), OutputError> {
        let (x, y) = (trm.m31 as f32, trm.m32 as f32);
        let size = (font_size * trm.m21.hypot(trm.m22)).abs() as f32;
        let advance = (width * font_size * trm.m11.hypot(trm.m12)) as f32;
        if !size.is_finite() || size <= 0.0 {
            return Ok(());
        }

        match self.current.as_mut() {
            Some(span) if span.continues(x, y, size) => {
                span.text.push_str(text);
                span.width = span.width.max(x + advance - span.x);
            },
            _ => {
                self.flush();
                self.current = Some(TextSpan {
                    x,
                    y,
                    width: advance.max(0.0),
                    font_size: size,
                    text: text.to_string(),
                });
            },
        }
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }
}

/// Empties image XObject streams; `pdf-extract` would otherwise read them as content.
fn drop_image_data(doc: &mut Document) {
    for object in doc.objects.values_mut() {
        if let Object::Stream(stream) = object {
            let is_image = matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image");
            if is_image {
                stream.dict.remove(b"Filter");
                stream.dict.remove(b"DecodeParms");
                stream.set_content(Vec::new());
            }
        }
    }
}

/// Extracts the positioned text spans of every page, in page order.
pub fn document_spans(doc: &Document) -> Result<Vec<Vec<TextSpan>>> {
    let mut text_doc = doc.clone();
    drop_image_data(&mut text_doc);

    let mut collector = SpanCollector::default();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::output_doc(&text_doc, &mut collector)
    }));
    match outcome {
        Ok(Ok(())) => {},
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            warn!("Text extraction panicked");
            return Err(AppError::Document(
                "text extraction failed on a malformed page".to_string(),
            ));
        },
    }

    debug!(
        "Extracted {} text spans from {} page(s)",
        collector.pages.iter().map(Vec::len).sum::<usize>(),
        collector.pages.len()
    );
    Ok(collector.pages)
}
