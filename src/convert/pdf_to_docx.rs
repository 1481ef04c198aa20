//! PDF to DOCX: rebuilds paragraphs from positioned text, one page at a time.

use crate::docx::{blocks_document, save_docx};
use crate::error::{AppError, Result};
use crate::models::PageRange;
use crate::pdf::{document_spans, group_lines, group_paragraphs, load, TextBlock};
use indicatif::ProgressBar;
use lopdf::Document;
use std::path::Path;
use tracing::{debug, info};

/// Text blocks of every page in `range`, in page order.
pub fn page_blocks(doc: &Document, range: PageRange, progress: &ProgressBar) -> Result<Vec<Vec<TextBlock>>> {
    let page_count = doc.get_pages().len();
    let window = range.resolve(page_count).ok_or_else(|| {
        AppError::PageRange(format!(
            "pages {}..{} select nothing in a document with {} page(s)",
            range.start,
            range.end.map_or_else(|| "end".to_string(), |e| e.to_string()),
            page_count
        ))
    })?;
    progress.set_length(window.len() as u64);

    let spans = document_spans(doc)?;
    let mut pages = Vec::with_capacity(window.len());
    for (index, page) in spans.into_iter().enumerate().skip(window.start).take(window.len()) {
        let lines = group_lines(page);
        let blocks = group_paragraphs(&lines);
        debug!("Page {} rebuilt as {} paragraph(s)", index, blocks.len());
        pages.push(blocks);
        progress.inc(1);
    }
    progress.finish_and_clear();
    Ok(pages)
}

/// Converts the PDF at `input` into a DOCX at `output`. Returns the number of pages converted.
pub fn pdf_to_docx(input: &Path, output: &Path, range: PageRange, progress: &ProgressBar) -> Result<usize> {
    let doc = load(input)?;
    let pages = page_blocks(&doc, range, progress)?;
    save_docx(blocks_document(&pages), output)?;
    info!(
        "Converted {} page(s) of {} to {}",
        pages.len(),
        input.display(),
        output.display()
    );
    Ok(pages.len())
}
