//! Writes DOCX files with `docx-rs`.

use crate::error::{AppError, Result};
use crate::models::StyledText;
use crate::pdf::TextBlock;
use docx_rs::{BreakType, Docx, Paragraph, Run, RunFonts};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Converts a size in points to the half-points DOCX stores, rounding to the nearest half point.
pub fn half_points(size: f32) -> usize {
    (size * 2.0).round().max(1.0) as usize
}

fn styled_run(text: &str, font_name: &str, font_size: f32) -> Run {
    Run::new()
        .add_text(text)
        .fonts(
            RunFonts::new()
                .ascii(font_name)
                .hi_ansi(font_name)
                .east_asia(font_name)
                .cs(font_name),
        )
        .size(half_points(font_size))
}

/// A document holding one paragraph with one run styled as requested.
pub fn styled_document(style: &StyledText) -> Docx {
    Docx::new().add_paragraph(Paragraph::new().add_run(styled_run(
        &style.text,
        &style.font_name,
        style.font_size,
    )))
}

/// A document with one paragraph per text block, pages separated by page breaks.
///
/// Runs carry the block's size and leave the font to the document defaults.
pub fn blocks_document(pages: &[Vec<TextBlock>]) -> Docx {
    let mut docx = Docx::new();
    for (index, blocks) in pages.iter().enumerate() {
        if index > 0 {
            docx = docx.add_paragraph(
                Paragraph::new().add_run(Run::new().add_break(BreakType::Page)),
            );
        }
        for block in blocks {
            let size = if block.font_size > 0.0 {
                block.font_size
            } else {
                crate::config::DEFAULT_FONT_SIZE
            };
            let run = Run::new().add_text(&block.text).size(half_points(size));
            docx = docx.add_paragraph(Paragraph::new().add_run(run));
        }
    }
    docx
}

/// Packs a document into a file at `path`.
pub fn save_docx(docx: Docx, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    docx.build()
        .pack(file)
        .map_err(|e| AppError::Docx(e.to_string()))?;
    info!("Wrote DOCX to {}", path.display());
    Ok(())
}
