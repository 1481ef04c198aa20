//! The document operations behind both the menu and the subcommands.
//!
//! `DocumentOps` is the seam the command layer depends on; `Toolkit` is the
//! implementation backed by the `pdf`, `docx` and `convert` modules.

use crate::cli::page_bar;
use crate::convert;
use crate::docx::{save_docx, styled_document};
use crate::error::{AppError, Result};
use crate::models::{ExtractedTable, PageFonts, PageRange, SplitPage, StyledText};
use crate::pdf;
use std::path::Path;
use tracing::{info, warn};

pub trait DocumentOps {
    /// Converts a DOCX file to PDF, returning the number of pages written.
    fn docx_to_pdf(&self, input: &Path, output: &Path) -> Result<usize>;

    /// Converts the pages of a PDF in `range` to DOCX, returning the number of pages converted.
    fn pdf_to_docx(&self, input: &Path, output: &Path, range: PageRange) -> Result<usize>;

    fn extract_fonts(&self, input: &Path) -> Result<Vec<PageFonts>>;

    fn extract_tables(&self, input: &Path) -> Result<Vec<ExtractedTable>>;

    /// Writes one single-page PDF per source page into `output_dir`.
    fn split_pdf(&self, input: &Path, output_dir: &Path) -> Result<Vec<SplitPage>>;

    /// Writes a DOCX holding one paragraph with one run styled as `style`.
    fn create_styled_docx(&self, output: &Path, style: &StyledText) -> Result<()>;
}

/// Operations on real files.
#[derive(Debug, Clone, Copy)]
pub struct Toolkit {
    show_progress: bool,
}

impl Toolkit {
    pub fn new(show_progress: bool) -> Self {
        Self { show_progress }
    }
}

impl DocumentOps for Toolkit {
    fn docx_to_pdf(&self, input: &Path, output: &Path) -> Result<usize> {
        info!("Converting {} to PDF", input.display());
        convert::docx_to_pdf(input, output)
    }

    fn pdf_to_docx(&self, input: &Path, output: &Path, range: PageRange) -> Result<usize> {
        info!("Converting {} to DOCX ({:?})", input.display(), range);
        let progress = page_bar(0, self.show_progress, "Converting pages")?;
        convert::pdf_to_docx(input, output, range, &progress)
    }

    fn extract_fonts(&self, input: &Path) -> Result<Vec<PageFonts>> {
        let doc = pdf::load(input)?;
        let fonts = pdf::extract_fonts(&doc);
        if fonts.iter().all(|page| page.fonts.is_empty()) {
            warn!("No fonts referenced by any page of {}", input.display());
        }
        Ok(fonts)
    }

    fn extract_tables(&self, input: &Path) -> Result<Vec<ExtractedTable>> {
        let doc = pdf::load(input)?;
        let tables = pdf::extract_tables(&doc)?;
        info!("Found {} table(s) in {}", tables.len(), input.display());
        Ok(tables)
    }

    fn split_pdf(&self, input: &Path, output_dir: &Path) -> Result<Vec<SplitPage>> {
        if !output_dir.is_dir() {
            return Err(AppError::Document(format!(
                "output directory {} does not exist",
                output_dir.display()
            )));
        }
        let doc = pdf::load(input)?;
        let progress = page_bar(
            doc.get_pages().len() as u64,
            self.show_progress,
            "Splitting pages",
        )?;
        pdf::split_pages(&doc, output_dir, &progress)
    }

    fn create_styled_docx(&self, output: &Path, style: &StyledText) -> Result<()> {
        info!(
            "Creating {} in {} {}pt",
            output.display(),
            style.font_name,
            style.font_size
        );
        save_docx(styled_document(style), output)
    }
}
