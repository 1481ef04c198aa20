//! Format conversions assembled from the PDF and DOCX collaborators.
//!
//! - `docx_to_pdf`: flows DOCX runs onto US Letter pages.
//! - `pdf_to_docx`: rebuilds paragraphs from positioned PDF text.

mod docx_to_pdf;
mod pdf_to_docx;

pub use docx_to_pdf::*;
pub use pdf_to_docx::*;
