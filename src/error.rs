//! Defines the application's primary error type `AppError` and a convenience `Result` alias.
//!
//! Uses the `thiserror` crate for ergonomic error definition and provides `From`
//! implementations to convert common external errors into `AppError` variants.
//! Errors that do not implement `Clone` are wrapped in `Arc` to allow `AppError` to be cloneable.

use std::sync::Arc;
use thiserror::Error;

/// The primary error enumeration for all application-specific errors.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// Error originating from PDF parsing or writing (`lopdf`).
    #[error("PDF Error: {0}")]
    Pdf(Arc<lopdf::Error>),

    /// Error raised while reading page text (`pdf-extract`).
    #[error("Text Extraction Error: {0}")]
    Extract(Arc<pdf_extract::OutputError>),

    /// Error raised while building or packing a DOCX file (`docx-rs`).
    #[error("DOCX Error: {0}")]
    Docx(String),

    /// Error while reading a DOCX container (`zip`).
    #[error("Archive Error: {0}")]
    Zip(Arc<zip::result::ZipError>),

    /// Error while parsing DOCX XML parts (`quick-xml`).
    #[error("XML Error: {0}")]
    Xml(Arc<quick_xml::Error>),

    /// Error during JSON serialization (`serde_json`). Wrapped in Arc as serde_json::Error is not Clone.
    #[error("JSON Serialization Error: {0}")]
    Json(Arc<serde_json::Error>),

    /// Error related to standard I/O operations.
    #[error("I/O Error: {0}")]
    Io(Arc<std::io::Error>),

    /// Invalid configuration value read from the environment.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Requested page range does not fit the document.
    #[error("Page Range Error: {0}")]
    PageRange(String),

    /// Document content that could not be interpreted.
    #[error("Document Error: {0}")]
    Document(String),

    /// Error originating from user interaction prompts (`dialoguer`).
    #[error("Dialoguer Error: {0}")]
    Dialoguer(Arc<dialoguer::Error>),

    /// Error related to progress bar style templating (`indicatif`).
    #[error("Progress Style Template Error: {0}")]
    Template(Arc<indicatif::style::TemplateError>),
}

/// A specialized `Result` type using the application's `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

// --- From implementations ---
// These allow easy conversion from external error types into AppError
// using the `?` operator. Arc is used for non-Clone error types.

impl From<lopdf::Error> for AppError {
    fn from(err: lopdf::Error) -> Self {
        AppError::Pdf(Arc::new(err))
    }
}

impl From<pdf_extract::OutputError> for AppError {
    fn from(err: pdf_extract::OutputError) -> Self {
        match err {
            pdf_extract::OutputError::PdfError(e) => AppError::Pdf(Arc::new(e)),
            other => AppError::Extract(Arc::new(other)),
        }
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::Zip(Arc::new(err))
    }
}

impl From<quick_xml::Error> for AppError {
    fn from(err: quick_xml::Error) -> Self {
        AppError::Xml(Arc::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(Arc::new(err))
    }
}

impl From<dialoguer::Error> for AppError {
    fn from(err: dialoguer::Error) -> Self {
        AppError::Dialoguer(Arc::new(err))
    }
}

impl From<indicatif::style::TemplateError> for AppError {
    fn from(err: indicatif::style::TemplateError) -> Self {
        AppError::Template(Arc::new(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Json(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_keep_their_message() {
        let err: AppError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing.pdf not found").into();
        assert_eq!(err.to_string(), "I/O Error: missing.pdf not found");
        // Cloning shares the wrapped source.
        let copy = err.clone();
        assert_eq!(copy.to_string(), err.to_string());
    }

    #[test]
    fn extraction_errors_from_the_parser_stay_pdf_errors() {
        let err: AppError = pdf_extract::OutputError::PdfError(lopdf::Error::DictKey).into();
        assert!(matches!(err, AppError::Pdf(_)));

        let err: AppError = pdf_extract::OutputError::FormatError(std::fmt::Error).into();
        assert!(err.to_string().starts_with("Text Extraction Error: "));
    }

    #[test]
    fn page_range_errors_display_detail() {
        let err = AppError::PageRange("start page 4 is beyond the last page (2)".to_string());
        assert!(err.to_string().contains("beyond the last page"));
    }
}
