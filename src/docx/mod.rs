//! DOCX collaborators.
//!
//! Includes:
//! - `builder`: writing documents with `docx-rs`.
//! - `reader`: reading paragraphs and run styles straight from the OOXML parts.

mod builder;
mod reader;

pub use builder::*;
pub use reader::*;
