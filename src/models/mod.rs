//! Defines the data structures and models used throughout the application.
//!
//! This includes the closed set of menu operations, the parameters handed to each
//! operation, and the results each operation reports back to the CLI.

mod document;

pub use document::*;
