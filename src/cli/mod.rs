//! Handles Command Line Interface (CLI) related functionalities.
//!
//! Includes the clap subcommands and the `App` that dispatches them, the
//! interactive menu, progress bars, and the rendering of outcomes and errors.

mod commands;
mod menu;
mod progress;
mod report;

pub use commands::*;
pub use menu::*;
pub use progress::*;
