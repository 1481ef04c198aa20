//! Progress bars for per-page loops.

use crate::error::Result;
use indicatif::{ProgressBar, ProgressStyle};

/// A bar counting pages, or a hidden one when progress output is disabled.
///
/// The length is a starting estimate; handlers reset it once the page count is known.
pub fn page_bar(len: u64, enabled: bool, message: &str) -> Result<ProgressBar> {
    if !enabled {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("#>-"),
    );
    bar.set_message(message.to_string());
    Ok(bar)
}
