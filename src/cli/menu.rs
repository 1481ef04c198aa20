//! The interactive five-option menu.

use super::{Action, App, ConvertArgs, PdfArgs, PdfToDocxArgs, SplitArgs};
use crate::error::{AppError, Result};
use crate::models::Operation;
use crate::toolkit::DocumentOps;
use colored::*;
use dialoguer::{theme::ColorfulTheme, Input};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

pub const CHOICE_PROMPT: &str = "Enter your choice (1-5)";
pub const INVALID_CHOICE: &str = "Invalid choice. Exiting.";

/// Source of operator input for the menu.
pub trait Prompter {
    /// Reads the raw selector. May be empty.
    fn choice(&mut self, prompt: &str) -> Result<String>;

    /// Reads a non-empty path.
    fn path(&mut self, prompt: &str) -> Result<PathBuf>;
}

/// Reads from the terminal with `dialoguer`.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Prompter for TerminalPrompter {
    fn choice(&mut self, prompt: &str) -> Result<String> {
        let choice = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(choice)
    }

    fn path(&mut self, prompt: &str) -> Result<PathBuf> {
        let path = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .validate_with(|input: &String| -> std::result::Result<(), &str> {
                if input.trim().is_empty() {
                    Err("A path is required")
                } else {
                    Ok(())
                }
            })
            .interact_text()?;
        Ok(PathBuf::from(path))
    }
}

/// Reads plain lines, for when stdin is not a terminal.
pub struct LinePrompter<R: BufRead> {
    input: R,
}

impl<R: BufRead> LinePrompter<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{}: ", prompt);
        std::io::stdout().flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.strip_suffix('\n').unwrap_or(&line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Ok(Some(trimmed.to_string()))
    }
}

impl<R: BufRead> Prompter for LinePrompter<R> {
    fn choice(&mut self, prompt: &str) -> Result<String> {
        Ok(self.read_line(prompt)?.unwrap_or_default())
    }

    fn path(&mut self, prompt: &str) -> Result<PathBuf> {
        loop {
            match self.read_line(prompt)? {
                Some(line) if line.trim().is_empty() => println!("A path is required"),
                Some(line) => return Ok(PathBuf::from(line)),
                None => {
                    return Err(AppError::Document(format!(
                        "input ended before answering '{}'",
                        prompt
                    )))
                },
            }
        }
    }
}

/// The menu listing, one operation per line.
pub fn menu_text() -> String {
    let mut text = String::from("Select an option:");
    for op in Operation::ALL {
        text.push_str(&format!("\n{}. {}", op.selector(), op.label()));
    }
    text
}

/// Collects the parameters of `op` in prompt order and builds its action.
pub fn prompt_command<P: Prompter>(op: Operation, prompter: &mut P) -> Result<Action> {
    let mut paths = Vec::with_capacity(2);
    for prompt in op.prompts() {
        paths.push(prompter.path(prompt)?);
    }
    let mut paths = paths.into_iter();
    let mut next = || paths.next().unwrap_or_default();

    Ok(match op {
        Operation::DocxToPdf => Action::DocxToPdf(ConvertArgs {
            input: next(),
            output: next(),
        }),
        Operation::PdfToDocx => Action::PdfToDocx(PdfToDocxArgs {
            input: next(),
            output: next(),
            start: 0,
            end: None,
        }),
        Operation::ExtractFonts => Action::Fonts(PdfArgs { input: next() }),
        Operation::ExtractTables => Action::Tables(PdfArgs { input: next() }),
        Operation::SplitPdf => Action::Split(SplitArgs {
            input: next(),
            output_dir: next(),
        }),
    })
}

/// Shows the menu, reads one selection and runs at most one operation.
///
/// Returns the action that ran, or `None` for an invalid selector.
pub fn run_menu<O: DocumentOps, P: Prompter>(
    app: &App<O>,
    prompter: &mut P,
) -> Result<Option<Action>> {
    println!("{}", menu_text().cyan());
    let choice = prompter.choice(CHOICE_PROMPT)?;

    let Some(op) = Operation::from_selector(&choice) else {
        warn!("Rejected menu selector {:?}", choice);
        println!("{}", INVALID_CHOICE.yellow());
        return Ok(None);
    };
    info!("Menu selection: {}", op.label());

    let command = prompt_command(op, prompter)?;
    app.execute(command.clone());
    Ok(Some(command))
}
