use super::report::{failure_message, render, render_json};
use crate::config::{parse_font_size, Config};
use crate::error::Result;
use crate::models::{Outcome, PageRange, StyledText};
use crate::toolkit::DocumentOps;
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing::{error, info};

/// Convert, inspect and split DOCX and PDF documents
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Hide progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Operation to run; the interactive menu opens when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    #[command(flatten)]
    Run(Action),

    /// Open the interactive menu
    Menu,
}

/// A single document operation.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Action {
    /// Convert a DOCX document to PDF
    DocxToPdf(ConvertArgs),

    /// Convert a PDF document to DOCX
    PdfToDocx(PdfToDocxArgs),

    /// List the fonts used on every page of a PDF
    Fonts(PdfArgs),

    /// Print the tables found on every page of a PDF
    Tables(PdfArgs),

    /// Write every page of a PDF to its own file
    Split(SplitArgs),

    /// Create a DOCX holding one styled paragraph
    Create(CreateArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ConvertArgs {
    /// Document to convert
    pub input: PathBuf,

    /// Where to write the converted document
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct PdfToDocxArgs {
    /// PDF to convert
    pub input: PathBuf,

    /// Where to write the DOCX
    pub output: PathBuf,

    /// First page to convert, counted from zero
    #[arg(long, default_value_t = 0)]
    pub start: usize,

    /// Page to stop before, counted from zero (default: convert to the last page)
    #[arg(long)]
    pub end: Option<usize>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct PdfArgs {
    /// PDF to inspect
    pub input: PathBuf,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct SplitArgs {
    /// PDF to split
    pub input: PathBuf,

    /// Existing directory receiving page_<n>.pdf files
    pub output_dir: PathBuf,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct CreateArgs {
    /// Where to write the DOCX
    pub output: PathBuf,

    /// Paragraph text
    pub text: String,

    /// Run font (default: DOCSHIFT_FONT_NAME or Arial)
    #[arg(long)]
    pub font_name: Option<String>,

    /// Run size in points, rounded to the nearest half point (default: DOCSHIFT_FONT_SIZE or 12)
    #[arg(long, value_parser = parse_font_size)]
    pub font_size: Option<f32>,
}

/// CLI application
pub struct App<O: DocumentOps> {
    ops: O,
    config: Config,
    json: bool,
}

impl<O: DocumentOps> App<O> {
    pub fn new(ops: O, config: Config, json: bool) -> Self {
        Self { ops, config, json }
    }

    /// Runs one operation and returns its outcome without printing anything.
    pub fn run_command(&self, command: Action) -> Result<Outcome> {
        match command {
            Action::DocxToPdf(args) => {
                let pages = self.ops.docx_to_pdf(&args.input, &args.output)?;
                Ok(Outcome::Converted {
                    input: args.input,
                    output: args.output,
                    pages,
                })
            },
            Action::PdfToDocx(args) => {
                let range = PageRange {
                    start: args.start,
                    end: args.end,
                };
                let pages = self.ops.pdf_to_docx(&args.input, &args.output, range)?;
                Ok(Outcome::Converted {
                    input: args.input,
                    output: args.output,
                    pages,
                })
            },
            Action::Fonts(args) => {
                let pages = self.ops.extract_fonts(&args.input)?;
                Ok(Outcome::Fonts {
                    input: args.input,
                    pages,
                })
            },
            Action::Tables(args) => {
                let tables = self.ops.extract_tables(&args.input)?;
                Ok(Outcome::Tables {
                    input: args.input,
                    tables,
                })
            },
            Action::Split(args) => {
                let pages = self.ops.split_pdf(&args.input, &args.output_dir)?;
                Ok(Outcome::Split {
                    input: args.input,
                    pages,
                })
            },
            Action::Create(args) => {
                let style = StyledText {
                    text: args.text,
                    font_name: args
                        .font_name
                        .unwrap_or_else(|| self.config.font_name.clone()),
                    font_size: args.font_size.unwrap_or(self.config.font_size),
                };
                self.ops.create_styled_docx(&args.output, &style)?;
                Ok(Outcome::Created {
                    output: args.output,
                })
            },
        }
    }

    /// The text reported for a finished command, without colour.
    pub fn report(&self, command: &Action, result: &Result<Outcome>) -> String {
        match result {
            Ok(outcome) if self.json => {
                render_json(outcome).unwrap_or_else(|e| failure_message(command, &e))
            },
            Ok(outcome) => render(outcome),
            Err(e) => failure_message(command, e),
        }
    }

    /// Runs a command and prints its outcome. Failures are printed, never returned.
    pub fn execute(&self, command: Action) -> bool {
        info!("Running {:?}", command);
        let result = self.run_command(command.clone());
        let message = self.report(&command, &result);
        match &result {
            Ok(_) => println!("{}", message),
            Err(e) => {
                error!("Command failed: {:?}", e);
                println!("{}", message.red());
            },
        }
        result.is_ok()
    }
}
