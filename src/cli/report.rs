//! Turns operation outcomes and errors into the text printed to the operator.

use super::Action;
use crate::error::{AppError, Result};
use crate::models::{ExtractedTable, Outcome, PageFonts};
use crate::pdf::display_name;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

/// Plain-text report of a successful operation.
pub fn render(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Converted { input, output, .. } => {
            format!("Converted {} to {}.", input.display(), output.display())
        },
        Outcome::Fonts { input, pages } => {
            let mut out = format!("Extracted fonts from {}:", input.display());
            for page in pages {
                out.push('\n');
                out.push_str(&fonts_table(page));
            }
            out
        },
        Outcome::Tables { input, tables } => {
            if tables.is_empty() {
                return format!("No tables found in {}.", input.display());
            }
            tables
                .iter()
                .map(table_grid)
                .collect::<Vec<_>>()
                .join("\n")
        },
        Outcome::Split { pages, .. } => pages
            .iter()
            .map(|p| format!("Extracted page {} to {}.", p.page, p.path.display()))
            .collect::<Vec<_>>()
            .join("\n"),
        Outcome::Created { output } => {
            format!("Created Word document {} with styles.", output.display())
        },
    }
}

/// Pretty-printed JSON report of a successful operation.
pub fn render_json(outcome: &Outcome) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcome)?)
}

/// The single-line failure report for `command`.
pub fn failure_message(command: &Action, err: &AppError) -> String {
    match command {
        Action::DocxToPdf(args) => {
            format!("Error converting {} to PDF: {}", args.input.display(), err)
        },
        Action::PdfToDocx(args) => {
            format!("Error converting {} to DOCX: {}", args.input.display(), err)
        },
        Action::Fonts(args) => {
            format!("Error extracting fonts from {}: {}", args.input.display(), err)
        },
        Action::Tables(args) => {
            format!("Error extracting tables from {}: {}", args.input.display(), err)
        },
        Action::Split(args) => format!("Error splitting {}: {}", args.input.display(), err),
        Action::Create(args) => format!(
            "Error creating Word document {}: {}",
            args.output.display(),
            err
        ),
    }
}

fn fonts_table(page: &PageFonts) -> String {
    if page.fonts.is_empty() {
        return format!("Page {}: no fonts", page.page);
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Xref", "Ext", "Type", "Base Font", "Name", "Encoding"]);
    for font in &page.fonts {
        table.add_row(vec![
            font.xref.to_string(),
            font.ext.clone(),
            font.font_type.clone(),
            display_name(font).to_string(),
            font.name.clone(),
            font.encoding.clone(),
        ]);
    }
    format!("Page {}:\n{}", page.page, table)
}

fn table_grid(table: &ExtractedTable) -> String {
    let mut grid = Table::new();
    grid.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    for row in &table.rows {
        grid.add_row(
            row.iter()
                .map(|cell| cell.clone().unwrap_or_default())
                .collect::<Vec<_>>(),
        );
    }
    format!("Table from page {}:\n{}", table.page, grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{PdfArgs, SplitArgs};
    use crate::models::{FontInfo, SplitPage};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn not_found() -> AppError {
        AppError::Io(Arc::new(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "No such file or directory",
        )))
    }

    #[test]
    fn failures_name_the_input_and_the_error() {
        let command = Action::Fonts(PdfArgs {
            input: PathBuf::from("missing.pdf"),
        });
        assert_eq!(
            failure_message(&command, &not_found()),
            "Error extracting fonts from missing.pdf: I/O Error: No such file or directory"
        );

        let command = Action::Split(SplitArgs {
            input: PathBuf::from("in.pdf"),
            output_dir: PathBuf::from("out"),
        });
        assert!(failure_message(&command, &not_found()).starts_with("Error splitting in.pdf: "));
    }

    #[test]
    fn split_reports_one_line_per_page() {
        let outcome = Outcome::Split {
            input: PathBuf::from("in.pdf"),
            pages: (1..=2)
                .map(|page| SplitPage {
                    page,
                    path: PathBuf::from(format!("out/page_{page}.pdf")),
                })
                .collect(),
        };
        assert_eq!(
            render(&outcome),
            "Extracted page 1 to out/page_1.pdf.\nExtracted page 2 to out/page_2.pdf."
        );
    }

    #[test]
    fn tables_render_with_page_headers_and_blank_missing_cells() {
        let outcome = Outcome::Tables {
            input: PathBuf::from("report.pdf"),
            tables: vec![ExtractedTable {
                page: 2,
                rows: vec![
                    vec![Some("Item".to_string()), Some("Qty".to_string())],
                    vec![Some("Widget".to_string()), None],
                ],
            }],
        };
        let text = render(&outcome);
        assert!(text.starts_with("Table from page 2:\n"));
        assert!(text.contains("Widget"));
        assert!(text.contains("Qty"));
    }

    #[test]
    fn fonts_render_one_table_per_page() {
        let outcome = Outcome::Fonts {
            input: PathBuf::from("doc.pdf"),
            pages: vec![
                PageFonts {
                    page: 0,
                    fonts: vec![FontInfo {
                        xref: 7,
                        ext: "ttf".to_string(),
                        font_type: "TrueType".to_string(),
                        base_font: "ABCDEF+Calibri".to_string(),
                        name: "F1".to_string(),
                        encoding: "WinAnsiEncoding".to_string(),
                    }],
                },
                PageFonts {
                    page: 1,
                    fonts: vec![],
                },
            ],
        };
        let text = render(&outcome);
        assert!(text.starts_with("Extracted fonts from doc.pdf:\nPage 0:\n"));
        assert!(text.contains("Calibri"));
        assert!(!text.contains("ABCDEF+"));
        assert!(text.ends_with("Page 1: no fonts"));
    }

    #[test]
    fn json_output_is_tagged_by_kind() {
        let outcome = Outcome::Created {
            output: PathBuf::from("styled.docx"),
        };
        let json: serde_json::Value = serde_json::from_str(&render_json(&outcome).unwrap()).unwrap();
        assert_eq!(json["kind"], "created");
        assert_eq!(json["output"], "styled.docx");
    }
}
