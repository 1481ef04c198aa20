//! Table detection from text alignment.
//!
//! A table is a run of at least two consecutive lines that each split into two or
//! more cells, where every cell lines up with one of the columns opened by the
//! first line of the run. Cells a row leaves out are reported as `None`.

use super::{document_spans, group_lines, Cell, TextLine};
use crate::error::Result;
use crate::models::ExtractedTable;
use lopdf::Document;
use tracing::debug;

/// Rows further apart than this many line heights end the current table.
const MAX_ROW_GAP_EM: f32 = 3.0;

#[derive(Debug, Clone)]
struct Column {
    x: f32,
    x_end: f32,
}

impl Column {
    fn accepts(&self, cell: &Cell, tolerance: f32) -> bool {
        let overlaps = cell.x <= self.x_end && cell.x_end >= self.x;
        overlaps || (cell.x - self.x).abs() <= tolerance || (cell.x_end - self.x_end).abs() <= tolerance
    }
}

#[derive(Debug, Default)]
struct Candidate {
    columns: Vec<Column>,
    rows: Vec<Vec<Option<String>>>,
    last_y: f32,
}

impl Candidate {
    fn start(cells: &[Cell], y: f32) -> Self {
        Candidate {
            columns: cells
                .iter()
                .map(|c| Column {
                    x: c.x,
                    x_end: c.x_end,
                })
                .collect(),
            rows: vec![cells.iter().map(|c| Some(c.text.clone())).collect()],
            last_y: y,
        }
    }

    /// Places each cell in a column, left to right, one cell per column.
    fn align(&self, cells: &[Cell], tolerance: f32) -> Option<Vec<usize>> {
        let mut next_column = 0;
        let mut placement = Vec::with_capacity(cells.len());
        for cell in cells {
            let offset = self.columns[next_column..]
                .iter()
                .position(|col| col.accepts(cell, tolerance))?;
            placement.push(next_column + offset);
            next_column += offset + 1;
        }
        Some(placement)
    }

    fn push(&mut self, cells: &[Cell], placement: &[usize], y: f32) {
        let mut row = vec![None; self.columns.len()];
        for (cell, &col) in cells.iter().zip(placement) {
            row[col] = Some(cell.text.clone());
            let column = &mut self.columns[col];
            column.x = column.x.min(cell.x);
            column.x_end = column.x_end.max(cell.x_end);
        }
        self.rows.push(row);
        self.last_y = y;
    }

    fn finish(self) -> Option<Vec<Vec<Option<String>>>> {
        (self.rows.len() >= 2 && self.columns.len() >= 2).then_some(self.rows)
    }
}

/// Finds aligned grids in a page's lines, top to bottom.
pub fn detect_tables(lines: &[TextLine]) -> Vec<Vec<Vec<Option<String>>>> {
    let mut tables = Vec::new();
    let mut current: Option<Candidate> = None;

    for line in lines {
        let cells = line.cells();
        let size = line.font_size().max(1.0);

        if cells.len() < 2 {
            if let Some(table) = current.take().and_then(Candidate::finish) {
                tables.push(table);
            }
            continue;
        }

        if let Some(candidate) = current.as_mut() {
            let close_enough = candidate.last_y - line.y <= MAX_ROW_GAP_EM * size * 1.2;
            if close_enough {
                if let Some(placement) = candidate.align(&cells, size) {
                    candidate.push(&cells, &placement, line.y);
                    continue;
                }
            }
        }

        if let Some(table) = current.take().and_then(Candidate::finish) {
            tables.push(table);
        }
        current = Some(Candidate::start(&cells, line.y));
    }

    if let Some(table) = current.and_then(Candidate::finish) {
        tables.push(table);
    }
    tables
}

/// Extracts the tables of every page, numbering pages from one.
pub fn extract_tables(doc: &Document) -> Result<Vec<ExtractedTable>> {
    let mut found = Vec::new();
    for (index, spans) in document_spans(doc)?.into_iter().enumerate() {
        let number = index + 1;
        let tables = detect_tables(&group_lines(spans));
        debug!("Page {} holds {} table(s)", number, tables.len());
        found.extend(tables.into_iter().map(|rows| ExtractedTable { page: number, rows }));
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{form_grid_document, GRID};
    use crate::pdf::{PdfBuilder, Placement};

    fn row(y: f32, cells: &[(f32, &str)]) -> Vec<Placement> {
        cells
            .iter()
            .map(|(x, text)| Placement::new(*x, y, "Helvetica", 10.0, text))
            .collect()
    }

    fn invoice_page() -> Vec<Placement> {
        let mut page = vec![Placement::new(
            72.0,
            740.0,
            "Helvetica",
            10.0,
            "Invoice 2024-117 for services rendered in March",
        )];
        page.extend(row(700.0, &[(72.0, "Item"), (220.0, "Qty"), (320.0, "Price")]));
        page.extend(row(686.0, &[(72.0, "Widget"), (220.0, "4"), (320.0, "9.50")]));
        page.extend(row(672.0, &[(72.0, "Gadget"), (320.0, "12.00")]));
        page.extend(row(658.0, &[(72.0, "Sprocket"), (220.0, "10"), (320.0, "0.75")]));
        page.push(Placement::new(72.0, 600.0, "Helvetica", 10.0, "Thank you for your business."));
        page
    }

    #[test]
    fn aligned_rows_form_a_table_and_prose_is_ignored() {
        let mut builder = PdfBuilder::new();
        builder.add_page(invoice_page());
        let doc = builder.into_document().unwrap();

        let tables = extract_tables(&doc).unwrap();
        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.page, 1);
        assert_eq!(table.rows.len(), 4);
        assert_eq!(
            table.rows[0],
            vec![Some("Item".into()), Some("Qty".into()), Some("Price".into())]
        );
        assert_eq!(table.rows[2], vec![Some("Gadget".into()), None, Some("12.00".into())]);
        assert_eq!(table.rows[3][0].as_deref(), Some("Sprocket"));
    }

    #[test]
    fn pages_without_grids_yield_nothing() {
        let mut builder = PdfBuilder::new();
        builder.add_page(vec![
            Placement::new(72.0, 700.0, "Times-Roman", 12.0, "Just a letter."),
            Placement::new(72.0, 680.0, "Times-Roman", 12.0, "Nothing tabular here."),
        ]);
        let doc = builder.into_document().unwrap();
        assert!(extract_tables(&doc).unwrap().is_empty());
    }

    #[test]
    fn tables_are_numbered_by_page() {
        let mut builder = PdfBuilder::new();
        builder.add_page(vec![Placement::new(72.0, 700.0, "Helvetica", 10.0, "Cover")]);
        builder.add_page(invoice_page());
        let doc = builder.into_document().unwrap();
        let tables = extract_tables(&doc).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].page, 2);
    }

    #[test]
    fn grids_drawn_by_form_xobjects_are_found() {
        let tables = extract_tables(&form_grid_document()).unwrap();
        assert_eq!(tables.len(), 1);
        let expected: Vec<Vec<Option<String>>> = GRID
            .iter()
            .map(|row| row.iter().map(|cell| Some(cell.to_string())).collect())
            .collect();
        assert_eq!(tables[0].rows, expected);
    }

    #[test]
    fn a_single_multi_cell_line_is_not_a_table() {
        let lines = vec![TextLine {
            y: 700.0,
            spans: vec![
                crate::pdf::TextSpan {
                    x: 72.0,
                    y: 700.0,
                    width: 20.0,
                    font_size: 10.0,
                    text: "Left".into(),
                },
                crate::pdf::TextSpan {
                    x: 300.0,
                    y: 700.0,
                    width: 20.0,
                    font_size: 10.0,
                    text: "Right".into(),
                },
            ],
        }];
        assert!(detect_tables(&lines).is_empty());
    }
}
