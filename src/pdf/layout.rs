//! Groups positioned spans into lines, cells and paragraph blocks.

use super::TextSpan;

/// Horizontal gap, in multiples of the font size, that separates two cells.
const CELL_GAP_EM: f32 = 1.0;
/// Horizontal gap, in multiples of the font size, treated as a word break.
const WORD_GAP_EM: f32 = 0.15;

/// Spans sharing a baseline, ordered left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub y: f32,
    pub spans: Vec<TextSpan>,
}

/// Text of a line between two wide horizontal gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub x: f32,
    pub x_end: f32,
    pub text: String,
}

/// Consecutive lines that read as one paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    /// Character-weighted mean size of the block's spans.
    pub font_size: f32,
}

impl TextLine {
    pub fn font_size(&self) -> f32 {
        self.spans
            .iter()
            .map(|s| s.font_size)
            .fold(0.0, f32::max)
    }

    /// The line's text, with a space wherever spans leave a visible gap.
    pub fn text(&self) -> String {
        join_spans(&self.spans)
    }

    /// Splits the line into cells on gaps wider than about one em.
    pub fn cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Vec<&TextSpan>> = Vec::new();
        for span in &self.spans {
            match cells.last_mut() {
                Some(current) => {
                    let prev = current[current.len() - 1];
                    let gap = span.x - prev.x_end();
                    if gap > CELL_GAP_EM * prev.font_size.max(span.font_size) {
                        cells.push(vec![span]);
                    } else {
                        current.push(span);
                    }
                },
                None => cells.push(vec![span]),
            }
        }
        cells
            .into_iter()
            .map(|spans| {
                let owned: Vec<TextSpan> = spans.iter().map(|s| (*s).clone()).collect();
                Cell {
                    x: owned[0].x,
                    x_end: owned[owned.len() - 1].x_end(),
                    text: join_spans(&owned).trim().to_string(),
                }
            })
            .collect()
    }
}

fn join_spans(spans: &[TextSpan]) -> String {
    let mut text = String::new();
    let mut prev: Option<&TextSpan> = None;
    for span in spans {
        if let Some(p) = prev {
            let gap = span.x - p.x_end();
            if gap > WORD_GAP_EM * p.font_size
                && !text.ends_with(char::is_whitespace)
                && !span.text.starts_with(char::is_whitespace)
            {
                text.push(' ');
            }
        }
        text.push_str(&span.text);
        prev = Some(span);
    }
    text
}

/// Groups spans into lines, top of the page first.
pub fn group_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<TextLine> = Vec::new();
    for span in spans {
        let tolerance = (span.font_size * 0.4).max(2.0);
        match lines.last_mut() {
            Some(line) if (line.y - span.y).abs() <= tolerance => line.spans.push(span),
            _ => lines.push(TextLine {
                y: span.y,
                spans: vec![span],
            }),
        }
    }
    for line in &mut lines {
        line.spans.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    lines
}

/// Merges lines into paragraph blocks.
///
/// A new block starts when the vertical gap exceeds 1.5 line heights or the
/// font size changes noticeably.
pub fn group_paragraphs(lines: &[TextLine]) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    let mut current: Vec<&TextLine> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            let size = prev.font_size().max(line.font_size());
            let gap = prev.y - line.y;
            let size_change = (prev.font_size() - line.font_size()).abs() > size * 0.2;
            if gap > size * 1.5 * 1.2 || size_change {
                blocks.push(block_from(&current));
                current.clear();
            }
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(block_from(&current));
    }
    blocks
}

fn block_from(lines: &[&TextLine]) -> TextBlock {
    let text = lines
        .iter()
        .map(|l| l.text().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut sized = 0.0;
    let mut chars = 0usize;
    for span in lines.iter().flat_map(|l| l.spans.iter()) {
        let n = span.text.chars().count();
        sized += span.font_size * n as f32;
        chars += n;
    }
    let font_size = if chars > 0 { sized / chars as f32 } else { 0.0 };

    TextBlock { text, font_size }
}
