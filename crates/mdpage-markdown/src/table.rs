//! Table row/column span extension.
//!
//! A cell containing `¦` spans one extra column per marker; the trailing
//! placeholder cells of that row are dropped. An empty body cell below a
//! filled one merges into it as a row span. A header row whose cells are
//! all empty is omitted.

use std::fmt::Write;
use std::sync::LazyLock;

use pulldown_cmark::Alignment;
use regex::Regex;

static SPAN_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x{a6}\s*").expect("Invalid span marker regex"));

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Rendered inline HTML
    pub html: String,
    /// Plain text content
    pub text: String,
    pub colspan: usize,
    pub rowspan: usize,
    hidden: bool,
}

impl Cell {
    pub fn new(html: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            text: text.into(),
            colspan: 1,
            rowspan: 1,
            hidden: false,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

/// A table collected from Markdown events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub alignments: Vec<Alignment>,
    pub head: Vec<Cell>,
    pub body: Vec<Vec<Cell>>,
}

impl Table {
    /// Compute column and row spans, hiding the cells they cover.
    pub fn apply_spans(&mut self) {
        let mut col_max = 0;

        for row in &mut self.body {
            let columns = row.len();
            col_max = col_max.max(columns);

            let mut col = 0;
            for cell in row.iter_mut() {
                col += 1;
                let markers = SPAN_MARKER.find_iter(&cell.text).count();
                if markers > 0 {
                    cell.colspan = markers + 1;
                    cell.text = SPAN_MARKER.replace_all(&cell.text, "").into_owned();
                    cell.html = SPAN_MARKER.replace_all(&cell.html, "").into_owned();
                    col += markers;
                }
                if col > columns {
                    cell.hidden = true;
                }
            }
        }

        for column in 0..col_max {
            let mut root: Option<(usize, usize)> = None;
            let mut merged = 0;

            for row in 0..self.body.len() {
                if column >= self.body[row].len() {
                    continue;
                }
                let Some(index) = covering_cell(&self.body[row], column) else {
                    continue;
                };

                if row == 0 || !self.body[row][index].text.is_empty() {
                    merged = 0;
                    root = Some((row, index));
                } else {
                    merged += 1;
                    if let Some((root_row, root_index)) = root {
                        self.body[root_row][root_index].rowspan = merged + 1;
                    }
                    self.body[row][index].hidden = true;
                }
            }
        }
    }

    /// Whether every header cell is empty.
    pub fn has_empty_head(&self) -> bool {
        self.head.iter().all(|c| c.text.trim().is_empty())
    }

    /// Render the table as HTML.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table>\n");

        if !self.head.is_empty() && !self.has_empty_head() {
            html.push_str("<thead><tr>");
            for (i, cell) in self.head.iter().enumerate() {
                self.push_cell(&mut html, "th", i, cell);
            }
            html.push_str("</tr></thead>\n");
        }

        html.push_str("<tbody>\n");
        for row in &self.body {
            html.push_str("<tr>");
            for (i, cell) in row.iter().enumerate().filter(|(_, c)| !c.hidden) {
                self.push_cell(&mut html, "td", i, cell);
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>\n");

        html
    }

    fn push_cell(&self, html: &mut String, tag: &str, column: usize, cell: &Cell) {
        let _ = write!(html, "<{}", tag);
        match self.alignments.get(column) {
            Some(Alignment::Left) => html.push_str(r#" style="text-align: left""#),
            Some(Alignment::Center) => html.push_str(r#" style="text-align: center""#),
            Some(Alignment::Right) => html.push_str(r#" style="text-align: right""#),
            _ => {}
        }
        if cell.colspan > 1 {
            let _ = write!(html, r#" colspan="{}""#, cell.colspan);
        }
        if cell.rowspan > 1 {
            let _ = write!(html, r#" rowspan="{}""#, cell.rowspan);
        }
        let _ = write!(html, ">{}</{}>", cell.html, tag);
    }
}

/// Index of the cell covering `column`, counting column spans.
fn covering_cell(row: &[Cell], column: usize) -> Option<usize> {
    let mut position = 0;
    for (i, cell) in row.iter().enumerate() {
        position += cell.colspan;
        if position > column {
            return Some(i);
        }
    }
    None
}
