//! HTML rendering with page extensions.

use pulldown_cmark::{html, CodeBlockKind, Event, Tag, TagEnd};

use crate::parser::{heading_events, ParsedDoc};
use crate::postprocess::{escape_html, mark_task_list_items, parse_image_options};
use crate::table::{Cell, Table};

/// Options controlling HTML output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Render ```` ```math ```` blocks as `$$...$$` paragraphs for MathJax
    pub math: bool,

    /// Apply row/column span markers in tables
    pub table_span: bool,
}

/// Render a parsed document's content to HTML.
///
/// Heading ids match the document's [`toc`](ParsedDoc::toc) entries.
pub fn render_html(doc: &ParsedDoc, options: &RenderOptions) -> String {
    let mut ids = doc.toc.iter().map(|entry| entry.id.clone());
    let (events, _) = heading_events(&doc.content, |_, _| ids.next().unwrap_or_default());
    let events = rewrite_events(events, options);

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());

    let html_output = parse_image_options(&html_output);
    mark_task_list_items(&html_output)
}

fn rewrite_events<'a>(events: Vec<Event<'a>>, options: &RenderOptions) -> Vec<Event<'a>> {
    if !options.math && !options.table_span {
        return events;
    }

    let mut output = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();

    while let Some(event) = iter.next() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)))
                if options.math && is_math(&info) =>
            {
                let mut source = String::new();
                for inner in iter.by_ref() {
                    match inner {
                        Event::End(TagEnd::CodeBlock) => break,
                        Event::Text(text) => source.push_str(&text),
                        _ => {}
                    }
                }
                output.push(Event::Html(
                    format!("<p>$${}$$</p>\n", escape_html(&source)).into(),
                ));
            }

            Event::Start(Tag::Table(alignments)) if options.table_span => {
                let mut table = Table {
                    alignments,
                    ..Default::default()
                };
                collect_table(&mut iter, &mut table);
                table.apply_spans();
                output.push(Event::Html(table.to_html().into()));
            }

            other => output.push(other),
        }
    }

    output
}

fn is_math(info: &str) -> bool {
    info.split_whitespace().next() == Some("math")
}

/// Consume table events up to the table's end, filling `table`.
fn collect_table<'a>(events: &mut impl Iterator<Item = Event<'a>>, table: &mut Table) {
    let mut in_head = false;
    let mut row: Vec<Cell> = Vec::new();
    let mut cell: Option<Vec<Event<'a>>> = None;

    for event in events.by_ref() {
        match event {
            Event::End(TagEnd::Table) => break,
            Event::Start(Tag::TableHead) => in_head = true,
            Event::End(TagEnd::TableHead) => {
                in_head = false;
                table.head = std::mem::take(&mut row);
            }
            Event::Start(Tag::TableRow) => row.clear(),
            Event::End(TagEnd::TableRow) => {
                if !in_head {
                    table.body.push(std::mem::take(&mut row));
                }
            }
            Event::Start(Tag::TableCell) => cell = Some(Vec::new()),
            Event::End(TagEnd::TableCell) => {
                if let Some(inner) = cell.take() {
                    row.push(render_cell(inner));
                }
            }
            other => {
                if let Some(inner) = cell.as_mut() {
                    inner.push(other);
                }
            }
        }
    }
}

fn render_cell(events: Vec<Event<'_>>) -> Cell {
    let text: String = events
        .iter()
        .filter_map(|e| match e {
            Event::Text(t) | Event::Code(t) => Some(t.as_ref()),
            _ => None,
        })
        .collect();

    let mut inner = String::new();
    html::push_html(&mut inner, events.into_iter());

    Cell::new(inner, text)
}
