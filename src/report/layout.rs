//! Page layout for the project report.
//!
//! Positions are in PDF points with the origin at the top-left corner of the
//! page and `y` growing downwards; each text element's `y` is its baseline.
//! Renderers flip or quantize as they need.

use crate::model::project::{Project, ProjectStatus};
use crate::util::wrap::{wrap_line, wrap_text};

pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
pub const MARGIN_X: f32 = 50.0;
pub const MARGIN_TOP: f32 = 50.0;
pub const MARGIN_BOTTOM: f32 = 60.0;

pub const TITLE_SIZE: f32 = 18.0;
pub const BODY_SIZE: f32 = 11.0;
pub const FOOTER_SIZE: f32 = 9.0;
pub const LINE_HEIGHT: f32 = 16.0;
const TITLE_HEIGHT: f32 = 36.0;

/// Horizontal offset of field values from the left margin
pub const LABEL_WIDTH: f32 = 90.0;
/// Space taken by the separator rule that closes each block
const SEPARATOR_HEIGHT: f32 = 12.0;
/// Average glyph advance as a fraction of the font size
pub const CHAR_ASPECT: f32 = 0.55;

const NOT_STARTED: &str = "Not started yet";
const NOT_HOSTED: &str = "Not hosted yet";
const NOT_PROVIDED: &str = "Not provided";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const LABEL: Rgb = Rgb(0.25, 0.25, 0.25);
    pub const RULE: Rgb = Rgb(0.78, 0.78, 0.78);
    pub const MUTED: Rgb = Rgb(0.5, 0.5, 0.5);
}

/// Color of the status value
pub fn status_color(status: Option<ProjectStatus>) -> Rgb {
    match status {
        Some(ProjectStatus::Completed) => Rgb(0.13, 0.55, 0.13),
        Some(ProjectStatus::InProgress) => Rgb(0.85, 0.55, 0.0),
        Some(ProjectStatus::Planned) => Rgb(0.15, 0.39, 0.92),
        None => Rgb::MUTED,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text {
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        color: Rgb,
        text: String,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        color: Rgb,
    },
}

/// Vertical extent of one project block on its page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedBlock {
    /// Position of the project in the input sequence
    pub index: usize,
    pub top: f32,
    pub bottom: f32,
    pub truncated: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
    pub blocks: Vec<PlacedBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub pages: Vec<Page>,
}

/// Characters of body text that fit in the value column
pub fn value_columns() -> usize {
    let width = PAGE_WIDTH - 2.0 * MARGIN_X - LABEL_WIDTH;
    (width / (BODY_SIZE * CHAR_ASPECT)).floor() as usize
}

/// Characters of body text that fit across the printable width
pub fn page_columns() -> usize {
    ((PAGE_WIDTH - 2.0 * MARGIN_X) / (BODY_SIZE * CHAR_ASPECT)).floor() as usize
}

fn content_bottom() -> f32 {
    PAGE_HEIGHT - MARGIN_BOTTOM
}

/// Block rows that fit between `cursor` and the bottom margin
fn rows_fitting(cursor: f32) -> usize {
    let usable = content_bottom() - cursor - SEPARATOR_HEIGHT;
    (usable.max(0.0) / LINE_HEIGHT).floor() as usize
}

/// One labeled row of a block. Continuation rows have no label.
#[derive(Debug, Clone)]
struct Row {
    label: Option<&'static str>,
    text: String,
    bold: bool,
    color: Rgb,
}

impl Row {
    fn value(label: &'static str, text: String) -> Self {
        Row {
            label: Some(label),
            text,
            bold: false,
            color: Rgb::BLACK,
        }
    }
}

fn labeled(label: &'static str, lines: Vec<String>, color: Rgb) -> Vec<Row> {
    lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| Row {
            label: (i == 0).then_some(label),
            text,
            bold: false,
            color,
        })
        .collect()
}

/// Text for an optional field: real values only once a project is completed
fn optional_field(project: &Project, value: Option<String>, placeholder: &str) -> String {
    if project.is_completed() {
        value.unwrap_or_else(|| NOT_PROVIDED.to_string())
    } else {
        placeholder.to_string()
    }
}

struct BlockRows {
    rows: Vec<Row>,
    truncated: bool,
}

/// Single-row fields: status, start date, end date
const FIXED_ROWS: usize = 3;

/// Per-section row limits that fit `budget`.
///
/// Every section is capped at the largest common limit that fits; rows left
/// under that cap go back to clipped sections in block order. A limit is
/// never below one row.
fn row_limits(lens: &[usize], budget: usize) -> Vec<usize> {
    if lens.iter().sum::<usize>() <= budget {
        return lens.to_vec();
    }
    let used = |cap: usize| lens.iter().map(|&n| n.min(cap)).sum::<usize>();
    let mut cap = lens.iter().copied().max().unwrap_or(1);
    while cap > 1 && used(cap) > budget {
        cap -= 1;
    }
    let mut spare = budget.saturating_sub(used(cap));
    lens.iter()
        .map(|&n| {
            let extra = n.saturating_sub(cap).min(spare);
            spare -= extra;
            n.min(cap) + extra
        })
        .collect()
}

/// Cut `rows` to `limit`, the last kept row becoming a marker naming the field
fn clip(rows: &mut Vec<Row>, limit: usize, label: &'static str) -> bool {
    if rows.len() <= limit {
        return false;
    }
    rows.truncate(limit.saturating_sub(1));
    rows.push(Row {
        label: rows.is_empty().then_some(label),
        text: format!("[{} truncated]", label.to_lowercase()),
        bold: false,
        color: Rgb::MUTED,
    });
    true
}

fn block_rows(project: &Project, cols: usize, max_rows: usize) -> BlockRows {
    let mut name = labeled("Name", wrap_line(&project.name, cols), Rgb::BLACK);
    for row in &mut name {
        row.bold = true;
    }
    let mut tech = labeled("Tech Stack", wrap_line(&project.tech, cols), Rgb::BLACK);
    let status = Row {
        color: status_color(project.status),
        ..Row::value(
            "Status",
            project
                .status
                .map_or_else(|| "N/A".to_string(), |s| s.as_str().to_string()),
        )
    };
    let mut description = labeled("Description", wrap_text(&project.description, cols), Rgb::BLACK);

    let fmt_date = |d: Option<chrono::NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string());
    let start = Row::value(
        "Start Date",
        optional_field(project, fmt_date(project.start_date), NOT_STARTED),
    );
    let end = Row::value(
        "End Date",
        optional_field(project, fmt_date(project.end_date), NOT_STARTED),
    );
    let url_text = optional_field(project, project.url.clone(), NOT_HOSTED);
    let mut url = labeled("Hosted URL", wrap_line(&url_text, cols), Rgb::BLACK);

    let lens = [name.len(), tech.len(), description.len(), url.len()];
    let limits = row_limits(&lens, max_rows.saturating_sub(FIXED_ROWS));
    let mut truncated = false;
    truncated |= clip(&mut name, limits[0], "Name");
    truncated |= clip(&mut tech, limits[1], "Tech Stack");
    truncated |= clip(&mut description, limits[2], "Description");
    truncated |= clip(&mut url, limits[3], "Hosted URL");

    let mut rows = Vec::with_capacity(max_rows);
    rows.append(&mut name);
    rows.append(&mut tech);
    rows.push(status);
    rows.append(&mut description);
    rows.push(start);
    rows.push(end);
    rows.append(&mut url);
    debug_assert!(rows.len() <= max_rows);
    BlockRows { rows, truncated }
}

fn block_height(rows: usize) -> f32 {
    rows as f32 * LINE_HEIGHT + SEPARATOR_HEIGHT
}

/// Lay out `projects` in order, one block each, under `title`.
pub fn layout(projects: &[&Project], title: &str) -> Document {
    let cols = value_columns();
    let bottom = content_bottom();

    let mut pages = Vec::new();
    let mut page = Page::default();
    page.elements.push(Element::Text {
        x: MARGIN_X,
        y: MARGIN_TOP + TITLE_SIZE,
        size: TITLE_SIZE,
        bold: true,
        color: Rgb::BLACK,
        text: title.to_string(),
    });
    let mut cursor = MARGIN_TOP + TITLE_HEIGHT;

    for (index, project) in projects.iter().enumerate() {
        let mut block = block_rows(project, cols, rows_fitting(MARGIN_TOP));
        if cursor + block_height(block.rows.len()) > bottom {
            if page.blocks.is_empty() {
                // Alone under the title: clip to what is left of this page
                block = block_rows(project, cols, rows_fitting(cursor));
            } else {
                pages.push(std::mem::take(&mut page));
                cursor = MARGIN_TOP;
            }
        }

        let top = cursor;
        for row in block.rows {
            let baseline = cursor + BODY_SIZE;
            if let Some(label) = row.label {
                page.elements.push(Element::Text {
                    x: MARGIN_X,
                    y: baseline,
                    size: BODY_SIZE,
                    bold: true,
                    color: Rgb::LABEL,
                    text: format!("{}:", label),
                });
            }
            if !row.text.is_empty() {
                page.elements.push(Element::Text {
                    x: MARGIN_X + LABEL_WIDTH,
                    y: baseline,
                    size: BODY_SIZE,
                    bold: row.bold,
                    color: row.color,
                    text: row.text,
                });
            }
            cursor += LINE_HEIGHT;
        }
        let rule_y = cursor + SEPARATOR_HEIGHT / 2.0;
        page.elements.push(Element::Rule {
            x1: MARGIN_X,
            x2: PAGE_WIDTH - MARGIN_X,
            y: rule_y,
            color: Rgb::RULE,
        });
        cursor += SEPARATOR_HEIGHT;
        page.blocks.push(PlacedBlock {
            index,
            top,
            bottom: cursor,
            truncated: block.truncated,
        });
    }
    pages.push(page);

    number_pages(&mut pages);
    Document {
        title: title.to_string(),
        pages,
    }
}

/// Approximate rendered width of `text` at `size`
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * CHAR_ASPECT
}

fn number_pages(pages: &mut [Page]) {
    let total = pages.len();
    for (i, page) in pages.iter_mut().enumerate() {
        let label = format!("Page {} of {}", i + 1, total);
        page.elements.push(Element::Text {
            x: PAGE_WIDTH - MARGIN_X - text_width(&label, FOOTER_SIZE),
            y: PAGE_HEIGHT - MARGIN_BOTTOM / 2.0,
            size: FOOTER_SIZE,
            bold: false,
            color: Rgb::MUTED,
            text: label,
        });
    }
}
