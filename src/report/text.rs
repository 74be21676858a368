//! Plain-text rendering of a laid-out report.
//!
//! Element positions are quantized to a character grid so the text output
//! keeps the same rows, columns and page breaks as the PDF. Pages are
//! separated by a form feed.

use super::layout::{BODY_SIZE, CHAR_ASPECT, Document, Element, LINE_HEIGHT, MARGIN_X, Page};
use crate::util::unicode::{cell_width, fit_padded};

fn column(x: f32) -> usize {
    ((x - MARGIN_X).max(0.0) / (BODY_SIZE * CHAR_ASPECT)).round() as usize
}

fn render_page(page: &Page, out: &mut String) {
    let width = super::layout::page_columns();
    let mut line = String::new();
    let mut last_y: Option<f32> = None;

    for element in &page.elements {
        let (x, y) = match element {
            Element::Text { x, y, .. } => (*x, *y),
            Element::Rule { x1, y, .. } => (*x1, *y),
        };
        if let Some(prev) = last_y
            && (y - prev).abs() > f32::EPSILON
        {
            out.push_str(line.trim_end());
            out.push('\n');
            line.clear();
            // Keep larger vertical gaps visible
            if y - prev > LINE_HEIGHT * 1.5 {
                out.push('\n');
            }
        }
        last_y = Some(y);

        let col = column(x);
        let current = cell_width(&line);
        if current < col {
            line = fit_padded(&line, col);
        } else if current > 0 {
            line.push(' ');
        }
        match element {
            Element::Text { text, .. } => line.push_str(text),
            Element::Rule { .. } => line.push_str(&"-".repeat(width.saturating_sub(col))),
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Render the document as plain text
pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    for (i, page) in doc.pages.iter().enumerate() {
        if i > 0 {
            out.push('\u{c}');
        }
        render_page(page, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::{ProjectDraft, ProjectStatus};
    use crate::report::layout::layout;

    #[test]
    fn empty_report_has_title_and_footer() {
        let doc = layout(&[], "DevSync Project Report");
        let text = render(&doc);
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.first().copied(), Some("DevSync Project Report"));
        assert_eq!(lines.last().map(|l| l.trim()), Some("Page 1 of 1"));
        assert!(!text.contains('\u{c}'));
    }

    #[test]
    fn fields_are_labeled_and_aligned() {
        let mut draft = ProjectDraft::new("MeetingMind");
        draft.tech = "FastAPI, Whisper".into();
        draft.status = Some(ProjectStatus::InProgress);
        draft.description = "Summarizer".into();
        let p = draft.into_project("1".into());
        let text = render(&layout(&[&p], "Report"));

        let name = text.lines().find(|l| l.starts_with("Name:")).unwrap();
        let tech = text.lines().find(|l| l.starts_with("Tech Stack:")).unwrap();
        assert!(name.ends_with("MeetingMind"));
        assert_eq!(name.find("MeetingMind"), tech.find("FastAPI"));
        assert!(text.contains("In Progress"));
        assert!(text.lines().any(|l| l.starts_with("-----")));
    }

    #[test]
    fn pages_are_separated_by_form_feed() {
        let projects: Vec<_> = (0..20)
            .map(|i| ProjectDraft::new(format!("P{}", i)).into_project(i.to_string()))
            .collect();
        let refs: Vec<_> = projects.iter().collect();
        let doc = layout(&refs, "Report");
        let text = render(&doc);
        assert_eq!(text.matches('\u{c}').count(), doc.pages.len() - 1);
        assert!(text.contains(&format!("Page {} of {}", doc.pages.len(), doc.pages.len())));
    }
}
