//! Minimal PDF 1.4 writer for laid-out reports.
//!
//! Uses the standard Helvetica faces with WinAnsiEncoding, so no fonts are
//! embedded. Characters outside that encoding are written as `?`.

use std::fmt::Write as _;

use super::layout::{Document, Element, PAGE_HEIGHT, PAGE_WIDTH, Page, Rgb};

const CATALOG: usize = 1;
const PAGES: usize = 2;
const FONT_REGULAR: usize = 3;
const FONT_BOLD: usize = 4;
const INFO: usize = 5;
const FIRST_PAGE: usize = 6;

/// Map a char to its WinAnsiEncoding byte
fn win_ansi(c: char) -> Option<u8> {
    match c {
        '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => Some(c as u8),
        '\t' => Some(b' '),
        '€' => Some(0x80),
        '…' => Some(0x85),
        '‘' => Some(0x91),
        '’' => Some(0x92),
        '“' => Some(0x93),
        '”' => Some(0x94),
        '•' => Some(0x95),
        '–' => Some(0x96),
        '—' => Some(0x97),
        '™' => Some(0x99),
        _ => None,
    }
}

/// Escape text for a PDF literal string. Output stays 7-bit ASCII.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match win_ansi(c).unwrap_or(b'?') {
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\\' => out.push_str("\\\\"),
            b @ 0x20..=0x7e => out.push(b as char),
            b => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out
}

fn color(c: Rgb) -> String {
    format!("{:.3} {:.3} {:.3}", c.0, c.1, c.2)
}

fn content_stream(page: &Page) -> String {
    let mut s = String::new();
    for element in &page.elements {
        match element {
            Element::Text {
                x,
                y,
                size,
                bold,
                color: c,
                text,
            } => {
                let font = if *bold { "F2" } else { "F1" };
                let _ = writeln!(
                    s,
                    "BT /{} {:.1} Tf {} rg {:.2} {:.2} Td ({}) Tj ET",
                    font,
                    size,
                    color(*c),
                    x,
                    PAGE_HEIGHT - y,
                    escape_text(text)
                );
            }
            Element::Rule { x1, x2, y, color: c } => {
                let flipped = PAGE_HEIGHT - y;
                let _ = writeln!(
                    s,
                    "{} RG 0.5 w {:.2} {:.2} m {:.2} {:.2} l S",
                    color(*c),
                    x1,
                    flipped,
                    x2,
                    flipped
                );
            }
        }
    }
    s
}

struct Writer {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl Writer {
    fn object(&mut self, id: usize, body: &str) {
        debug_assert_eq!(id, self.offsets.len() + 1);
        self.offsets.push(self.buf.len());
        self.buf
            .extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", id, body).as_bytes());
    }
}

/// Serialize the document to PDF bytes
pub fn render(doc: &Document) -> Vec<u8> {
    let mut w = Writer {
        buf: Vec::new(),
        offsets: Vec::new(),
    };
    w.buf.extend_from_slice(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");

    let page_ids: Vec<usize> = (0..doc.pages.len())
        .map(|i| FIRST_PAGE + 2 * i)
        .collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{} 0 R", id))
        .collect::<Vec<_>>()
        .join(" ");

    w.object(CATALOG, &format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES));
    w.object(
        PAGES,
        &format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_ids.len()),
    );
    w.object(
        FONT_REGULAR,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );
    w.object(
        FONT_BOLD,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    );
    w.object(
        INFO,
        &format!(
            "<< /Title ({}) /Producer (devsync {}) >>",
            escape_text(&doc.title),
            env!("CARGO_PKG_VERSION")
        ),
    );

    for (page, id) in doc.pages.iter().zip(&page_ids) {
        let content = content_stream(page);
        w.object(
            *id,
            &format!(
                "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 {} 0 R /F2 {} 0 R >> >> /Contents {} 0 R >>",
                PAGES,
                PAGE_WIDTH,
                PAGE_HEIGHT,
                FONT_REGULAR,
                FONT_BOLD,
                id + 1
            ),
        );
        w.object(
            id + 1,
            &format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ),
        );
    }

    let xref_at = w.buf.len();
    let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", w.offsets.len() + 1);
    for offset in &w.offsets {
        let _ = writeln!(tail, "{:010} 00000 n ", offset);
    }
    let _ = write!(
        tail,
        "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
        w.offsets.len() + 1,
        CATALOG,
        INFO,
        xref_at
    );
    w.buf.extend_from_slice(tail.as_bytes());
    w.buf
}
