use unicode_segmentation::UnicodeSegmentation;

use crate::util::unicode::{cell_width, grapheme_cells};

fn is_ws(g: &str) -> bool {
    g.chars().all(char::is_whitespace)
}

/// Split a line into alternating whitespace runs and words. A word also
/// ends right after a hyphen that is followed by more word characters.
fn tokens(line: &str) -> Vec<&str> {
    let gs: Vec<(usize, &str)> = line.grapheme_indices(true).collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < gs.len() {
        let start = gs[i].0;
        if is_ws(gs[i].1) {
            while i < gs.len() && is_ws(gs[i].1) {
                i += 1;
            }
        } else {
            while i < gs.len() && !is_ws(gs[i].1) {
                let was_hyphen = gs[i].1 == "-";
                i += 1;
                if was_hyphen && i < gs.len() && !is_ws(gs[i].1) {
                    break;
                }
            }
        }
        let end = if i < gs.len() { gs[i].0 } else { line.len() };
        out.push(&line[start..end]);
    }
    out
}

/// Wrap one logical line to `width` cells.
///
/// Break rules in priority order:
/// 1. Whitespace (the whitespace at the break is dropped)
/// 2. After hyphens
/// 3. Grapheme wrap when a single word is wider than the line
///
/// Leading indentation on the first row is kept. Always returns at least
/// one row.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width == 0 || cell_width(line) <= width {
        return vec![line.trim_end().to_string()];
    }

    let mut rows = Vec::new();
    let mut current = String::new();
    let mut col = 0;

    for token in tokens(line) {
        let tw = cell_width(token);

        if is_ws(token) {
            if col == 0 {
                // Indentation survives only at the very start
                if rows.is_empty() && tw < width {
                    current.push_str(token);
                    col = tw;
                }
            } else if col + tw <= width {
                current.push_str(token);
                col += tw;
            } else {
                rows.push(current.trim_end().to_string());
                current.clear();
                col = 0;
            }
            continue;
        }

        if col + tw <= width {
            current.push_str(token);
            col += tw;
            continue;
        }

        if col > 0 && !current.trim().is_empty() {
            rows.push(current.trim_end().to_string());
            current.clear();
            col = 0;
        }

        if col + tw <= width {
            current.push_str(token);
            col += tw;
            continue;
        }

        // Too wide for any row: grapheme-wrap it
        for g in token.graphemes(true) {
            let gw = grapheme_cells(g);
            if col + gw > width && col > 0 {
                rows.push(std::mem::take(&mut current));
                col = 0;
            }
            current.push_str(g);
            col += gw;
        }
    }

    if !current.trim().is_empty() || rows.is_empty() {
        rows.push(current.trim_end().to_string());
    }
    rows
}

/// Wrap multi-line text; blank lines are kept as empty rows.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    text.lines().flat_map(|line| wrap_line(line, width)).collect()
}
