//! Cell arithmetic for fixed-column output: the plain-text report grid and
//! the `list` table. A tab counts as four cells.

use std::borrow::Cow;

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const TAB_CELLS: usize = 4;
const ELLIPSIS: char = '\u{2026}';

/// Cells taken by one grapheme cluster
pub fn grapheme_cells(g: &str) -> usize {
    match g {
        "\t" => TAB_CELLS,
        _ => UnicodeWidthStr::width(g),
    }
}

pub fn cell_width(s: &str) -> usize {
    s.graphemes(true).map(grapheme_cells).sum()
}

/// `s` cut to at most `cells`, ending in `…` when anything was dropped.
/// Clusters are never split.
pub fn fit(s: &str, cells: usize) -> Cow<'_, str> {
    if cell_width(s) <= cells {
        return Cow::Borrowed(s);
    }
    let Some(budget) = cells.checked_sub(1) else {
        return Cow::Borrowed("");
    };
    let mut used = 0;
    let mut out: String = s
        .graphemes(true)
        .take_while(|g| {
            used += grapheme_cells(g);
            used <= budget
        })
        .collect();
    out.push(ELLIPSIS);
    Cow::Owned(out)
}

/// `s` fitted to `cells`, then space-padded to exactly that width
pub fn fit_padded(s: &str, cells: usize) -> String {
    let fitted = fit(s, cells);
    let pad = cells.saturating_sub(cell_width(&fitted));
    format!("{}{}", fitted, " ".repeat(pad))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cells_count_wide_glyphs_and_tabs() {
        assert_eq!(cell_width("React"), 5);
        assert_eq!(cell_width("日本語"), 6);
        assert_eq!(cell_width("Go\tRust"), 10);
        assert_eq!(cell_width(""), 0);
    }

    #[test]
    fn fit_borrows_when_nothing_is_cut() {
        assert!(matches!(fit("MeetingMind", 11), Cow::Borrowed("MeetingMind")));
        assert_eq!(fit("MeetingMind", 8), "Meeting\u{2026}");
        assert_eq!(fit("MeetingMind", 1), "\u{2026}");
        assert_eq!(fit("MeetingMind", 0), "");
    }

    #[test]
    fn fit_keeps_wide_glyphs_whole() {
        // Three cells left before the ellipsis: 日 fits, 本 would straddle
        assert_eq!(fit("日本語", 4), "日\u{2026}");
        assert_eq!(cell_width(&fit("日本語", 4)), 3);
    }

    #[test]
    fn fit_padded_is_exact_width() {
        assert_eq!(fit_padded("Blog", 8), "Blog    ");
        assert_eq!(fit_padded("Resume Builder", 8), "Resume \u{2026}");
        assert_eq!(cell_width(&fit_padded("日本語", 5)), 5);
    }
}
