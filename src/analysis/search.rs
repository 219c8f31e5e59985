//! Line-level search across extracted pages.

use serde::{Deserialize, Serialize};

use crate::models::PageResult;

/// Characters of a matching line kept in the preview.
pub const PREVIEW_CHARS: usize = 100;

/// A line containing the search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub page_number: u32,
    /// 1-indexed line within the page.
    pub line_number: usize,
    /// The line with surrounding whitespace removed.
    pub line: String,
    /// The line cut to [`PREVIEW_CHARS`], with `...` when cut.
    pub preview: String,
}

/// Case-insensitive substring search, in page then line order.
pub fn search(pages: &[PageResult], term: &str) -> Vec<SearchMatch> {
    if term.trim().is_empty() {
        return Vec::new();
    }
    let needle = term.to_lowercase();

    pages
        .iter()
        .flat_map(|page| {
            let needle = &needle;
            page.text
                .lines()
                .enumerate()
                .filter(move |(_, line)| line.to_lowercase().contains(needle.as_str()))
                .map(move |(idx, line)| SearchMatch {
                    page_number: page.page_number,
                    line_number: idx + 1,
                    line: line.trim().to_string(),
                    preview: preview(line),
                })
        })
        .collect()
}

fn preview(line: &str) -> String {
    if line.chars().count() > PREVIEW_CHARS {
        let cut: String = line.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtractionMethod;

    fn page(n: u32, text: &str) -> PageResult {
        PageResult::new(n, text.to_string(), ExtractionMethod::Native, vec![])
    }

    #[test]
    fn test_case_insensitive_in_order() {
        let pages = vec![
            page(1, "Invoice total\nnothing\n  TOTAL due  "),
            page(2, "subtotal"),
        ];
        let matches = search(&pages, "Total");

        let found: Vec<(u32, usize, &str)> = matches
            .iter()
            .map(|m| (m.page_number, m.line_number, m.line.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                (1, 1, "Invoice total"),
                (1, 3, "TOTAL due"),
                (2, 1, "subtotal")
            ]
        );
        assert_eq!(matches[1].preview, "  TOTAL due  ");
    }

    #[test]
    fn test_blank_term_matches_nothing() {
        let pages = vec![page(1, "anything")];
        assert!(search(&pages, "").is_empty());
        assert!(search(&pages, "   ").is_empty());
    }

    #[test]
    fn test_long_line_preview_is_cut() {
        let long = format!("needle {}", "é".repeat(150));
        let matches = search(&[page(1, &long)], "NEEDLE");
        assert_eq!(matches.len(), 1);
        assert!(matches[0].preview.ends_with("..."));
        assert_eq!(matches[0].preview.chars().count(), PREVIEW_CHARS + 3);
        assert_eq!(matches[0].line, long);
    }

    #[test]
    fn test_arabic_text() {
        let matches = search(&[page(3, "مرحبا بالعالم")], "بالعالم");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].page_number, 3);
    }
}
