// src/cache/preview.rs
//! Structure preview extraction
//!
//! A small set of highlighted lines returned alongside a fresh cache key,
//! so a caller can decide what to paginate into next without fetching the
//! whole entry. Lines carrying an element identifier are preferred because
//! they are the anchors a follow-up action will target; plain head-of-text
//! lines fill the preview only when fewer identifier lines exist.

use crate::diff::element_id;
use serde::Serialize;

/// One preview line with its position in the cached text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewLine {
    /// 1-based line number in the cached text
    pub line: usize,

    /// Line text, possibly truncated
    pub text: String,
}

/// Select up to `max_lines` preview lines from a cached text
pub fn structure_preview(lines: &[String], max_lines: usize, max_chars: usize) -> Vec<PreviewLine> {
    if max_lines == 0 {
        return Vec::new();
    }

    let mut picked: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| element_id(line).is_some())
        .map(|(i, _)| i)
        .take(max_lines)
        .collect();

    if picked.len() < max_lines {
        for i in 0..lines.len() {
            if picked.len() >= max_lines {
                break;
            }
            if !picked.contains(&i) {
                picked.push(i);
            }
        }
        picked.sort_unstable();
    }

    picked
        .into_iter()
        .map(|i| PreviewLine {
            line: i + 1,
            text: clip(&lines[i], max_chars),
        })
        .collect()
}

/// Truncate a line to at most `max_chars` characters, on a char boundary
pub(crate) fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(max_chars).collect();
        clipped.push_str("...");
        clipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_plain_text_takes_head_lines() {
        let lines = lines(&["one", "two", "three", "four"]);
        let preview = structure_preview(&lines, 2, 200);
        assert_eq!(preview.len(), 2);
        assert_eq!(preview[0], PreviewLine { line: 1, text: "one".to_string() });
        assert_eq!(preview[1], PreviewLine { line: 2, text: "two".to_string() });
    }

    #[test]
    fn test_identifier_lines_preferred() {
        let lines = lines(&["header", "button [ref=b1] OK", "filler", "link [ref=b2] More"]);
        let preview = structure_preview(&lines, 2, 200);
        assert_eq!(preview[0].line, 2);
        assert_eq!(preview[1].line, 4);
    }

    #[test]
    fn test_head_lines_fill_when_few_identifiers() {
        let lines = lines(&["header", "button [ref=b1] OK", "filler"]);
        let preview = structure_preview(&lines, 3, 200);
        let numbers: Vec<usize> = preview.iter().map(|p| p.line).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_clip_truncates_on_char_boundary() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("abcdefgh", 4), "abcd...");
        assert_eq!(clip("日本語テキスト", 3), "日本語...");
    }
}
