//! Pure text helpers behind the editor's indentation, markdown continuation
//! and bracket matching behaviours. All positions are byte offsets.

use std::ops::Range;
use std::path::Path;

use crate::app::domain::theme::TokenCategory;

/// Bracket scans give up after this many bytes.
pub const MAX_BRACKET_SCAN: usize = 10_000;

/// Extract filename from a file path
///
/// Returns the filename component of a path, or "Untitled" if it can't be extracted.
pub fn extract_filename(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != ".")
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Untitled".to_string())
}

pub fn indent_unit(tab_size: usize) -> String {
    " ".repeat(tab_size.max(1))
}

/// Start and end (exclusive, before the newline) of the line containing `pos`.
pub fn line_bounds(text: &str, pos: usize) -> (usize, usize) {
    let pos = pos.min(text.len());
    let start = text[..pos].rfind('\n').map_or(0, |i| i + 1);
    let end = text[pos..].find('\n').map_or(text.len(), |i| pos + i);
    (start, end)
}

/// Leading spaces and tabs of `line`.
pub fn leading_indent(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

/// Indentation for a new line inserted at `pos`: the current line's
/// indentation, plus one unit when the text before the cursor ends in an
/// opening bracket.
pub fn newline_indent(text: &str, pos: usize, tab_size: usize) -> String {
    let pos = pos.min(text.len());
    let (start, _) = line_bounds(text, pos);
    let before = &text[start..pos];
    let mut indent = leading_indent(before).to_string();
    if before.trim_end().ends_with(['{', '[', '(']) {
        indent.push_str(&indent_unit(tab_size));
    }
    indent
}

/// What Enter should do inside markdown markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewlineAction {
    /// Insert a newline followed by this prefix.
    Continue(String),
    /// The item is empty: delete `start..end` (its marker) instead.
    ClearMarker { start: usize, end: usize },
    /// Not inside list or quote markup.
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Marker {
    Quote,
    Bullet(char),
    Ordered { number: u64, delimiter: char },
}

/// Parsed list/quote prefix of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LineMarkup {
    indent: usize,
    marker: Marker,
    task: bool,
    /// Bytes from line start through the marker and its trailing space.
    prefix_len: usize,
}

const MAX_ORDERED_DIGITS: usize = 9;

fn parse_markup(line: &str) -> Option<LineMarkup> {
    let indent = leading_indent(line).len();
    let rest = &line[indent..];
    let bytes = rest.as_bytes();

    let (marker, marker_len) = match *bytes.first()? {
        b'>' => (Marker::Quote, 1),
        c @ (b'-' | b'*' | b'+') => (Marker::Bullet(c as char), 1),
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            // CommonMark caps ordered list numbers at nine digits
            if digits > MAX_ORDERED_DIGITS {
                return None;
            }
            let delimiter = match bytes.get(digits) {
                Some(b'.') => '.',
                Some(b')') => ')',
                _ => return None,
            };
            let number = rest[..digits].parse().ok()?;
            (Marker::Ordered { number, delimiter }, digits + 1)
        }
        _ => return None,
    };

    let after = &rest[marker_len..];
    let spaces = after.len() - after.trim_start_matches(' ').len();
    // Lists need a space after the marker; quotes do not
    if spaces == 0 && marker != Marker::Quote && !after.is_empty() {
        return None;
    }
    let mut prefix_len = indent + marker_len + spaces;

    let mut task = false;
    if marker != Marker::Quote {
        let tail = &line[prefix_len..];
        if tail.starts_with("[ ] ") || tail.starts_with("[x] ") || tail.starts_with("[X] ") {
            task = true;
            prefix_len += 4;
        }
    }

    Some(LineMarkup { indent, marker, task, prefix_len })
}

/// Enter behaviour for markdown lists and block quotes.
pub fn continue_markup(text: &str, pos: usize) -> NewlineAction {
    let pos = pos.min(text.len());
    let (start, end) = line_bounds(text, pos);
    let line = &text[start..end];
    let Some(markup) = parse_markup(line) else {
        return NewlineAction::Plain;
    };
    if pos < start + markup.prefix_len {
        return NewlineAction::Plain;
    }

    if line[markup.prefix_len..].trim().is_empty() {
        return NewlineAction::ClearMarker {
            start: start + markup.indent,
            end: start + markup.prefix_len.min(line.len()),
        };
    }

    let mut prefix = line[..markup.indent].to_string();
    match markup.marker {
        Marker::Quote => prefix.push_str("> "),
        Marker::Bullet(c) => {
            prefix.push(c);
            prefix.push(' ');
        }
        Marker::Ordered { number, delimiter } => {
            prefix.push_str(&format!("{}{} ", number.saturating_add(1), delimiter));
        }
    }
    if markup.task {
        prefix.push_str("[ ] ");
    }
    NewlineAction::Continue(prefix)
}

/// Range of a list or quote marker that sits directly before the cursor
/// with nothing else on the line, so Backspace can remove it whole.
pub fn markup_marker_before(text: &str, pos: usize) -> Option<(usize, usize)> {
    let pos = pos.min(text.len());
    let (start, _) = line_bounds(text, pos);
    let before = &text[start..pos];
    let markup = parse_markup(before)?;
    if markup.prefix_len != before.len() || !before.ends_with(' ') {
        return None;
    }
    Some((start + markup.indent, pos))
}

/// When a closing bracket is typed on a line holding only indentation,
/// return the range to replace and the reduced indentation.
pub fn reindent_closing(
    text: &str,
    pos: usize,
    closing: char,
    tab_size: usize,
) -> Option<(usize, usize, String)> {
    if !matches!(closing, '}' | ']' | ')') {
        return None;
    }
    let pos = pos.min(text.len());
    let (start, _) = line_bounds(text, pos);
    let before = &text[start..pos];
    if before.is_empty() || !before.chars().all(|c| c == ' ' || c == '\t') {
        return None;
    }
    let new_indent = if let Some(stripped) = before.strip_suffix('\t') {
        stripped.to_string()
    } else {
        let trailing = before.len() - before.trim_end_matches(' ').len();
        let remove = trailing.min(tab_size.max(1));
        before[..before.len() - remove].to_string()
    };
    Some((start, pos, new_indent))
}

/// A bracket next to the cursor and the position of its partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketMatch {
    pub at: usize,
    /// `None` when no partner was found or a different bracket closed first.
    pub partner: Option<usize>,
}

impl BracketMatch {
    pub fn is_matched(&self) -> bool {
        self.partner.is_some()
    }
}

fn partner_of(b: u8) -> Option<(u8, bool)> {
    match b {
        b'(' => Some((b')', true)),
        b'[' => Some((b']', true)),
        b'{' => Some((b'}', true)),
        b')' => Some((b'(', false)),
        b']' => Some((b'[', false)),
        b'}' => Some((b'{', false)),
        _ => None,
    }
}

/// Runs of unstyled bytes on the line holding `pos`, including its line
/// break, given the style string for `text`. Painting these leaves tokens
/// on the line untouched.
pub fn active_line_runs(text: &str, styles: &str, pos: usize) -> Vec<Range<usize>> {
    let (start, end) = line_bounds(text, pos.min(text.len()));
    let end = if text.as_bytes().get(end) == Some(&b'\n') { end + 1 } else { end };
    let styles = styles.as_bytes();
    let plain = TokenCategory::Plain.style_char() as u8;

    let mut runs: Vec<Range<usize>> = Vec::new();
    for i in start..end.min(styles.len()) {
        if styles[i] != plain {
            continue;
        }
        match runs.last_mut() {
            Some(run) if run.end == i => run.end = i + 1,
            _ => runs.push(i..i + 1),
        }
    }
    runs
}

/// Check the byte before the cursor, then the byte at it, for a bracket and
/// scan for its partner.
pub fn find_matching_bracket(text: &str, pos: usize) -> Option<BracketMatch> {
    let bytes = text.as_bytes();
    let pos = pos.min(bytes.len());
    let candidates = [pos.checked_sub(1), (pos < bytes.len()).then_some(pos)];
    candidates
        .into_iter()
        .flatten()
        .find(|&i| partner_of(bytes[i]).is_some())
        .map(|at| BracketMatch { at, partner: scan_partner(bytes, at) })
}

fn scan_partner(bytes: &[u8], at: usize) -> Option<usize> {
    let (_, forward) = partner_of(bytes[at])?;
    let mut stack = vec![bytes[at]];

    let indices: Box<dyn Iterator<Item = usize>> = if forward {
        Box::new((at + 1..bytes.len()).take(MAX_BRACKET_SCAN))
    } else {
        Box::new((0..at).rev().take(MAX_BRACKET_SCAN))
    };

    for i in indices {
        let b = bytes[i];
        let Some((expected, opens)) = partner_of(b) else {
            continue;
        };
        if opens == forward {
            stack.push(b);
            continue;
        }
        let top = stack.pop()?;
        if expected != top {
            return None;
        }
        if stack.is_empty() {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_filename() {
        assert_eq!(extract_filename(Path::new("/home/me/notes.md")), "notes.md");
        assert_eq!(extract_filename(Path::new("")), "Untitled");
    }

    #[test]
    fn test_line_bounds() {
        let text = "one\ntwo\nthree";
        assert_eq!(line_bounds(text, 0), (0, 3));
        assert_eq!(line_bounds(text, 5), (4, 7));
        assert_eq!(line_bounds(text, text.len()), (8, 13));
        assert_eq!(line_bounds(text, 3), (0, 3));
    }

    #[test]
    fn test_newline_indent() {
        let text = "    let x = {";
        assert_eq!(newline_indent(text, text.len(), 4), "        ");
        let text = "  plain";
        assert_eq!(newline_indent(text, text.len(), 4), "  ");
        assert_eq!(newline_indent("", 0, 4), "");
    }

    #[test]
    fn test_continue_bullet_list() {
        let text = "- first";
        assert_eq!(continue_markup(text, text.len()), NewlineAction::Continue("- ".into()));
        let text = "  * nested";
        assert_eq!(continue_markup(text, text.len()), NewlineAction::Continue("  * ".into()));
    }

    #[test]
    fn test_continue_ordered_list_increments() {
        let text = "9. ninth";
        assert_eq!(continue_markup(text, text.len()), NewlineAction::Continue("10. ".into()));
        let text = "1) one";
        assert_eq!(continue_markup(text, text.len()), NewlineAction::Continue("2) ".into()));
    }

    #[test]
    fn test_oversized_ordered_marker_is_not_a_list() {
        let text = "18446744073709551615. item";
        assert_eq!(continue_markup(text, text.len()), NewlineAction::Plain);
        let text = "1234567890. item";
        assert_eq!(continue_markup(text, text.len()), NewlineAction::Plain);

        let text = "999999999. item";
        assert_eq!(
            continue_markup(text, text.len()),
            NewlineAction::Continue("1000000000. ".into())
        );
    }

    #[test]
    fn test_continue_task_and_quote() {
        let text = "- [x] done";
        assert_eq!(continue_markup(text, text.len()), NewlineAction::Continue("- [ ] ".into()));
        let text = "> quoted";
        assert_eq!(continue_markup(text, text.len()), NewlineAction::Continue("> ".into()));
    }

    #[test]
    fn test_empty_item_clears_marker() {
        let text = "- one\n- ";
        assert_eq!(
            continue_markup(text, text.len()),
            NewlineAction::ClearMarker { start: 6, end: 8 }
        );
    }

    #[test]
    fn test_not_markup() {
        assert_eq!(continue_markup("plain text", 10), NewlineAction::Plain);
        assert_eq!(continue_markup("-dash", 5), NewlineAction::Plain);
        assert_eq!(continue_markup("2024 was a year", 15), NewlineAction::Plain);
    }

    #[test]
    fn test_markup_marker_before() {
        assert_eq!(markup_marker_before("text\n  - ", 9), Some((7, 9)));
        assert_eq!(markup_marker_before("- item", 6), None);
        assert_eq!(markup_marker_before("plain ", 6), None);
    }

    #[test]
    fn test_reindent_closing() {
        let text = "fn x() {\n        ";
        assert_eq!(
            reindent_closing(text, text.len(), '}', 4),
            Some((9, text.len(), "    ".to_string()))
        );
        let text = "fn x() {\n\t\t";
        assert_eq!(reindent_closing(text, text.len(), ']', 4), Some((9, 11, "\t".to_string())));
        assert_eq!(reindent_closing("a }", 2, '}', 4), None);
        assert_eq!(reindent_closing("    ", 4, 'x', 4), None);
    }

    #[test]
    fn test_bracket_before_cursor() {
        let text = "f(a[b])";
        let m = find_matching_bracket(text, text.len()).unwrap();
        assert_eq!(m, BracketMatch { at: 6, partner: Some(1) });
    }

    #[test]
    fn test_bracket_at_cursor() {
        let text = "{ x }";
        let m = find_matching_bracket(text, 0).unwrap();
        assert_eq!(m, BracketMatch { at: 0, partner: Some(4) });
    }

    #[test]
    fn test_unmatched_and_mismatched() {
        let m = find_matching_bracket("(abc", 0).unwrap();
        assert!(!m.is_matched());
        let m = find_matching_bracket("(abc]", 0).unwrap();
        assert!(!m.is_matched());
        assert_eq!(find_matching_bracket("abc", 1), None);
    }

    #[test]
    fn test_bracket_scan_limit() {
        let mut text = String::from("(");
        text.push_str(&"x".repeat(MAX_BRACKET_SCAN + 5));
        text.push(')');
        let m = find_matching_bracket(&text, 0).unwrap();
        assert_eq!(m.partner, None);
    }

    #[test]
    fn test_multibyte_text_is_safe() {
        let text = "é(ü)";
        let m = find_matching_bracket(text, text.len()).unwrap();
        assert_eq!(m.partner, Some(2));
    }

    #[test]
    fn test_active_line_runs_skip_tokens() {
        // "a *b* c\nnext": emphasis styled as 'V', everything else plain
        let text = "a *b* c\nnext";
        let styles = "AAVVVAAAAAAA";
        assert_eq!(active_line_runs(text, styles, 1), vec![0..2, 5..8]);
        assert_eq!(active_line_runs(text, styles, text.len()), vec![8..12]);
    }

    #[test]
    fn test_active_line_runs_empty_line() {
        let text = "one\n\ntwo";
        let styles = "AAAAAAAA";
        assert_eq!(active_line_runs(text, styles, 4), vec![4..5]);
        assert!(active_line_runs("", "", 0).is_empty());
    }
}
