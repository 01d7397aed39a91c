use std::ops::Range;
use std::path::Path;

use regex_lite::{NoExpand, Regex, RegexBuilder};

use crate::app::domain::document::CursorPos;

/// Extract filename from a file path
///
/// Returns the filename component of a path, or "Unknown" if it can't be extracted.
pub fn extract_filename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != ".")
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Compile `search` as a literal, case-insensitive pattern. Regex
/// metacharacters in the search term are escaped, so `a.b` only matches `a.b`.
fn literal_pattern(search: &str) -> Option<Regex> {
    if search.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex_lite::escape(search))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Snap `pos` forward to the next char boundary.
fn ceil_char_boundary(text: &str, mut pos: usize) -> usize {
    while pos < text.len() && !text.is_char_boundary(pos) {
        pos += 1;
    }
    pos.min(text.len())
}

/// Find next occurrence of search string in text, ignoring case
///
/// Returns the byte range of the match, or None if not found.
/// Searches from start_pos onwards.
pub fn find_in_text(text: &str, search: &str, start_pos: usize) -> Option<Range<usize>> {
    if start_pos >= text.len() {
        return None;
    }
    let re = literal_pattern(search)?;
    let start = ceil_char_boundary(text, start_pos);
    re.find(&text[start..])
        .map(|m| start + m.start()..start + m.end())
}

/// Case-insensitive search from `from`, wrapping to the start of the text
/// once the end is reached.
///
/// Returns the match range and whether the search wrapped.
pub fn find_next_wrapping(text: &str, search: &str, from: usize) -> Option<(Range<usize>, bool)> {
    if let Some(range) = find_in_text(text, search, from) {
        return Some((range, false));
    }
    find_in_text(text, search, 0).map(|range| (range, true))
}

/// Convert a 1-based line number to a byte position in the text
///
/// Returns None if the line number is 0 or beyond the end of the text.
pub fn line_number_to_byte_position(text: &str, line: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    if line == 1 {
        return Some(0);
    }

    let mut current_line = 1;
    for (i, ch) in text.char_indices() {
        if ch == '\n' {
            current_line += 1;
            if current_line == line {
                return Some(i + 1);
            }
        }
    }
    None
}

/// Number of lines as the editor counts them: an empty text has one line.
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// Byte offset of a cursor position. Lines past the end clamp to the end of
/// the text, columns past the end of a line clamp to the line end.
pub fn cursor_to_offset(text: &str, pos: CursorPos) -> usize {
    let line_start = match line_number_to_byte_position(text, pos.line + 1) {
        Some(start) => start,
        None => return text.len(),
    };
    let line_end = text[line_start..]
        .find('\n')
        .map_or(text.len(), |i| line_start + i);
    let line = &text[line_start..line_end];
    line_start
        + line
            .char_indices()
            .nth(pos.column)
            .map_or(line.len(), |(i, _)| i)
}

/// Cursor position of a byte offset (clamped to the text).
pub fn offset_to_cursor(text: &str, offset: usize) -> CursorPos {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &text[..offset];
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    CursorPos {
        line,
        column: before[line_start..].chars().count(),
    }
}

/// Clamp a cursor so it points inside the text.
pub fn clamp_cursor(text: &str, pos: CursorPos) -> CursorPos {
    offset_to_cursor(text, cursor_to_offset(text, pos))
}

/// Replace all occurrences of search string with replacement
///
/// The search term is matched literally and ignoring case; the replacement is inserted
/// verbatim (`$1` is not expanded).
/// Returns (new_text, count_of_replacements)
pub fn replace_all_in_text(text: &str, search: &str, replace: &str) -> (String, usize) {
    let re = match literal_pattern(search) {
        Some(re) => re,
        None => return (text.to_string(), 0),
    };

    let count = re.find_iter(text).count();
    if count == 0 {
        return (text.to_string(), 0);
    }
    (re.replace_all(text, NoExpand(replace)).into_owned(), count)
}

/// Line and word counts shown in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStats {
    pub lines: usize,
    pub words: usize,
}

pub fn text_stats(text: &str) -> TextStats {
    TextStats {
        lines: line_count(text),
        words: text.split_whitespace().count(),
    }
}
