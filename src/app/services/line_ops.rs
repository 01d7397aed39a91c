//! Whole-line editing tools (Tools menu).
//!
//! Lines are separated by `\n`; a trailing newline yields a final empty
//! line, which the tools keep in place.

use std::cmp::Ordering;

fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Insert a copy of `line` directly below it.
pub fn duplicate_line(text: &str, line: usize) -> Option<String> {
    let mut lines = split_lines(text);
    let current = *lines.get(line)?;
    lines.insert(line + 1, current);
    Some(lines.join("\n"))
}

/// Swap `line` with the line above. None on the first line.
pub fn move_line_up(text: &str, line: usize) -> Option<String> {
    let mut lines = split_lines(text);
    if line == 0 || line >= lines.len() {
        return None;
    }
    lines.swap(line - 1, line);
    Some(lines.join("\n"))
}

/// Swap `line` with the line below. None on the last line.
pub fn move_line_down(text: &str, line: usize) -> Option<String> {
    let mut lines = split_lines(text);
    if line + 1 >= lines.len() {
        return None;
    }
    lines.swap(line, line + 1);
    Some(lines.join("\n"))
}

fn natural_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Sort the inclusive line range `lines` (or every line when `None`),
/// ignoring case first and breaking ties by the raw text.
pub fn sort_lines(text: &str, lines: Option<(usize, usize)>) -> String {
    let mut all = split_lines(text);
    if all.is_empty() {
        return text.to_string();
    }
    let last = all.len() - 1;
    let (start, end) = match lines {
        Some((a, b)) => (a.min(b).min(last), a.max(b).min(last)),
        None => (0, last),
    };
    all[start..=end].sort_by(|a, b| natural_order(a, b));
    all.join("\n")
}

/// Strip trailing whitespace from every line.
pub fn trim_trailing_whitespace(text: &str) -> String {
    split_lines(text)
        .into_iter()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn change_case(text: &str, upper: bool) -> String {
    if upper {
        text.to_uppercase()
    } else {
        text.to_lowercase()
    }
}
