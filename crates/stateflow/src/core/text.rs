//! Shared text utilities for diagram rendering
//!
//! Column arithmetic uses display width, not byte length, so labels with
//! wide characters still line up.

use unicode_width::UnicodeWidthStr;

/// Display width of a string in terminal columns
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// A run of spaces as wide as `text`
///
/// # Example
/// ```
/// use stateflow::core::blank_like;
///
/// assert_eq!(blank_like("A -->"), "     ");
/// ```
pub fn blank_like(text: &str) -> String {
    " ".repeat(display_width(text))
}

/// Strip trailing whitespace from every line and join with newlines
pub fn join_trimmed(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}
