//! Fenced code block scanning.
//!
//! A fence opens on a line whose first non-blank characters are three or more backticks and closes on a
//! line holding only backticks, at least as many as the opener. An unclosed fence runs to end of input,
//! so a block that is still streaming stays in one piece.

/// Length of the backtick run opening `line`, if it opens a fence.
/// An info string holding a backtick means inline code such as ```` ```x``` ````, not a fence.
fn opening_run(line: &str) -> Option<usize> {
    let rest = line.trim_start_matches([' ', '\t']);
    let run = rest.bytes().take_while(|&b| b == b'`').count();
    (run >= 3 && !rest[run..].contains('`')).then_some(run)
}

/// True if `line` closes a fence opened with `run` backticks.
fn closes(line: &str, run: usize) -> bool {
    let trimmed = line.trim();
    let count = trimmed.bytes().take_while(|&b| b == b'`').count();
    count >= run && count == trimmed.len()
}

/// True if `line` looks like a fence boundary (opening or closing backtick run).
pub(crate) fn is_fence_line(line: &str) -> bool {
    opening_run(line).is_some()
}

/// Match a fenced block starting at `start`, which must be a line start.
/// Returns the end byte offset (exclusive, excluding the closing line's newline).
pub(crate) fn match_fence(text: &str, start: usize) -> Option<usize> {
    let first_end = text[start..]
        .find('\n')
        .map(|i| start + i)
        .unwrap_or(text.len());
    let run = opening_run(&text[start..first_end])?;

    let mut line_start = first_end + 1;
    while line_start <= text.len() && first_end < text.len() {
        let line_end = text[line_start..]
            .find('\n')
            .map(|i| line_start + i)
            .unwrap_or(text.len());
        if closes(&text[line_start..line_end], run) {
            return Some(line_end);
        }
        if line_end >= text.len() {
            break;
        }
        line_start = line_end + 1;
    }
    Some(text.len())
}
