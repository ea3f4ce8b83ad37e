//! Block-aware line segmentation of one message group.
//!
//! Lines are walked once. Headers get their own segment, list and table blocks are consumed whole,
//! and blank lines, rules and fence boundaries close the paragraph being built.

use std::sync::LazyLock;

use regex::Regex;

use super::fence;
use super::placeholder::{self, PlaceholderKind};

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,3}[ \t]").expect("valid header regex"));

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*(?:[-*+]|\d{1,9}[.)])[ \t]+(?:\[[ xX]\][ \t]*)?\S").expect("valid list regex")
});

static TABLE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\|.*\|\s*$").expect("valid table regex"));

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

pub(crate) fn is_header(line: &str) -> bool {
    HEADER.is_match(line)
}

pub(crate) fn is_table_row(line: &str) -> bool {
    TABLE_ROW.is_match(line)
}

/// Three or more of the same `-`, `*` or `_`, optionally separated by spaces.
pub(crate) fn is_rule(line: &str) -> bool {
    let mut marks = line.chars().filter(|c| !c.is_whitespace());
    let Some(first) = marks.next() else {
        return false;
    };
    if !matches!(first, '-' | '*' | '_') {
        return false;
    }
    let mut count = 1;
    for c in marks {
        if c != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

pub(crate) fn is_list_item(line: &str) -> bool {
    LIST_ITEM.is_match(line) && !is_rule(line)
}

/// Leading whitespace width; a tab counts as four columns.
fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// A line that is nothing but bold text, either markdown or already converted.
pub(crate) fn is_bold_only(line: &str) -> bool {
    let trimmed = line.trim();
    let t = trimmed.strip_suffix(':').unwrap_or(trimmed);
    if let Some(inner) = t
        .strip_prefix("<strong>")
        .and_then(|s| s.strip_suffix("</strong>"))
    {
        return !inner.trim().is_empty() && !inner.contains("<strong>");
    }
    if let Some(inner) = t.strip_prefix("**").and_then(|s| s.strip_suffix("**")) {
        return !inner.trim().is_empty() && !inner.contains("**");
    }
    false
}

/// A fence marker or a line holding only a code placeholder.
fn is_fence_boundary(line: &str) -> bool {
    fence::is_fence_line(line)
        || placeholder::whole_line(line).is_some_and(|p| p.kind == PlaceholderKind::CodeBlock)
}

/// Whether `line` keeps a list block open whose first item sits at `min_indent`.
fn continues_list(line: &str, min_indent: usize) -> bool {
    if is_list_item(line) {
        indent_width(line) >= min_indent
    } else {
        !is_blank(line) && indent_width(line) > min_indent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Default,
    /// Inside a list whose first item sits at `min_indent` columns.
    InListBlock { min_indent: usize },
    InTableBlock,
}

/// One emitted segment. `atomic` marks list and table blocks, whose inline links and images
/// must stay in place when placeholders are restored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Block {
    pub text: String,
    pub atomic: bool,
}

/// Accumulates lines and emits trimmed, non-empty segments.
struct Segmenter<'a> {
    current: Vec<&'a str>,
    /// The last non-blank line in `current` is bold-only, so the next line stays with it.
    lead_in: bool,
    segments: Vec<Block>,
}

impl<'a> Segmenter<'a> {
    fn new() -> Self {
        Self {
            current: Vec::new(),
            lead_in: false,
            segments: Vec::new(),
        }
    }

    fn push(&mut self, line: &'a str) {
        if !is_blank(line) {
            self.lead_in = is_bold_only(line);
        }
        self.current.push(line);
    }

    fn emit(&mut self, text: &str, atomic: bool) {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            self.segments.push(Block {
                text: trimmed.to_string(),
                atomic,
            });
        }
    }

    fn flush_as(&mut self, atomic: bool) {
        let joined = self.current.join("\n");
        self.emit(&joined, atomic);
        self.current.clear();
        self.lead_in = false;
    }

    fn flush(&mut self) {
        self.flush_as(false);
    }

    /// Open a list or table block, attached to a bold lead-in when there is one.
    fn open_block(&mut self, line: &'a str) {
        if !self.lead_in {
            self.flush();
        }
        self.push(line);
    }
}

/// Split one group into segments. Placeholders pass through untouched.
pub(crate) fn segment_lines(chunk: &str) -> Vec<Block> {
    let lines: Vec<&str> = chunk.split('\n').collect();
    let mut seg = Segmenter::new();
    let mut state = State::Default;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        match state {
            State::InListBlock { min_indent } => {
                if is_blank(line) {
                    // a loose list stays open when the next content line continues it
                    let next = (i..lines.len()).find(|&k| !is_blank(lines[k]));
                    if let Some(k) = next
                        && continues_list(lines[k], min_indent)
                    {
                        for &blank in &lines[i..k] {
                            seg.push(blank);
                        }
                        i = k;
                        continue;
                    }
                } else if continues_list(line, min_indent) {
                    seg.push(line);
                    i += 1;
                    continue;
                }
                log::trace!("list block closed at line {}", i);
                seg.flush_as(true);
                state = State::Default;
            }
            State::InTableBlock => {
                if is_table_row(line) {
                    seg.push(line);
                    i += 1;
                    continue;
                }
                log::trace!("table block closed at line {}", i);
                seg.flush_as(true);
                state = State::Default;
            }
            State::Default => {
                if is_header(line) {
                    seg.flush();
                    seg.emit(line, false);
                } else if is_list_item(line) {
                    seg.open_block(line);
                    state = State::InListBlock {
                        min_indent: indent_width(line),
                    };
                } else if is_table_row(line) {
                    seg.open_block(line);
                    state = State::InTableBlock;
                } else if is_blank(line) {
                    if seg.lead_in {
                        seg.push(line);
                    } else {
                        seg.flush();
                    }
                } else if is_rule(line) {
                    seg.flush();
                } else if is_fence_boundary(line) {
                    seg.flush();
                    seg.emit(line, false);
                } else {
                    seg.push(line);
                }
                i += 1;
            }
        }
    }
    seg.flush_as(state != State::Default);
    seg.segments
}
