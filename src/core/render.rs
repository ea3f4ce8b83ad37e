//! Output formats for segmented messages.

use crate::core::segment::{MessageGroup, SegmentKind};

/// Pretty JSON: an array of groups, each an array of `{ "kind", "text" }` segments.
pub fn render_json(groups: &[MessageGroup]) -> Result<String, serde_json::Error> {
    let nested: Vec<_> = groups.iter().map(|g| &g.segments).collect();
    serde_json::to_string_pretty(&nested)
}

/// Plain text: segments separated by blank lines, groups by `---`.
pub fn render_text(groups: &[MessageGroup]) -> String {
    crate::core::segment::rendered_join(groups)
}

fn label(kind: SegmentKind) -> &'static str {
    match kind {
        SegmentKind::Text => "text",
        SegmentKind::Code => "code",
        SegmentKind::Image => "image",
        SegmentKind::Link => "link",
    }
}

/// Split text into lines of at most `width` columns. Uses textwrap for UTF-8 widths.
fn wrap_text(s: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![s.to_string()];
    }
    textwrap::wrap(s, width)
        .into_iter()
        .map(|cow| cow.into_owned())
        .collect()
}

/// Split a segment into display lines respecting its newlines, then wrap to `width`.
/// Code is never rewrapped.
fn wrap_segment(text: &str, kind: SegmentKind, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for line in text.split('\n') {
        if line.is_empty() {
            out.push(String::new());
        } else if kind == SegmentKind::Code {
            out.push(line.to_string());
        } else {
            out.extend(wrap_text(line, width));
        }
    }
    out
}

/// One box per segment, the way a chat client would show separate bubbles.
pub fn render_bubbles(groups: &[MessageGroup], width: usize) -> String {
    let inner = width.saturating_sub(4).max(1);
    let mut out = String::new();
    for (gi, group) in groups.iter().enumerate() {
        if gi > 0 {
            out.push_str(&format!("{}\n", "═".repeat(width.max(3))));
        }
        for segment in &group.segments {
            let lines = wrap_segment(&segment.text, segment.kind, inner);
            let body = lines
                .iter()
                .map(|l| textwrap::core::display_width(l))
                .max()
                .unwrap_or(0)
                .max(label(segment.kind).len() + 2);
            out.push_str(&format!(
                "╭─ {} {}╮\n",
                label(segment.kind),
                "─".repeat(body.saturating_sub(label(segment.kind).len() + 1))
            ));
            for line in &lines {
                let pad = body - textwrap::core::display_width(line);
                out.push_str(&format!("│ {}{} │\n", line, " ".repeat(pad)));
            }
            out.push_str(&format!("╰{}╯\n", "─".repeat(body + 2)));
        }
    }
    out
}
