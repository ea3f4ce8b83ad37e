//! Entity extraction: swap atomic constructs for placeholders in one left-to-right pass.
//!
//! At each position the recognizers run in priority order: `[IMAGE_ID:..]`, `![alt](url)`, a code fence
//! (line starts only), `[text](url)`, then a bare URL. The first match consumes its span, so nothing
//! inside a fence or a link is ever seen by a later recognizer. Reserved private-use characters in the
//! caller's text are swapped for placeholders of their own before anything else can read them.

use std::collections::HashMap;

use super::fence;
use super::placeholder::{self, PlaceholderKind, PlaceholderTable};

const IMAGE_ID_PREFIX: &str = "[IMAGE_ID:";

/// Working text with placeholders plus the table of what they replaced.
#[derive(Debug, Clone)]
pub(crate) struct Extraction {
    pub text: String,
    pub table: PlaceholderTable,
}

/// Bracket and parenthesis pairs of one line, computed once when the scan enters the line.
struct Line {
    end: usize,
    /// `[` offset to the offset just past its matching `]`.
    brackets: HashMap<usize, usize>,
    /// `(` offset to the offset just past its matching `)`.
    parens: HashMap<usize, usize>,
    /// Offsets of every `]`, ascending.
    closers: Vec<usize>,
}

impl Line {
    fn scan(s: &str, pos: usize) -> Self {
        let start = s[..pos].rfind('\n').map_or(0, |i| i + 1);
        let end = s[pos..].find('\n').map_or(s.len(), |i| pos + i);
        let mut line = Line {
            end,
            brackets: HashMap::new(),
            parens: HashMap::new(),
            closers: Vec::new(),
        };
        let mut open_brackets = Vec::new();
        let mut open_parens = Vec::new();
        for (i, c) in s[start..end].char_indices() {
            let at = start + i;
            match c {
                '[' => open_brackets.push(at),
                ']' => {
                    line.closers.push(at);
                    if let Some(open) = open_brackets.pop() {
                        line.brackets.insert(open, at + 1);
                    }
                }
                '(' => open_parens.push(at),
                ')' => {
                    if let Some(open) = open_parens.pop() {
                        line.parens.insert(open, at + 1);
                    }
                }
                _ => {}
            }
        }
        line
    }

    /// Offset just past the `]` matching the `[` at `open`.
    fn close_bracket(&self, open: usize) -> Option<usize> {
        self.brackets.get(&open).copied()
    }

    /// Balance parentheses from the `(` at `open`; URLs may contain nested pairs.
    fn close_paren(&self, open: usize) -> Paren {
        match self.parens.get(&open) {
            Some(&end) => Paren::Closed(end),
            None => Paren::Open(self.end),
        }
    }

    /// First `]` at or after `from`.
    fn next_closer(&self, from: usize) -> Option<usize> {
        let i = self.closers.partition_point(|&c| c < from);
        self.closers.get(i).copied()
    }
}

/// Result of scanning a `(...)` destination.
enum Paren {
    /// Offset just past the balancing `)`.
    Closed(usize),
    /// Line ended first; offset of that end.
    Open(usize),
}

/// What a bare URL scan found.
enum Url {
    Link(usize),
    /// Points at a media host; copied through untouched.
    Media(usize),
}

/// Run the extractor over raw `input`. URLs containing any of `media_hosts` are left in place.
pub(crate) fn extract(input: &str, media_hosts: &[String]) -> Extraction {
    let mut text = String::with_capacity(input.len());
    let mut table = PlaceholderTable::new();
    let mut line: Option<Line> = None;
    let mut pos = 0;
    let mut copied = 0;

    while pos < input.len() {
        let at_line_start = pos == 0 || input.as_bytes()[pos - 1] == b'\n';
        if line.as_ref().is_none_or(|l| pos > l.end) {
            line = Some(Line::scan(input, pos));
        }
        let Some(l) = line.as_ref() else { break };

        let next = input[pos..].chars().next();
        if let Some(c) = next
            && placeholder::is_reserved(c)
        {
            let end = pos + c.len_utf8();
            text.push_str(&input[copied..pos]);
            let token = table.insert(PlaceholderKind::Reserved, &input[pos..end]);
            text.push_str(&token.to_string());
            pos = end;
            copied = end;
            continue;
        }

        let matched = match_image_id(input, pos, l)
            .map(|end| (PlaceholderKind::ImageId, end))
            .or_else(|| {
                match_markdown_image(input, pos, l).map(|end| (PlaceholderKind::MarkdownImage, end))
            })
            .or_else(|| {
                at_line_start
                    .then(|| fence::match_fence(input, pos))
                    .flatten()
                    .map(|end| (PlaceholderKind::CodeBlock, end))
            })
            .or_else(|| match_link(input, pos, l).map(|end| (PlaceholderKind::Link, end)));

        match matched {
            Some((kind, end)) => {
                text.push_str(&input[copied..pos]);
                let placeholder = table.insert(kind, &input[pos..end]);
                text.push_str(&placeholder.to_string());
                pos = end;
                copied = end;
            }
            None => match match_bare_url(input, pos, media_hosts) {
                Some(Url::Link(end)) => {
                    text.push_str(&input[copied..pos]);
                    let placeholder = table.insert(PlaceholderKind::Link, &input[pos..end]);
                    text.push_str(&placeholder.to_string());
                    pos = end;
                    copied = end;
                }
                Some(Url::Media(end)) => pos = end,
                None => pos += next.map_or(1, char::len_utf8),
            },
        }
    }
    text.push_str(&input[copied..]);

    log::debug!("extracted {} protected spans", table.len());
    Extraction { text, table }
}

/// `[IMAGE_ID:<id>]` with a non-empty id on one line.
fn match_image_id(s: &str, pos: usize, line: &Line) -> Option<usize> {
    if !s[pos..].starts_with(IMAGE_ID_PREFIX) {
        return None;
    }
    let id_start = pos + IMAGE_ID_PREFIX.len();
    let close = line.next_closer(id_start)?;
    if s[id_start..close].trim().is_empty() {
        return None;
    }
    Some(close + 1)
}

/// `![alt](url)`. An unbalanced destination is still captured up to the end of its line.
fn match_markdown_image(s: &str, pos: usize, line: &Line) -> Option<usize> {
    if !s[pos..].starts_with("![") {
        return None;
    }
    let alt_end = line.close_bracket(pos + 1)?;
    if !s[alt_end..].starts_with('(') {
        return None;
    }
    match line.close_paren(alt_end) {
        Paren::Closed(end) | Paren::Open(end) => Some(end),
    }
}

/// `[text](url)`, complete on one line.
fn match_link(s: &str, pos: usize, line: &Line) -> Option<usize> {
    if !s[pos..].starts_with('[') {
        return None;
    }
    let text_end = line.close_bracket(pos)?;
    if !s[text_end..].starts_with('(') {
        return None;
    }
    match line.close_paren(text_end) {
        Paren::Closed(end) if end > text_end + 2 => Some(end),
        _ => None,
    }
}

fn url_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '<' | '>' | '"' | '`') && !placeholder::is_reserved(c)
}

/// Bare `http(s)://` URL starting at a word boundary. Trailing punctuation and unbalanced
/// closing brackets are left out of the span.
fn match_bare_url(s: &str, pos: usize, media_hosts: &[String]) -> Option<Url> {
    let rest = &s[pos..];
    let scheme_len = if rest.starts_with("https://") {
        8
    } else if rest.starts_with("http://") {
        7
    } else {
        return None;
    };
    if let Some(prev) = s[..pos].chars().next_back()
        && (prev.is_alphanumeric() || matches!(prev, '/' | ':' | '.' | '_' | '-'))
    {
        return None;
    }

    let mut end = rest
        .char_indices()
        .find(|&(_, c)| !url_char(c))
        .map_or(rest.len(), |(i, _)| i);
    let balance = |open: char, close: char| {
        let url = &rest[..end];
        url.matches(open).count() as isize - url.matches(close).count() as isize
    };
    let mut parens = balance('(', ')');
    let mut brackets = balance('[', ']');
    while let Some(last) = rest[..end].chars().next_back() {
        let trim = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | '*' | '\'' => true,
            ')' => parens < 0,
            ']' => brackets < 0,
            _ => false,
        };
        if !trim {
            break;
        }
        match last {
            ')' => parens += 1,
            ']' => brackets += 1,
            _ => {}
        }
        end -= last.len_utf8();
    }
    if end <= scheme_len {
        return None;
    }

    let url = &rest[..end];
    if media_hosts.iter().any(|h| url.contains(h.as_str())) {
        log::debug!("leaving media url for the image pipeline: {}", url);
        return Some(Url::Media(pos + end));
    }
    Some(Url::Link(pos + end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::segment::placeholder::find_next;

    fn originals(ex: &Extraction) -> Vec<(PlaceholderKind, &str)> {
        ex.table
            .entries()
            .iter()
            .map(|(p, s)| (p.kind, s.as_str()))
            .collect()
    }

    fn hosts() -> Vec<String> {
        vec!["cdn.media.test/storage/".to_string()]
    }

    #[test]
    fn plain_text_is_untouched() {
        let ex = extract("just words, no links", &hosts());
        assert_eq!(ex.text, "just words, no links");
        assert_eq!(ex.table.len(), 0);
    }

    #[test]
    fn image_id_marker() {
        let ex = extract("look [IMAGE_ID:abc_1] here", &hosts());
        assert_eq!(
            originals(&ex),
            vec![(PlaceholderKind::ImageId, "[IMAGE_ID:abc_1]")]
        );
        assert!(ex.text.starts_with("look "));
        assert!(ex.text.ends_with(" here"));
    }

    #[test]
    fn image_with_parens_in_url() {
        let src = "see ![chart](https://x.test/a_(b).png) now";
        let ex = extract(src, &hosts());
        assert_eq!(
            originals(&ex),
            vec![(
                PlaceholderKind::MarkdownImage,
                "![chart](https://x.test/a_(b).png)"
            )]
        );
        assert!(ex.text.ends_with(" now"));
    }

    #[test]
    fn unbalanced_image_captures_rest_of_line() {
        let ex = extract("![x](https://x.test/a(b\nnext", &hosts());
        assert_eq!(
            originals(&ex),
            vec![(PlaceholderKind::MarkdownImage, "![x](https://x.test/a(b")]
        );
        assert!(ex.text.ends_with("\nnext"));
    }

    #[test]
    fn fence_protects_its_contents() {
        let src = "intro\n```md\n[a](b) https://x.test $5\n```\nafter";
        let ex = extract(src, &hosts());
        assert_eq!(
            originals(&ex),
            vec![(
                PlaceholderKind::CodeBlock,
                "```md\n[a](b) https://x.test $5\n```"
            )]
        );
        assert!(!ex.text.contains('$'));
    }

    #[test]
    fn unterminated_fence_is_captured() {
        let ex = extract("text\n```js\nconsole.log(1)", &hosts());
        assert_eq!(
            originals(&ex),
            vec![(PlaceholderKind::CodeBlock, "```js\nconsole.log(1)")]
        );
    }

    #[test]
    fn link_and_bare_url() {
        let ex = extract(
            "read [the docs](https://d.test/x) or https://e.test/y.",
            &hosts(),
        );
        assert_eq!(
            originals(&ex),
            vec![
                (PlaceholderKind::Link, "[the docs](https://d.test/x)"),
                (PlaceholderKind::Link, "https://e.test/y"),
            ]
        );
        assert!(ex.text.ends_with('.'));
    }

    #[test]
    fn bare_url_in_parens_drops_closing_paren() {
        let ex = extract("(see https://w.test/page)", &hosts());
        assert_eq!(
            originals(&ex),
            vec![(PlaceholderKind::Link, "https://w.test/page")]
        );
        assert!(ex.text.ends_with(')'));
    }

    #[test]
    fn media_host_url_is_left_alone() {
        let src = "https://cdn.media.test/storage/img.png";
        let ex = extract(src, &hosts());
        assert_eq!(ex.text, src);
        assert_eq!(ex.table.len(), 0);
    }

    #[test]
    fn bracket_without_destination_is_text() {
        let ex = extract("[not a link] and [x]", &hosts());
        assert_eq!(ex.table.len(), 0);
    }

    #[test]
    fn placeholders_replace_in_order() {
        let ex = extract("[a](1) [b](2)", &hosts());
        let first = find_next(&ex.text, 0).unwrap();
        let second = find_next(&ex.text, first.end).unwrap();
        assert_eq!(first.placeholder.index, 0);
        assert_eq!(second.placeholder.index, 1);
    }

    #[test]
    fn deterministic() {
        let src = "![i](u) ```\nx\n``` [l](m) https://n.test";
        let a = extract(src, &hosts());
        let b = extract(src, &hosts());
        assert_eq!(a.text, b.text);
        assert_eq!(originals(&a), originals(&b));
    }

    #[test]
    fn reserved_characters_are_neutralized() {
        let ex = extract("user typed \u{E000}CODE0\u{E001} and \u{E002}1\u{E003}", &hosts());
        assert_eq!(
            originals(&ex),
            vec![
                (PlaceholderKind::Reserved, "\u{E000}"),
                (PlaceholderKind::Reserved, "\u{E001}"),
                (PlaceholderKind::Reserved, "\u{E002}"),
                (PlaceholderKind::Reserved, "\u{E003}"),
            ]
        );
        let mut from = 0;
        while let Some(found) = find_next(&ex.text, from) {
            assert_eq!(found.placeholder.kind, PlaceholderKind::Reserved);
            from = found.end;
        }
        assert!(!ex.text.contains('\u{E002}'));
    }

    #[test]
    fn url_stops_at_reserved_character() {
        let ex = extract("https://x.test/a\u{E000}", &hosts());
        assert_eq!(originals(&ex)[0], (PlaceholderKind::Link, "https://x.test/a"));
        assert_eq!(originals(&ex)[1].0, PlaceholderKind::Reserved);
    }

    #[test]
    fn media_url_with_nested_url_stays_whole() {
        let src = "https://cdn.media.test/storage/a.png?next=https://other.test/b";
        let ex = extract(src, &hosts());
        assert_eq!(ex.text, src);
        assert_eq!(ex.table.len(), 0);
    }

    #[test]
    fn links_after_unmatched_brackets_on_one_line() {
        let ex = extract("[[ [a](b) ]", &hosts());
        assert_eq!(originals(&ex), vec![(PlaceholderKind::Link, "[a](b)")]);
    }

    #[test]
    fn long_lines_scan_in_linear_time() {
        let inputs = [
            "[".repeat(200_000),
            "[x](".repeat(50_000),
            "![a](".repeat(40_000),
            "[IMAGE_ID:".repeat(20_000),
            format!("https://x.test/{}", ")".repeat(100_000)),
        ];
        let started = std::time::Instant::now();
        for input in &inputs {
            let ex = extract(input, &hosts());
            assert!(!ex.text.is_empty());
        }
        assert!(
            started.elapsed() < std::time::Duration::from_secs(5),
            "took {:?}",
            started.elapsed()
        );
    }
}
