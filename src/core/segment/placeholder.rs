//! Placeholder tokens and the table of protected originals.
//!
//! A token looks like `U+E000 <tag> <index> U+E001`. Private-use delimiters keep tokens inert: no
//! markdown, dollar, divider, list, table or URL pattern can match them. Caller text holding those
//! characters is neutralized during extraction, so every token in working text is one the engine wrote.

use std::collections::HashMap;
use std::fmt;

pub(crate) const TOKEN_OPEN: char = '\u{E000}';
pub(crate) const TOKEN_CLOSE: char = '\u{E001}';

/// Private-use characters reserved for tokens and resolver shields.
pub(crate) fn is_reserved(c: char) -> bool {
    ('\u{E000}'..='\u{E003}').contains(&c)
}

/// Kind of protected span. Indices are counted per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum PlaceholderKind {
    ImageId,
    MarkdownImage,
    Link,
    CodeBlock,
    /// Protected math, restored inline rather than promoted to its own segment.
    Math,
    /// A reserved character found in caller text, restored inline as-is.
    Reserved,
}

impl PlaceholderKind {
    const ALL: [PlaceholderKind; 6] = [
        PlaceholderKind::ImageId,
        PlaceholderKind::MarkdownImage,
        PlaceholderKind::Link,
        PlaceholderKind::CodeBlock,
        PlaceholderKind::Math,
        PlaceholderKind::Reserved,
    ];

    fn tag(self) -> &'static str {
        match self {
            PlaceholderKind::ImageId => "IMGID",
            PlaceholderKind::MarkdownImage => "IMG",
            PlaceholderKind::Link => "LINK",
            PlaceholderKind::CodeBlock => "CODE",
            PlaceholderKind::Math => "MATH",
            PlaceholderKind::Reserved => "RSV",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }
}

/// A parsed placeholder token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Placeholder {
    pub kind: PlaceholderKind,
    pub index: usize,
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            TOKEN_OPEN,
            self.kind.tag(),
            self.index,
            TOKEN_CLOSE
        )
    }
}

/// A placeholder found in text: byte range plus the parsed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Found {
    pub start: usize,
    pub end: usize,
    pub placeholder: Placeholder,
}

/// Parse a token body such as `CODE3`.
fn parse_body(body: &str) -> Option<Placeholder> {
    let digits_at = body.find(|c: char| c.is_ascii_digit())?;
    let (tag, digits) = body.split_at(digits_at);
    let kind = PlaceholderKind::from_tag(tag)?;
    let index = digits.parse().ok()?;
    Some(Placeholder { kind, index })
}

/// Find the first well-formed placeholder at or after `from`.
pub(crate) fn find_next(text: &str, from: usize) -> Option<Found> {
    let mut pos = from;
    while let Some(rel) = text.get(pos..)?.find(TOKEN_OPEN) {
        let start = pos + rel;
        let body_start = start + TOKEN_OPEN.len_utf8();
        let close_rel = text[body_start..].find(TOKEN_CLOSE)?;
        let body = &text[body_start..body_start + close_rel];
        let end = body_start + close_rel + TOKEN_CLOSE.len_utf8();
        if let Some(placeholder) = parse_body(body) {
            return Some(Found {
                start,
                end,
                placeholder,
            });
        }
        pos = body_start;
    }
    None
}

/// If `line` (trimmed) is exactly one placeholder, return it.
pub(crate) fn whole_line(line: &str) -> Option<Placeholder> {
    let trimmed = line.trim();
    let found = find_next(trimmed, 0)?;
    (found.start == 0 && found.end == trimmed.len()).then_some(found.placeholder)
}

/// Ordered record of protected originals. Entries are only ever appended.
#[derive(Debug, Clone, Default)]
pub(crate) struct PlaceholderTable {
    entries: Vec<(Placeholder, String)>,
    by_token: HashMap<Placeholder, usize>,
    next_index: HashMap<PlaceholderKind, usize>,
}

impl PlaceholderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `original` and return the token that stands in for it.
    pub fn insert(&mut self, kind: PlaceholderKind, original: &str) -> Placeholder {
        let next = self.next_index.entry(kind).or_default();
        let placeholder = Placeholder { kind, index: *next };
        *next += 1;
        self.by_token.insert(placeholder, self.entries.len());
        self.entries.push((placeholder, original.to_string()));
        placeholder
    }

    pub fn get(&self, placeholder: Placeholder) -> Option<&str> {
        let &at = self.by_token.get(&placeholder)?;
        Some(self.entries[at].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[(Placeholder, String)] {
        &self.entries
    }
}
