//! Placeholder restoration: put protected spans back and promote block-level ones.

use std::collections::HashSet;

use super::lines::Block;
use super::placeholder::{self, Placeholder, PlaceholderKind, PlaceholderTable};
use super::types::{Segment, SegmentKind};

fn segment_kind(kind: PlaceholderKind) -> Option<SegmentKind> {
    match kind {
        PlaceholderKind::ImageId | PlaceholderKind::MarkdownImage => Some(SegmentKind::Image),
        PlaceholderKind::Link => Some(SegmentKind::Link),
        PlaceholderKind::CodeBlock => Some(SegmentKind::Code),
        PlaceholderKind::Math | PlaceholderKind::Reserved => None,
    }
}

struct Restorer<'t> {
    table: &'t PlaceholderTable,
    atomic: bool,
    out: Vec<Segment>,
    pending: String,
    /// Math tokens already opened in this segment; each is expanded at most once.
    expanded: HashSet<Placeholder>,
}

impl Restorer<'_> {
    /// Push the pending text as a trimmed Text segment unless it is empty.
    fn flush_text(&mut self) {
        let trimmed = self.pending.trim();
        if !trimmed.is_empty() {
            self.out.push(Segment::text(trimmed));
        }
        self.pending.clear();
    }

    fn walk(&mut self, text: &str) {
        let table = self.table;
        let mut copied = 0;
        let mut search_from = 0;
        while let Some(found) = placeholder::find_next(text, search_from) {
            search_from = found.end;
            let token = found.placeholder;
            let Some(original) = table.get(token) else {
                log::warn!(
                    "no table entry for {:?} #{}, leaving placeholder in place",
                    token.kind,
                    token.index
                );
                continue;
            };
            self.pending.push_str(&text[copied..found.start]);
            copied = found.end;

            let promote =
                segment_kind(token.kind).filter(|&kind| !self.atomic || kind == SegmentKind::Code);
            match promote {
                Some(kind) => {
                    self.flush_text();
                    let block = original.trim();
                    if !block.is_empty() {
                        self.out.push(Segment::new(kind, block));
                    }
                }
                // a formula may carry older placeholders
                None if token.kind == PlaceholderKind::Math => {
                    if self.expanded.insert(token) {
                        self.walk(original);
                    } else {
                        log::warn!("math #{} refers to itself, leaving it in place", token.index);
                        self.pending.push_str(&text[found.start..found.end]);
                    }
                }
                None => self.pending.push_str(original),
            }
        }
        self.pending.push_str(&text[copied..]);
    }
}

/// Restore one segment into one or more typed segments.
///
/// Images, links and code blocks become standalone segments; the text around them stays as
/// separate segments in order. Inside an `atomic` list or table block only code is promoted, so
/// a row or item is never torn apart. Math is substituted inline. A placeholder with no table
/// entry is kept as-is.
pub(crate) fn restore_segment(
    segment: &str,
    atomic: bool,
    table: &PlaceholderTable,
) -> Vec<Segment> {
    let mut restorer = Restorer {
        table,
        atomic,
        out: Vec::new(),
        pending: String::new(),
        expanded: HashSet::new(),
    };
    restorer.walk(segment);
    restorer.flush_text();
    restorer.out
}

/// Restore every segment of a group, in order.
pub(crate) fn restore_all(blocks: &[Block], table: &PlaceholderTable) -> Vec<Segment> {
    blocks
        .iter()
        .flat_map(|b| restore_segment(&b.text, b.atomic, table))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(entries: &[(PlaceholderKind, &str)]) -> (PlaceholderTable, Vec<String>) {
        let mut table = PlaceholderTable::new();
        let tokens = entries
            .iter()
            .map(|(k, s)| table.insert(*k, s).to_string())
            .collect();
        (table, tokens)
    }

    #[test]
    fn inline_link_is_promoted() {
        let (table, t) = table_with(&[(PlaceholderKind::Link, "[docs](https://d.test)")]);
        let out = restore_segment(&format!("See {} for more.", t[0]), false, &table);
        assert_eq!(
            out,
            vec![
                Segment::text("See"),
                Segment::new(SegmentKind::Link, "[docs](https://d.test)"),
                Segment::text("for more."),
            ]
        );
    }

    #[test]
    fn code_block_splits_paragraph() {
        let (table, t) = table_with(&[(PlaceholderKind::CodeBlock, "```rs\nlet x = 1;\n```")]);
        let out = restore_segment(&format!("before\n{}\nafter", t[0]), false, &table);
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].kind, SegmentKind::Code);
        assert_eq!(out[1].text, "```rs\nlet x = 1;\n```");
    }

    #[test]
    fn image_id_is_an_image_segment() {
        let (table, t) = table_with(&[(PlaceholderKind::ImageId, "[IMAGE_ID:42]")]);
        let out = restore_segment(&t[0], false, &table);
        assert_eq!(out, vec![Segment::new(SegmentKind::Image, "[IMAGE_ID:42]")]);
    }

    #[test]
    fn math_is_restored_inline() {
        let (table, t) = table_with(&[(PlaceholderKind::Math, "$x^2$")]);
        let out = restore_segment(&format!("area is {} here", t[0]), false, &table);
        assert_eq!(out, vec![Segment::text("area is $x^2$ here")]);
    }

    #[test]
    fn math_holding_a_link_placeholder() {
        let (mut table, t) = table_with(&[(PlaceholderKind::Link, "https://l.test")]);
        let math = table.insert(PlaceholderKind::Math, &format!("$a {} b$", t[0]));
        let out = restore_segment(&format!("x {} y", math), false, &table);
        assert_eq!(out.len(), 3);
        assert_eq!(out[1], Segment::new(SegmentKind::Link, "https://l.test"));
    }

    #[test]
    fn missing_entry_fails_open() {
        let table = PlaceholderTable::new();
        let orphan = Placeholder {
            kind: PlaceholderKind::Link,
            index: 7,
        }
        .to_string();
        let out = restore_segment(&format!("text {}", orphan), false, &table);
        assert_eq!(out, vec![Segment::text(format!("text {}", orphan))]);
    }

    #[test]
    fn adjacent_blocks_keep_order() {
        let (table, t) = table_with(&[
            (PlaceholderKind::MarkdownImage, "![a](b)"),
            (PlaceholderKind::MarkdownImage, "![c](d)"),
        ]);
        let block = Block {
            text: format!("{} {}", t[0], t[1]),
            atomic: false,
        };
        let out = restore_all(&[block], &table);
        assert_eq!(
            out,
            vec![
                Segment::new(SegmentKind::Image, "![a](b)"),
                Segment::new(SegmentKind::Image, "![c](d)"),
            ]
        );
    }

    #[test]
    fn links_stay_inline_in_table_rows() {
        let (table, t) = table_with(&[
            (PlaceholderKind::Link, "[a](https://a.test)"),
            (PlaceholderKind::CodeBlock, "```\nx\n```"),
        ]);
        let row = format!("| {} | b |", t[0]);
        assert_eq!(
            restore_segment(&row, true, &table),
            vec![Segment::text("| [a](https://a.test) | b |")]
        );
        let item = format!("- item\n  {}", t[1]);
        let out = restore_segment(&item, true, &table);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].kind, SegmentKind::Code);
    }

    #[test]
    fn self_referencing_math_is_expanded_once() {
        let mut table = PlaceholderTable::new();
        let own = Placeholder {
            kind: PlaceholderKind::Math,
            index: 0,
        }
        .to_string();
        let math = table.insert(PlaceholderKind::Math, &format!("$a {} b$", own));
        assert_eq!(math.to_string(), own);
        let out = restore_segment(&format!("x {} y", math), false, &table);
        assert_eq!(out, vec![Segment::text(format!("x $a {} b$ y", own))]);
    }

    #[test]
    fn reserved_characters_come_back_verbatim() {
        let (table, t) = table_with(&[
            (PlaceholderKind::Reserved, "\u{E000}"),
            (PlaceholderKind::Reserved, "\u{E001}"),
        ]);
        let out = restore_segment(&format!("typed {}CODE0{}", t[0], t[1]), false, &table);
        assert_eq!(out, vec![Segment::text("typed \u{E000}CODE0\u{E001}")]);
    }

    #[test]
    fn many_inline_spans_in_one_segment() {
        let mut table = PlaceholderTable::new();
        let text: String = (0..20_000)
            .map(|i| format!("{} ", table.insert(PlaceholderKind::Math, &format!("$m{}$", i))))
            .collect();
        let out = restore_segment(&text, false, &table);
        assert_eq!(out.len(), 1);
        assert!(out[0].text.starts_with("$m0$ $m1$"));
        assert!(out[0].text.ends_with("$m19999$"));
    }
}
