//! Divider grouping: split working text on lines that hold only `---`.

use std::sync::LazyLock;

use regex::Regex;

static DIVIDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*---\s*$").expect("valid divider regex"));

/// True if `line` is a group divider.
pub(crate) fn is_divider(line: &str) -> bool {
    DIVIDER.is_match(line)
}

/// Split `text` into divider-delimited chunks. Divider lines are dropped, as are chunks that are
/// empty after trimming.
pub(crate) fn split_groups(text: &str) -> Vec<String> {
    let mut groups = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        if is_divider(line) {
            push_chunk(&mut groups, &current);
            current.clear();
        } else {
            current.push(line);
        }
    }
    push_chunk(&mut groups, &current);
    groups
}

fn push_chunk(groups: &mut Vec<String>, lines: &[&str]) {
    let chunk = lines.join("\n");
    if !chunk.trim().is_empty() {
        groups.push(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_divider() {
        assert_eq!(split_groups("A\n\n---\n\nB"), vec!["A\n", "\nB"]);
    }

    #[test]
    fn divider_with_surrounding_whitespace() {
        assert_eq!(split_groups("A\n  ---  \nB"), vec!["A", "B"]);
    }

    #[test]
    fn longer_rules_are_not_dividers() {
        assert_eq!(split_groups("A\n----\nB"), vec!["A\n----\nB"]);
        assert!(!is_divider("- - -"));
        assert!(!is_divider("|---|---|"));
    }

    #[test]
    fn only_dividers_yields_nothing() {
        assert!(split_groups("---").is_empty());
        assert!(split_groups("\n---\n\n---\n").is_empty());
    }

    #[test]
    fn indentation_preserved_inside_chunk() {
        assert_eq!(split_groups("- a\n  - b"), vec!["- a\n  - b"]);
    }
}
