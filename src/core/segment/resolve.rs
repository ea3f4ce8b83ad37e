//! Dollar-sign disambiguation: currency, variable reference, or math.
//!
//! Inline code, escaped `\$` and `**bold**` spans are shielded first so their dollars never pair with
//! anything outside them. Bold content is resolved on its own and comes back as `<strong>..</strong>`.
//! Currency dollars are escaped as `&#36;`; math spans are swapped for inline placeholders so that no
//! later stage splits a formula.
//!
//! A single `$` pairs with the next `$` on the same line only if the opener is followed by a non-space,
//! the closer is preceded by a non-space and the closer is not followed by a digit.

use std::sync::LazyLock;

use regex::Regex;

use super::extract::Extraction;
use super::placeholder::{PlaceholderKind, PlaceholderTable};

pub(crate) const ESCAPED_DOLLAR: &str = "&#36;";

const SHIELD_OPEN: char = '\u{E002}';
const SHIELD_CLOSE: char = '\u{E003}';

static CURRENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d[\d,.]*[KMBkmb]?(?:\s+(?i:thousand|million|billion|trillion))?|[A-Z]{1,5})$")
        .expect("valid currency regex")
});

static CURRENCY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d[\d,.]*[KMBkmb]?(?:\s+(?i:thousand|million|billion|trillion)\b)?|[A-Z]{1,5})")
        .expect("valid currency prefix regex")
});

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("valid identifier regex"));

static TEMPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{[a-zA-Z_][a-zA-Z0-9_]*\}").expect("valid template regex"));

static LATEX_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[a-zA-Z]+").expect("valid latex regex"));

/// How a `$`-delimited candidate is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DollarClass {
    Currency,
    Variable,
    Math,
    Literal,
}

/// Classify the inner content of a closed `$...$` span. First matching rule wins.
pub(crate) fn classify(inner: &str) -> DollarClass {
    if CURRENCY.is_match(inner) && !is_mathy(inner) {
        return DollarClass::Currency;
    }
    if is_variable(inner) {
        return DollarClass::Variable;
    }
    let mut chars = inner.chars();
    if let (Some(c), None) = (chars.next(), chars.next())
        && c.is_alphabetic()
    {
        return DollarClass::Math;
    }
    if is_mathy(inner) || inner.chars().count() > 3 {
        return DollarClass::Math;
    }
    DollarClass::Literal
}

/// Identifier of two or more characters, or a `{identifier}` template.
fn is_variable(inner: &str) -> bool {
    (inner.len() >= 2 && IDENTIFIER.is_match(inner))
        || TEMPLATE.find(inner).is_some_and(|m| m.end() == inner.len())
}

fn is_math_symbol(c: char) -> bool {
    matches!(c,
        '\u{0391}'..='\u{03A9}'
        | '\u{03B1}'..='\u{03C9}'
        | '\u{2190}'..='\u{21FF}'
        | '\u{2200}'..='\u{22FF}'
        | '±' | '×' | '÷' | '·')
}

/// Math operator, LaTeX command, or Greek letter / math symbol.
pub(crate) fn is_mathy(s: &str) -> bool {
    s.chars()
        .any(|c| matches!(c, '+' | '-' | '*' | '/' | '=' | '^' | '_' | '<' | '>' | '|') || is_math_symbol(c))
        || LATEX_COMMAND.is_match(s)
}

/// Length of a currency amount or ticker right after a `$`, if it ends at a word boundary.
fn currency_prefix_len(after: &str) -> Option<usize> {
    let m = CURRENCY_PREFIX.find(after)?;
    let boundary = after[m.end()..]
        .chars()
        .next()
        .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
    boundary.then_some(m.end())
}

/// Offset of the `$` closing the single-dollar span opened at `open`.
fn closing_dollar(text: &str, open: usize) -> Option<usize> {
    let after = &text[open + 1..];
    if after.chars().next()?.is_whitespace() {
        return None;
    }
    let rel = after.find(['$', '\n'])?;
    if !after[rel..].starts_with('$') {
        return None;
    }
    let close = open + 1 + rel;
    if text[..close].chars().next_back()?.is_whitespace() {
        return None;
    }
    if text[close + 1..].starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(close)
}

/// Stand-ins for spans that dollar analysis must not look into.
#[derive(Debug, Default)]
struct Shields {
    replacements: Vec<String>,
}

impl Shields {
    fn push(&mut self, replacement: String) -> String {
        let token = format!("{}{}{}", SHIELD_OPEN, self.replacements.len(), SHIELD_CLOSE);
        self.replacements.push(replacement);
        token
    }

    /// Put every shielded span back. Replacements may themselves hold older tokens.
    fn restore(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find(SHIELD_OPEN) {
            out.push_str(&rest[..start]);
            let body = &rest[start + SHIELD_OPEN.len_utf8()..];
            let parsed = body.find(SHIELD_CLOSE).and_then(|close| {
                let index: usize = body[..close].parse().ok()?;
                Some((self.replacements.get(index)?, close))
            });
            match parsed {
                Some((replacement, close)) => {
                    out.push_str(&self.restore(replacement));
                    rest = &body[close + SHIELD_CLOSE.len_utf8()..];
                }
                None => {
                    out.push(SHIELD_OPEN);
                    rest = body;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Shield `` `code` `` spans (same-length backtick runs on one line).
fn shield_inline_code(text: &str, shields: &mut Shields) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('`') {
        out.push_str(&rest[..start]);
        let from_tick = &rest[start..];
        let run = from_tick.bytes().take_while(|&b| b == b'`').count();
        let body = &from_tick[run..];
        let fence = "`".repeat(run);
        let close = body
            .find(&fence)
            .filter(|&close| !body[..close].contains('\n'));
        match close {
            Some(close) if !body[close + run..].starts_with('`') => {
                let end = run + close + run;
                out.push_str(&shields.push(from_tick[..end].to_string()));
                rest = &from_tick[end..];
            }
            _ => {
                out.push_str(&from_tick[..run]);
                rest = body;
            }
        }
    }
    out.push_str(rest);
    out
}

fn shield_escaped_dollars(text: &str, shields: &mut Shields) -> String {
    if !text.contains("\\$") {
        return text.to_string();
    }
    let token = shields.push("\\$".to_string());
    text.replace("\\$", &token)
}

/// Shield `**bold**` spans on one line; the inner text is resolved in isolation.
fn shield_bold(text: &str, shields: &mut Shields, table: &mut PlaceholderTable) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("**") {
        out.push_str(&rest[..start]);
        let body = &rest[start + 2..];
        let span = body
            .find("**")
            .filter(|&close| !body[..close].contains('\n'))
            .map(|close| {
                // `***x***`: the closer is the last two stars of the run
                if body[close + 2..].starts_with('*') {
                    close + 1
                } else {
                    close
                }
            });
        match span {
            Some(close)
                if !body[..close].trim().is_empty()
                    && !body.starts_with(char::is_whitespace)
                    && !body[..close].ends_with(char::is_whitespace) =>
            {
                let inner = resolve_dollars(&body[..close], shields, table);
                let token = shields.push(format!("<strong>{}</strong>", inner));
                out.push_str(&token);
                rest = &body[close + 2..];
            }
            _ => {
                out.push_str("**");
                rest = body;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Walk every `$` in `text` and apply the classification rules.
fn resolve_dollars(text: &str, shields: &Shields, table: &mut PlaceholderTable) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;

    while let Some(rel) = text[pos..].find('$') {
        let at = pos + rel;

        if text[at..].starts_with("$$") {
            let inner_start = at + 2;
            match text[inner_start..].find("$$") {
                Some(close) if !text[inner_start..inner_start + close].trim().is_empty() => {
                    let end = inner_start + close + 2;
                    out.push_str(&text[copied..at]);
                    let original = shields.restore(&text[at..end]);
                    out.push_str(&table.insert(PlaceholderKind::Math, &original).to_string());
                    copied = end;
                    pos = end;
                }
                _ => pos = inner_start,
            }
            continue;
        }

        let after = &text[at + 1..];
        if let Some(m) = TEMPLATE.find(after) {
            pos = at + 1 + m.end();
            continue;
        }

        if let Some(close) = closing_dollar(text, at) {
            let inner = &text[at + 1..close];
            let class = match classify(inner) {
                DollarClass::Literal | DollarClass::Math
                    if !is_mathy(inner) && currency_prefix_len(inner).is_some() =>
                {
                    None
                }
                class => Some(class),
            };
            match class {
                Some(DollarClass::Currency | DollarClass::Literal) => {
                    out.push_str(&text[copied..at]);
                    out.push_str(ESCAPED_DOLLAR);
                    out.push_str(inner);
                    out.push_str(ESCAPED_DOLLAR);
                    copied = close + 1;
                    pos = close + 1;
                    continue;
                }
                Some(DollarClass::Variable) => {
                    pos = close + 1;
                    continue;
                }
                Some(DollarClass::Math) => {
                    out.push_str(&text[copied..at]);
                    let original = shields.restore(&text[at..close + 1]);
                    out.push_str(&table.insert(PlaceholderKind::Math, &original).to_string());
                    copied = close + 1;
                    pos = close + 1;
                    continue;
                }
                // currency amount followed by plain words: judged as a lone `$` below
                None => {}
            }
        }

        match currency_prefix_len(after) {
            Some(len) => {
                out.push_str(&text[copied..at]);
                out.push_str(ESCAPED_DOLLAR);
                copied = at + 1;
                pos = at + 1 + len;
            }
            None => pos = at + 1,
        }
    }
    out.push_str(&text[copied..]);
    out
}

/// Run the resolver over extracted text. Math spans are added to the placeholder table.
pub(crate) fn resolve(extraction: Extraction) -> Extraction {
    let Extraction { text, mut table } = extraction;
    let before = table.len();

    let mut shields = Shields::default();
    let text = shield_inline_code(&text, &mut shields);
    let text = shield_escaped_dollars(&text, &mut shields);
    let text = shield_bold(&text, &mut shields, &mut table);
    let text = resolve_dollars(&text, &shields, &mut table);
    let text = shields.restore(&text);

    log::debug!("protected {} math spans", table.len() - before);
    Extraction { text, table }
}
