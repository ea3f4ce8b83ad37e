//! Output types: typed segments grouped into message groups.

use serde::Serialize;

/// What a segment holds. The renderer picks a widget from this instead of sniffing the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Text,
    Code,
    Image,
    Link,
}

/// One renderable unit: trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    pub fn text(s: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Text,
            text: s.into(),
        }
    }

    pub fn new(kind: SegmentKind, s: impl Into<String>) -> Self {
        Self {
            kind,
            text: s.into(),
        }
    }
}

/// Segments between two `---` dividers. Rendered as one bubble cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageGroup {
    pub segments: Vec<Segment>,
}

impl MessageGroup {
    /// Segment texts in order, mostly for tests and plain output.
    pub fn texts(&self) -> Vec<&str> {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
