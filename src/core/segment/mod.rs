//! Chat content segmentation: split one message into groups of renderable bubbles.
//!
//! Pipeline: extract atomic spans into placeholders, resolve dollar ambiguity, split on `---`
//! dividers, segment each group line by line, then restore the placeholders. Every stage is a pure
//! function of its input; nothing is shared between calls.

mod error;
mod extract;
mod fence;
mod group;
mod lines;
mod placeholder;
mod resolve;
mod restore;
mod types;

pub use error::SegmentError;
pub use types::{MessageGroup, Segment, SegmentKind};

/// Path fragments of hosts that serve inline media. Bare URLs pointing there are left in the text
/// for the image pipeline instead of becoming link segments.
pub const DEFAULT_MEDIA_HOSTS: &[&str] = &[
    "supabase.co/storage/v1/object/",
    "/storage/v1/object/sign/",
    "/generated-images/",
];

/// Options for one segmentation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentOptions {
    /// When false, the whole trimmed input comes back as a single segment.
    pub enabled: bool,
    pub media_hosts: Vec<String>,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            media_hosts: DEFAULT_MEDIA_HOSTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn single_group(text: &str) -> Vec<MessageGroup> {
    vec![MessageGroup {
        segments: vec![Segment::text(text)],
    }]
}

/// Segment `content` into message groups.
///
/// Empty or whitespace-only content yields no groups. With `enabled == false` the trimmed content is
/// returned as one group with one segment.
pub fn segment(content: &str, options: &SegmentOptions) -> Vec<MessageGroup> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if !options.enabled {
        return single_group(trimmed);
    }

    let extraction = extract::extract(content, &options.media_hosts);
    let extract::Extraction { text, table } = resolve::resolve(extraction);

    let groups: Vec<MessageGroup> = group::split_groups(&text)
        .iter()
        .map(|chunk| MessageGroup {
            segments: restore::restore_all(&lines::segment_lines(chunk), &table),
        })
        .filter(|g| !g.is_empty())
        .collect();

    if groups.is_empty() && !trimmed.lines().all(|l| l.trim().is_empty() || group::is_divider(l)) {
        log::warn!("segmentation produced no groups, falling back to a single segment");
        return single_group(trimmed);
    }
    log::debug!(
        "segmented {} bytes into {} groups, {} segments",
        content.len(),
        groups.len(),
        groups.iter().map(MessageGroup::len).sum::<usize>()
    );
    groups
}

/// Segment raw bytes. Non-UTF-8 input is rejected before the pipeline runs.
pub fn segment_bytes(
    content: &[u8],
    options: &SegmentOptions,
) -> Result<Vec<MessageGroup>, SegmentError> {
    let text = std::str::from_utf8(content)?;
    Ok(segment(text, options))
}

/// Join groups back into one text: segments separated by blank lines, groups by `---` dividers.
pub fn rendered_join(groups: &[MessageGroup]) -> String {
    groups
        .iter()
        .map(|g| g.texts().join("\n\n"))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}
