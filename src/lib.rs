//! # chat-segments
//!
//! Splits raw, markdown-like chat text into ordered groups of renderable bubbles. Code fences,
//! images and links are never broken apart, and `$` signs are sorted into currency, variable
//! references and math before anything downstream sees them.

pub mod core;

pub use crate::core::segment::{
    DEFAULT_MEDIA_HOSTS, MessageGroup, Segment, SegmentError, SegmentKind, SegmentOptions,
    rendered_join, segment, segment_bytes,
};
