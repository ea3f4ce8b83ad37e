//! Errors raised at the engine boundary.

/// Caller misuse. The pipeline itself never fails; this is only returned before it runs.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    #[error("content is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },
}

impl From<std::str::Utf8Error> for SegmentError {
    fn from(e: std::str::Utf8Error) -> Self {
        SegmentError::InvalidUtf8 {
            valid_up_to: e.valid_up_to(),
        }
    }
}
