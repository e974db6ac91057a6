use thiserror::Error;

/// Reasons an imported history is rejected.
///
/// Every variant is raised before the history is touched.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("history data must be a non-null object")]
    InvalidData,

    #[error("history cursor must be a number")]
    InvalidCursorType,

    #[error("history entries must be an array")]
    InvalidEntries,

    #[error("history entry {index} must be a non-null object")]
    InvalidEntry { index: usize },

    #[error("history entry {index} has an invalid '{field}' field")]
    InvalidEntryField { index: usize, field: &'static str },

    #[error("history cursor {cursor} is outside 0..={len}")]
    CursorOutOfRange { cursor: f64, len: usize },

    #[error("malformed history JSON: {0}")]
    Json(#[from] serde_json::Error),
}
