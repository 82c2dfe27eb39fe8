use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("points length mismatch: expected {expected} points (one per skeleton node), got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("array shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("node not found in skeleton: {0}")]
    NodeNotFound(String),

    #[error("node index {index} out of range for skeleton with {len} nodes")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("duplicate node name in skeleton: {0}")]
    DuplicateNode(String),

    #[error("predicted instances cannot be derived from another prediction (from_predicted must be None)")]
    FromPredictedNotAllowed,
}
