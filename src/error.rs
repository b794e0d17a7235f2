use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unsupported score width: expected {expected} classes, got {found}")]
    ScoreWidth { expected: usize, found: usize },

    #[error("Row count mismatch: expected {expected}, got {found}")]
    RowCount { expected: usize, found: usize },

    #[error("Class index {0} has no detector column")]
    ClassIndex(usize),

    #[error("Video mismatch: {video} != {other}")]
    VideoMismatch { video: String, other: String },

    #[error("Detector Error: {0}")]
    Detector(String),

    #[error("Image Error: {0}")]
    Image(String),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
}
