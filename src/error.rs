use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Input unavailable: {path:?}: {reason}")]
    InputUnavailable { path: PathBuf, reason: String },

    #[error("Insufficient data: no known position among {frames} observations")]
    InsufficientData { frames: usize },

    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Unknown color map: {0}")]
    UnknownColorMap(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Shape Error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image Error: {0}")]
    Image(#[from] image::ImageError),

    #[cfg(feature = "opencv")]
    #[error("OpenCV Error: {0}")]
    OpenCv(#[from] opencv::Error),
}

impl Error {
    pub fn input_unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::InputUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
