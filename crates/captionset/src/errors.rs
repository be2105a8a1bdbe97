//! # Error Types

use std::path::PathBuf;

/// Errors from captionset operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptionsetError {
    /// A required file or directory does not exist.
    #[error("not found: {}", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A path exists, but is not a directory.
    #[error("not a directory: {}", path.display())]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The file suffix does not name a supported data format.
    #[error("file {} can not be loaded; choose one of: {accepted}", path.display())]
    UnsupportedFormat {
        /// The offending path.
        path: PathBuf,

        /// The accepted suffixes.
        accepted: String,
    },

    /// A data file could not be parsed.
    #[error("parse error in {}: {message}", path.display())]
    Parse {
        /// The file being parsed.
        path: PathBuf,

        /// The underlying parser message.
        message: String,
    },

    /// A token is not present in the vocabulary.
    #[error("unknown token: {0:?}")]
    UnknownToken(String),

    /// A token index is not present in the vocabulary.
    #[error("unknown token index: {0}")]
    UnknownIndex(usize),

    /// An example index is past the end of the dataset.
    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,

        /// The dataset length.
        len: usize,
    },

    /// No caption has this caption index.
    #[error("unknown caption index: {0}")]
    UnknownCaption(usize),

    /// A caption references an image index with no image record.
    #[error("caption {caption_idx} references missing image {img_idx}")]
    DanglingImage {
        /// The caption index.
        caption_idx: usize,

        /// The missing image index.
        img_idx: usize,
    },

    /// Feature arrays which must be stacked disagree in shape.
    #[error("feature {} has shape {found:?}, expected {expected:?}", path.display())]
    ShapeMismatch {
        /// The feature file with the unexpected shape.
        path: PathBuf,

        /// The shape of the first feature.
        expected: Vec<usize>,

        /// The shape found.
        found: Vec<usize>,
    },

    /// The options are inconsistent.
    #[error("invalid config: {0}")]
    Config(String),

    /// Image decode error.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Error from an external component.
    #[error("{0}")]
    External(String),
}

/// Result type for captionset operations.
pub type CSResult<T> = core::result::Result<T, CaptionsetError>;
