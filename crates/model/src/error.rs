use thiserror::Error;

/// Malformed notebook metadata. Raised before any rendering is attempted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("invalid file type {0:?}")]
    InvalidFileType(String),

    #[error("invalid orientation {0:?}")]
    InvalidOrientation(String),

    #[error("invalid text align {0:?}")]
    InvalidTextAlign(String),

    #[error("pageCount does not match number of pages {count} != {actual}")]
    PageCountMismatch { count: usize, actual: usize },

    #[error("cover page {0} is not an existing page")]
    CoverPageOutOfRange(i64),

    #[error("no layers defined")]
    NoLayers,

    #[error("maximum number of layers exceeded ({count} > {max})")]
    TooManyLayers { count: usize, max: usize },

    #[error("layer name must not be empty (layer {index})")]
    EmptyLayerName { index: usize },

    #[error("non-finite sample in layer {layer}, stroke {stroke} (segment {segment:?})")]
    NonFiniteSample {
        layer: usize,
        stroke: usize,
        /// `None` when the stroke thickness itself is not finite.
        segment: Option<usize>,
    },

    #[error("malformed metadata: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::Malformed(err.to_string())
    }
}

/// Failures reported by a [`crate::Document`] implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("page {0:?} not found")]
    PageNotFound(String),

    #[error("document {0:?} has no source PDF")]
    MissingSourcePdf(String),

    #[error("failed to load page {page:?}: {message}")]
    Load { page: String, message: String },
}
