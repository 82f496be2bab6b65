use inkpress_model::{DocumentError, FileType, ValidationError};
use inkpress_pdf_composer::ComposerError;
use inkpress_raster::RenderError;
use inkpress_render_lopdf::AssemblyError;
use thiserror::Error;

/// Everything that can stop a document render.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Rendering failed: {0}")]
    Render(RenderError),

    #[error("PDF assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("render {target} not supported for file type {}", .file_type.as_str())]
    UnsupportedFileType {
        target: &'static str,
        file_type: FileType,
    },

    #[error("source PDF has {available} pages, document needs {required}")]
    SourcePageCount { available: usize, required: usize },

    #[error("invalid source PDF: {0}")]
    SourcePdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<RenderError> for Error {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Validation(v) => Error::Validation(v),
            other => Error::Render(other),
        }
    }
}

impl From<ComposerError> for Error {
    fn from(err: ComposerError) -> Self {
        Error::Assembly(AssemblyError::Composer(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
