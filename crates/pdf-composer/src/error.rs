use lopdf::ObjectId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("source PDF has no page {0}")]
    PageNotFound(u32),

    #[error("page {page:?} is malformed: {message}")]
    MalformedPage { page: ObjectId, message: String },
}
