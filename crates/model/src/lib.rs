//! The decoded digital-ink model consumed by the renderer.
//!
//! Parsing the tablet's binary line format is done elsewhere; this crate only
//! describes the in-memory result (drawings, layers, strokes, segments), the
//! notebook `.content` metadata with its validation rules, and the
//! [`Document`] capability a renderer queries for pages.

mod content;
mod document;
mod error;
mod ink;
mod pagedata;

pub use content::{
    Content, FileType, LayerMetadata, LineHeight, Orientation, PageMetadata, TextAlign, Transform,
    DEFAULT_COVER_PAGE, MAX_LAYERS,
};
pub use document::{Document, InMemoryDocument};
pub use error::{DocumentError, ValidationError};
pub use ink::{BrushColor, BrushKind, Drawing, Layer, Segment, Stroke};
pub use pagedata::{read_pagedata, write_pagedata, BLANK_TEMPLATE};
