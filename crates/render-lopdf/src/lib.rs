//! PDF assembly for rendered ink.
//!
//! [`PdfAssembler`] places page rasters either on fresh pages or on top of
//! pages imported from a source PDF, then adds the footer and document
//! metadata and serializes the result in memory.

mod assembler;
mod error;
mod metadata;
mod raster;

pub use assembler::{PdfAssembler, RASTER_PREFIX};
pub use error::AssemblyError;
pub use metadata::{pdf_date, text_string, win_ansi, DocumentInfo, Footer};
pub use raster::EncodedRaster;
