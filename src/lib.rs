//! # inkpress
//!
//! Renders decoded digital-ink notebooks to PNG images and PDF documents.
//!
//! ```no_run
//! use inkpress::{RenderConfig, init_logging, LoggingConfig};
//! # fn run(doc: &dyn inkpress::Document) -> Result<(), inkpress::Error> {
//! init_logging(LoggingConfig::default());
//! let renderer = RenderConfig::from_file("inkpress.json")?.build_renderer();
//! let file = std::fs::File::create("notes.pdf")?;
//! renderer.render_pdf(doc, file)?;
//! # Ok(())
//! # }
//! ```
//!
//! Pages are rasterized by [`PageRenderer`] against a shared [`RenderContext`]
//! and assembled into PDFs by [`DocumentRenderer`].

mod config;
mod document;
mod error;
mod logging;

pub use config::{PaletteConfig, PdfConfig, RenderConfig};
pub use document::{DocumentRenderer, PdfLayout};
pub use error::Error;
pub use logging::{init_logging, LoggingConfig};

pub use inkpress_executor::{Executor, ExecutorImpl, SyncExecutor};
#[cfg(feature = "rayon-executor")]
pub use inkpress_executor::RayonExecutor;
pub use inkpress_model::{
    BrushColor, BrushKind, Content, Document, DocumentError, Drawing, FileType, InMemoryDocument,
    Layer, LayerMetadata, PageMetadata, Segment, Stroke, ValidationError,
};
pub use inkpress_raster::{
    encode_png, Background, Brush, PageRenderer, Palette, RenderContext, RenderError, PAGE_HEIGHT,
    PAGE_WIDTH,
};
pub use inkpress_render_lopdf::{AssemblyError, DocumentInfo, EncodedRaster, Footer};
pub use inkpress_resource::FilesystemResourceProvider;
pub use inkpress_traits::{InMemoryResourceProvider, ResourceError, ResourceProvider};
pub use inkpress_types::{Color, Margins, PageSize};
