use inkpress_pdf_composer::ComposerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF generation error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error(transparent)]
    Composer(#[from] ComposerError),

    #[error("cannot place an empty {width}x{height} raster")]
    EmptyRaster { width: u32, height: u32 },

    #[error("overlay raster for source page {0} has no alpha channel")]
    OpaqueOverlay(u32),
}
