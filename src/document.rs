//! Rendering whole documents: single pages as PNG or PDF, or every page into
//! one PDF.

use crate::error::Error;
use image::RgbaImage;
use inkpress_executor::{Executor, ExecutorImpl};
use inkpress_model::{Document, Drawing, FileType};
use inkpress_pdf_composer::PageImporter;
use inkpress_raster::{Background, PageRenderer, RenderContext, RenderError};
use inkpress_render_lopdf::{DocumentInfo, EncodedRaster, Footer, PdfAssembler};
use inkpress_types::{Margins, PageSize};
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Where page rasters go on a PDF page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfLayout {
    /// Size of native pages. Pages imported from a source PDF keep their own.
    pub page_size: PageSize,
    pub margins: Margins,
    /// Stamp the page footer on full-document renders.
    pub footer: bool,
}

impl Default for PdfLayout {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margins: Margins::default(),
            footer: true,
        }
    }
}

/// One page's inputs, loaded before any pixel work starts.
struct PageJob {
    drawing: Arc<Drawing>,
    template: Option<Arc<RgbaImage>>,
    background: Background,
}

/// Why a page job produced no raster.
enum PageFailure {
    Failed(Error),
    /// Not attempted because another page had already failed.
    Skipped,
}

/// Drives [`PageRenderer`] over the pages of a [`Document`].
#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    context: Arc<RenderContext>,
    layout: PdfLayout,
    executor: ExecutorImpl,
}

impl DocumentRenderer {
    pub fn new(context: Arc<RenderContext>) -> Self {
        Self {
            context,
            layout: PdfLayout::default(),
            executor: ExecutorImpl::default(),
        }
    }

    pub fn with_layout(mut self, layout: PdfLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_executor(mut self, executor: ExecutorImpl) -> Self {
        self.executor = executor;
        self
    }

    pub fn context(&self) -> &Arc<RenderContext> {
        &self.context
    }

    pub fn layout(&self) -> &PdfLayout {
        &self.layout
    }

    pub fn executor_name(&self) -> &'static str {
        self.executor.name()
    }

    /// Renders one page, with its background template, as PNG.
    pub fn render_page_png<W: Write>(
        &self,
        doc: &dyn Document,
        page_id: &str,
        sink: W,
    ) -> Result<(), Error> {
        let job = self.load_page(doc, page_id, Background::Palette, true)?;
        let canvas = rasterize(&self.context, &job)?;
        inkpress_raster::encode_png(&canvas, sink)?;
        Ok(())
    }

    /// Renders one page onto a blank page of a minimal PDF, without
    /// metadata or footer.
    pub fn render_page_pdf<W: Write>(
        &self,
        doc: &dyn Document,
        page_id: &str,
        mut sink: W,
    ) -> Result<(), Error> {
        let job = self.load_page(doc, page_id, Background::Palette, true)?;
        let raster = EncodedRaster::encode(&rasterize(&self.context, &job)?, false)?;

        let mut assembler = PdfAssembler::new();
        assembler.add_page(
            self.layout.page_size,
            self.layout.margins,
            self.context.palette().background(),
            raster,
        )?;
        sink.write_all(&assembler.finish()?)?;
        Ok(())
    }

    /// Renders every page of `doc` into one PDF.
    ///
    /// Notebook pages land on blank pages; pages of a PDF-backed document are
    /// drawn over the matching page of its source PDF. Workers compress each
    /// page as soon as it is rasterized, and the first failing page stops the
    /// remaining work. The PDF reaches `sink` only once every page rendered.
    pub fn render_pdf<W: Write>(&self, doc: &dyn Document, mut sink: W) -> Result<(), Error> {
        let file_type = doc.file_type();
        let overlay = match file_type {
            FileType::Notebook => false,
            FileType::Pdf => true,
            FileType::Epub => {
                return Err(Error::UnsupportedFileType {
                    target: "PDF",
                    file_type,
                });
            }
        };
        doc.content().validate()?;

        let (background, with_template) = if overlay {
            (Background::Transparent, false)
        } else {
            (Background::Palette, true)
        };
        let jobs = doc
            .pages()
            .iter()
            .map(|page_id| self.load_page(doc, page_id, background, with_template))
            .collect::<Result<Vec<_>, _>>()?;

        let source = if overlay {
            let bytes = doc.source_pdf()?;
            let source = lopdf::Document::load_mem(&bytes)
                .map_err(|e| Error::SourcePdf(e.to_string()))?;
            let available = source.get_pages().len();
            if available < jobs.len() {
                return Err(Error::SourcePageCount {
                    available,
                    required: jobs.len(),
                });
            }
            Some(source)
        } else {
            None
        };

        let context = Arc::clone(&self.context);
        let failed = Arc::new(AtomicBool::new(false));
        let results = self.executor.execute_all_fallible(jobs, move |job| {
            if failed.load(Ordering::Relaxed) {
                return Err(PageFailure::Skipped);
            }
            encode_page(&context, &job, overlay).map_err(|err| {
                failed.store(true, Ordering::Relaxed);
                PageFailure::Failed(err)
            })
        });
        let rasters = collect_pages(results)?;

        let mut assembler = PdfAssembler::new()
            .with_info(DocumentInfo::new(doc.name(), doc.last_modified()));
        if self.layout.footer {
            assembler = assembler.with_footer(Footer::new(
                doc.name(),
                doc.version(),
                doc.last_modified(),
            ));
        }

        match &source {
            Some(source) => {
                let mut importer = PageImporter::new(source);
                for (number, raster) in (1u32..).zip(rasters) {
                    assembler.add_overlay_page(
                        &mut importer,
                        number,
                        self.layout.margins,
                        raster,
                    )?;
                }
            }
            None => {
                let background = self.context.palette().background();
                for raster in rasters {
                    assembler.add_page(
                        self.layout.page_size,
                        self.layout.margins,
                        background,
                        raster,
                    )?;
                }
            }
        }

        let page_count = assembler.page_count();
        let bytes = assembler.finish()?;
        sink.write_all(&bytes)?;
        log::info!(
            "Rendered '{}' ({} pages, {}) to PDF, {} bytes",
            doc.name(),
            page_count,
            file_type.as_str(),
            bytes.len()
        );
        Ok(())
    }

    fn load_page(
        &self,
        doc: &dyn Document,
        page_id: &str,
        background: Background,
        with_template: bool,
    ) -> Result<PageJob, Error> {
        if let Some(meta) = doc.page_metadata(page_id) {
            meta.validate()?;
        }
        let drawing = doc.drawing(page_id)?;
        drawing.validate()?;
        let template = if with_template {
            self.context.page_template(doc.page_template(page_id).as_deref())?
        } else {
            None
        };
        Ok(PageJob {
            drawing,
            template,
            background,
        })
    }
}

fn rasterize(context: &RenderContext, job: &PageJob) -> Result<RgbaImage, RenderError> {
    PageRenderer::new(context)
        .with_background(job.background)
        .render(&job.drawing, job.template.as_deref())
}

/// Rasterizes a page and compresses it, dropping the raw pixels.
fn encode_page(
    context: &RenderContext,
    job: &PageJob,
    with_alpha: bool,
) -> Result<EncodedRaster, Error> {
    let canvas = rasterize(context, job)?;
    Ok(EncodedRaster::encode(&canvas, with_alpha)?)
}

/// All pages in order, or the error of the earliest page that failed.
fn collect_pages(
    results: Vec<Result<EncodedRaster, PageFailure>>,
) -> Result<Vec<EncodedRaster>, Error> {
    let mut pages = Vec::with_capacity(results.len());
    let mut skipped = 0;
    for result in results {
        match result {
            Ok(page) => pages.push(page),
            Err(PageFailure::Failed(err)) => {
                if skipped > 0 {
                    log::debug!("Skipped {} pages after a failure", skipped);
                }
                return Err(err);
            }
            Err(PageFailure::Skipped) => skipped += 1,
        }
    }
    Ok(pages)
}
