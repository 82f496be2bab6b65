use crate::error::AssemblyError;
use crate::metadata::{win_ansi, DocumentInfo, Footer};
use crate::raster::EncodedRaster;
use inkpress_pdf_composer::{
    compressed_stream, isolate_content, overlay_content, register_resource, PageImporter,
};
use inkpress_types::{Color, Margins, PageSize};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, StringFormat};

/// Resource name prefix of placed page rasters.
pub const RASTER_PREFIX: &str = "Ink";

const FOOTER_FONT_SIZE: f32 = 8.0;
const FOOTER_X: f32 = 24.0;
const FOOTER_Y: f32 = 20.0;
const FOOTER_GRAY: f32 = 127.0 / 255.0;

/// Builds a PDF in memory, one page at a time.
///
/// Nothing is written anywhere until [`PdfAssembler::finish`] returns the
/// serialized bytes, so a failed render never leaves a partial file behind.
pub struct PdfAssembler {
    document: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    info: Option<DocumentInfo>,
    footer: Option<Footer>,
}

impl Default for PdfAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfAssembler {
    pub fn new() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            page_ids: Vec::new(),
            info: None,
            footer: None,
        }
    }

    pub fn with_info(mut self, info: DocumentInfo) -> Self {
        self.info = Some(info);
        self
    }

    pub fn with_footer(mut self, footer: Footer) -> Self {
        self.footer = Some(footer);
        self
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Adds a blank page filled with `background` and `raster` placed on it.
    pub fn add_page(
        &mut self,
        size: PageSize,
        margins: Margins,
        background: Color,
        raster: EncodedRaster,
    ) -> Result<ObjectId, AssemblyError> {
        let (width, height) = size.dimensions_pt();
        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(width), Object::Real(height)],
            "Resources" => dictionary! {},
        });

        let dimensions = raster.dimensions();
        let image_id = self.add_image(raster);
        let name = register_resource(
            &mut self.document,
            page_id,
            "XObject",
            RASTER_PREFIX,
            Object::Reference(image_id),
        )?;

        let [r, g, b] = background.to_unit_rgb();
        let mut operations = vec![
            Operation::new("q", vec![]),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new(
                "re",
                vec![0.into(), 0.into(), Object::Real(width), Object::Real(height)],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ];
        operations.extend(place_image(&name, dimensions, [0.0, 0.0, width, height], margins)?);

        let content = Content { operations }.encode()?;
        let content_id = self
            .document
            .add_object(compressed_stream(dictionary! {}, &content)?);
        self.document
            .get_dictionary_mut(page_id)?
            .set("Contents", Object::Reference(content_id));

        self.page_ids.push(page_id);
        Ok(page_id)
    }

    /// Imports `page_number` of the source document and draws `raster` on top,
    /// keeping transparent pixels see-through. The raster must carry alpha.
    pub fn add_overlay_page(
        &mut self,
        importer: &mut PageImporter<'_>,
        page_number: u32,
        margins: Margins,
        raster: EncodedRaster,
    ) -> Result<ObjectId, AssemblyError> {
        if !raster.has_alpha() {
            return Err(AssemblyError::OpaqueOverlay(page_number));
        }
        let page = importer.import_page(&mut self.document, page_number, self.pages_id)?;
        isolate_content(&mut self.document, page.id)?;

        let dimensions = raster.dimensions();
        let image_id = self.add_image(raster);
        let name = register_resource(
            &mut self.document,
            page.id,
            "XObject",
            RASTER_PREFIX,
            Object::Reference(image_id),
        )?;

        let content = Content {
            operations: place_image(&name, dimensions, page.media_box, margins)?,
        }
        .encode()?;
        overlay_content(&mut self.document, page.id, content)?;

        self.page_ids.push(page.id);
        Ok(page.id)
    }

    /// Adds `raster` as an RGB image XObject, with its alpha plane as the
    /// soft mask when present.
    fn add_image(&mut self, raster: EncodedRaster) -> ObjectId {
        let (mut image, smask) = raster.into_streams();
        if let Some(smask) = smask {
            let smask_id = self.document.add_object(smask);
            image.dict.set("SMask", Object::Reference(smask_id));
        }
        self.document.add_object(image)
    }

    fn add_footers(&mut self, footer: &Footer) -> Result<(), AssemblyError> {
        let font_id = self.document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        let total = self.page_ids.len();
        for (index, page_id) in self.page_ids.clone().into_iter().enumerate() {
            let font = register_resource(
                &mut self.document,
                page_id,
                "Font",
                "F",
                Object::Reference(font_id),
            )?;
            let text = footer.text(index + 1, total);
            let (x0, y0) = self.media_origin(page_id);
            let content = Content {
                operations: vec![
                    Operation::new("q", vec![]),
                    Operation::new("g", vec![FOOTER_GRAY.into()]),
                    Operation::new("BT", vec![]),
                    Operation::new(
                        "Tf",
                        vec![Object::Name(font.into_bytes()), FOOTER_FONT_SIZE.into()],
                    ),
                    Operation::new(
                        "Td",
                        vec![(x0 + FOOTER_X).into(), (y0 + FOOTER_Y).into()],
                    ),
                    Operation::new(
                        "Tj",
                        vec![Object::String(win_ansi(&text), StringFormat::Literal)],
                    ),
                    Operation::new("ET", vec![]),
                    Operation::new("Q", vec![]),
                ],
            }
            .encode()?;
            overlay_content(&mut self.document, page_id, content)?;
        }
        Ok(())
    }

    fn media_origin(&self, page_id: ObjectId) -> (f32, f32) {
        let corner = |i: usize| {
            self.document
                .get_dictionary(page_id)
                .and_then(|page| page.get(b"MediaBox"))
                .and_then(Object::as_array)
                .ok()
                .and_then(|arr| arr.get(i))
                .and_then(|obj| match obj {
                    Object::Integer(v) => Some(*v as f32),
                    Object::Real(v) => Some(*v),
                    _ => None,
                })
                .unwrap_or(0.0)
        };
        (corner(0), corner(1))
    }

    /// Completes the page tree, applies footer and metadata, and serializes
    /// the document.
    pub fn finish(mut self) -> Result<Vec<u8>, AssemblyError> {
        if let Some(footer) = self.footer.take() {
            self.add_footers(&footer)?;
        }

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::Reference(*id)).collect();
        self.document.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.page_ids.len() as i64,
            }),
        );

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);

        if let Some(info) = &self.info {
            let info_id = self.document.add_object(info.to_dictionary());
            self.document.trailer.set("Info", info_id);
        }

        let mut out = Vec::new();
        self.document.save_to(&mut out)?;
        log::debug!(
            "Assembled PDF with {} pages, {} bytes",
            self.page_ids.len(),
            out.len()
        );
        Ok(out)
    }
}

/// Draws the raster across the usable width of `media_box`, top-aligned at
/// the top margin, keeping its aspect ratio.
fn place_image(
    name: &str,
    (width, height): (u32, u32),
    media_box: [f32; 4],
    margins: Margins,
) -> Result<Vec<Operation>, AssemblyError> {
    if width == 0 || height == 0 {
        return Err(AssemblyError::EmptyRaster { width, height });
    }
    let [x0, y0, x1, y1] = media_box;
    let (left, top) = (x0.min(x1), y0.max(y1));

    let draw_width = ((x1 - x0).abs() - margins.horizontal()).max(0.0);
    let draw_height = draw_width * height as f32 / width as f32;
    let x = left + margins.left;
    let y = top - margins.top - draw_height;

    Ok(vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                draw_width.into(),
                0.into(),
                0.into(),
                draw_height.into(),
                x.into(),
                y.into(),
            ],
        ),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ])
}
