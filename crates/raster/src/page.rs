//! Rasterizing one page.

use crate::brush::Brush;
use crate::context::RenderContext;
use crate::error::RenderError;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use inkpress_model::{BrushColor, BrushKind, Drawing};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

/// Working resolution of the tablet screen, portrait.
pub const PAGE_WIDTH: u32 = 1404;
pub const PAGE_HEIGHT: u32 = 1872;

/// What the canvas is filled with before ink is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Background {
    /// The palette's background color.
    #[default]
    Palette,
    /// Fully transparent, for ink drawn over another page.
    Transparent,
}

/// Renders drawings against a shared [`RenderContext`].
///
/// Rendering is deterministic: the same drawing, template and context always
/// give the same pixels.
#[derive(Debug, Clone, Copy)]
pub struct PageRenderer<'a> {
    context: &'a RenderContext,
    background: Background,
}

impl<'a> PageRenderer<'a> {
    pub fn new(context: &'a RenderContext) -> Self {
        Self {
            context,
            background: Background::Palette,
        }
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    /// Rasterizes `drawing` over an optional background template.
    ///
    /// Every brush is resolved before the canvas is allocated, so a page either
    /// renders completely or fails without producing pixels.
    pub fn render(
        &self,
        drawing: &Drawing,
        template: Option<&RgbaImage>,
    ) -> Result<RgbaImage, RenderError> {
        drawing.validate()?;

        let mut brushes: HashMap<(BrushKind, BrushColor), Arc<dyn Brush>> = HashMap::new();
        for stroke in drawing.strokes() {
            let key = (stroke.brush, stroke.color);
            if !brushes.contains_key(&key) {
                brushes.insert(key, self.context.brush(stroke.brush, stroke.color)?);
            }
        }

        let fill = match self.background {
            Background::Palette => Rgba(self.context.palette().background().to_rgba8()),
            Background::Transparent => Rgba([0, 0, 0, 0]),
        };
        let mut canvas = RgbaImage::from_pixel(PAGE_WIDTH, PAGE_HEIGHT, fill);

        if let Some(template) = template {
            if template.dimensions() == canvas.dimensions() {
                imageops::overlay(&mut canvas, template, 0, 0);
            } else {
                let scaled =
                    imageops::resize(template, PAGE_WIDTH, PAGE_HEIGHT, FilterType::Nearest);
                imageops::overlay(&mut canvas, &scaled, 0, 0);
            }
        }

        for stroke in drawing.strokes() {
            if let Some(brush) = brushes.get(&(stroke.brush, stroke.color)) {
                brush.paint(stroke, &mut canvas);
            }
        }

        log::debug!(
            "Rendered page with {} layers, {} strokes, {} brushes",
            drawing.layers.len(),
            drawing.stroke_count(),
            brushes.len()
        );
        Ok(canvas)
    }

    /// Renders `drawing` and writes it as PNG to `sink`.
    pub fn render_png<W: Write>(
        &self,
        drawing: &Drawing,
        template: Option<&RgbaImage>,
        sink: W,
    ) -> Result<(), RenderError> {
        let canvas = self.render(drawing, template)?;
        encode_png(&canvas, sink)
    }
}

pub fn encode_png<W: Write>(image: &RgbaImage, sink: W) -> Result<(), RenderError> {
    PngEncoder::new(sink)
        .write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgba8)
        .map_err(RenderError::Encode)
}
