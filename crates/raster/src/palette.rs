//! Ink colors.

use crate::error::RenderError;
use inkpress_model::BrushColor;
use inkpress_types::Color;
use std::collections::HashMap;

/// Fallback for the three colors every tablet firmware supports.
fn builtin_color(id: BrushColor) -> Option<Color> {
    match id {
        BrushColor::Black => Some(Color::BLACK),
        BrushColor::Gray => Some(Color::gray(150)),
        BrushColor::White => Some(Color::WHITE),
        _ => None,
    }
}

/// Maps stroke color identifiers to render colors and supplies the page
/// background and the highlighter tint.
///
/// Colors without an explicit mapping fall back to the built-in
/// black/gray/white; anything else is an error at brush construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    background: Color,
    highlighter: Color,
    colors: HashMap<BrushColor, Color>,
}

impl Palette {
    pub fn new(background: Color, highlighter: Color) -> Self {
        Self {
            background,
            highlighter,
            colors: HashMap::new(),
        }
    }

    pub fn with_color(mut self, id: BrushColor, color: Color) -> Self {
        self.set_color(id, color);
        self
    }

    pub fn set_color(&mut self, id: BrushColor, color: Color) {
        self.colors.insert(id, color);
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn highlighter(&self) -> Color {
        self.highlighter
    }

    /// The render color for `id`.
    pub fn color(&self, id: BrushColor) -> Result<Color, RenderError> {
        self.colors
            .get(&id)
            .copied()
            .or_else(|| builtin_color(id))
            .ok_or(RenderError::UnknownColor(id))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(Color::WHITE, Color::gray(150))
            .with_color(BrushColor::Black, Color::BLACK)
            .with_color(BrushColor::Gray, Color::gray(150))
            .with_color(BrushColor::White, Color::WHITE)
    }
}
