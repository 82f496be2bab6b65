//! The brush family.
//!
//! Each tablet tool renders through its own [`Brush`] implementation. A brush
//! only decides the width, opacity, color and tip of every stamp; walking the
//! stroke and compositing the result is shared in [`stamp`].

mod pens;
mod stamp;

pub use pens::{
    Ballpoint, BasePen, Fineliner, Highlighter, Marker, MechanicalPencil, Paintbrush, Pencil,
};
pub use stamp::stroke_extent;

use crate::atlas::MaskView;
use image::RgbaImage;
use inkpress_model::{BrushKind, Segment, Stroke};
use inkpress_types::Color;
use std::fmt::Debug;

/// Base width in pixels of a thickness unit.
pub const THICKNESS_SCALE: f32 = 2.0;

/// Sprite used by the fallback pen and by tools without a sprite of their own.
pub const FALLBACK_MASK: &str = "ballpoint";

/// Spritesheet entry backing a tool.
pub fn mask_name(kind: BrushKind) -> &'static str {
    match kind.canonical() {
        BrushKind::Ballpoint => "ballpoint",
        BrushKind::Pencil => "pencil",
        BrushKind::MechanicalPencil => "mech-pencil",
        BrushKind::Marker => "marker",
        BrushKind::Fineliner => "fineliner",
        BrushKind::Highlighter => "highlighter",
        _ => FALLBACK_MASK,
    }
}

/// What a single stamp looks like.
#[derive(Debug, Clone, Copy)]
pub enum Tip<'a> {
    /// A square sprite scaled to the stamp width.
    Mask(&'a MaskView),
    /// An anti-aliased disc with the stamp width as diameter.
    Disc,
}

pub trait Brush: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    /// Ink color, alpha included.
    fn color(&self) -> Color;

    fn tip(&self) -> Tip<'_>;

    /// Unclamped stamp width at `segment` for a base width of `base` pixels.
    fn width(&self, segment: &Segment, base: f32) -> f32;

    /// Unclamped stamp opacity at `segment`.
    fn opacity(&self, segment: &Segment) -> f32;

    /// Largest stamp width this brush produces for a base width of `base` pixels.
    fn max_width(&self, base: f32) -> f32;

    /// Paints `stroke` onto `canvas`.
    fn paint(&self, stroke: &Stroke, canvas: &mut RgbaImage) {
        stamp::paint_stroke(self, stroke, canvas);
    }
}

/// The width a segment's stamp is scaled from.
pub fn base_width(stroke: &Stroke, segment: &Segment) -> f32 {
    segment.width.unwrap_or(stroke.thickness * THICKNESS_SCALE)
}

/// Faster strokes deposit less ink.
pub fn flow(speed: f32) -> f32 {
    1.0 / (1.0 + 0.02 * speed.max(0.0))
}

fn pressure(segment: &Segment) -> f32 {
    segment.pressure.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpress_model::BrushColor;

    #[test]
    fn tools_map_to_their_sprites() {
        assert_eq!(mask_name(BrushKind::BallpointV5), "ballpoint");
        assert_eq!(mask_name(BrushKind::MechanicalPencilV5), "mech-pencil");
        assert_eq!(mask_name(BrushKind::HighlighterV5), "highlighter");
        assert_eq!(mask_name(BrushKind::PaintBrush), "ballpoint");
        assert_eq!(mask_name(BrushKind::CalligraphyV5), "ballpoint");
        assert_eq!(mask_name(BrushKind::Eraser), "ballpoint");
        assert_eq!(mask_name(BrushKind::Unknown(42)), "ballpoint");
    }

    #[test]
    fn segment_width_overrides_thickness() {
        let stroke = Stroke::new(BrushKind::Ballpoint, BrushColor::Black, 3.0);
        assert_eq!(base_width(&stroke, &Segment::new(0.0, 0.0, 1.0)), 6.0);
        assert_eq!(base_width(&stroke, &Segment::new(0.0, 0.0, 1.0).with_width(2.5)), 2.5);
    }

    #[test]
    fn flow_decreases_with_speed() {
        assert_eq!(flow(0.0), 1.0);
        assert!((flow(50.0) - 0.5).abs() < 1e-6);
        assert!(flow(100.0) < flow(10.0));
    }
}
