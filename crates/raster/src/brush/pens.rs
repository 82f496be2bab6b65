use super::{flow, pressure, Brush, Tip};
use crate::atlas::MaskView;
use inkpress_model::Segment;
use inkpress_types::Color;

/// Declares a sprite-tipped pen: a color, a mask and its stamp formulas.
macro_rules! mask_pen {
    (
        $(#[$meta:meta])*
        $pen:ident = $name:literal {
            width($segment:ident, $base:ident) => $width:expr,
            opacity($o_segment:ident) => $opacity:expr,
            max_width($m_base:ident) => $max_width:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $pen {
            color: Color,
            mask: MaskView,
        }

        impl $pen {
            pub fn new(color: Color, mask: MaskView) -> Self {
                Self { color, mask }
            }
        }

        impl Brush for $pen {
            fn name(&self) -> &'static str {
                $name
            }

            fn color(&self) -> Color {
                self.color
            }

            fn tip(&self) -> Tip<'_> {
                Tip::Mask(&self.mask)
            }

            fn width(&self, $segment: &Segment, $base: f32) -> f32 {
                $width
            }

            fn opacity(&self, $o_segment: &Segment) -> f32 {
                $opacity
            }

            fn max_width(&self, $m_base: f32) -> f32 {
                $max_width
            }
        }
    };
}

mask_pen! {
    Ballpoint = "ballpoint" {
        width(segment, base) => pressure(segment) * base,
        opacity(_segment) => 1.0,
        max_width(base) => base.max(1.0),
    }
}

mask_pen! {
    /// Grainy graphite; lighter with less pressure and more speed.
    Pencil = "pencil" {
        width(segment, base) => pressure(segment) * base,
        opacity(segment) => (0.35 + 0.65 * pressure(segment)) * flow(segment.speed),
        max_width(base) => base.max(1.0),
    }
}

mask_pen! {
    MechanicalPencil = "mech-pencil" {
        width(segment, base) => 0.6 * base * (0.75 + 0.25 * pressure(segment)),
        opacity(_segment) => 1.0,
        max_width(base) => (0.6 * base).max(1.0),
    }
}

mask_pen! {
    Marker = "marker" {
        width(segment, base) => 1.6 * pressure(segment) * base,
        opacity(segment) => (0.85 + 0.15 * pressure(segment)) * flow(segment.speed),
        max_width(base) => (1.6 * base).max(1.0),
    }
}

mask_pen! {
    /// Constant width regardless of pressure.
    Fineliner = "fineliner" {
        width(_segment, base) => 0.9 * base,
        opacity(_segment) => 1.0,
        max_width(base) => (0.9 * base).max(1.0),
    }
}

mask_pen! {
    /// Wide translucent strokes; built with the palette's highlighter tint.
    Highlighter = "highlighter" {
        width(_segment, base) => 3.0 * base,
        opacity(segment) => 0.4 * (0.8 + 0.2 * pressure(segment)) * flow(segment.speed),
        max_width(base) => (3.0 * base).max(1.0),
    }
}

mask_pen! {
    /// Stand-in for tools without a dedicated brush.
    BasePen = "base-pen" {
        width(_segment, _base) => BasePen::WIDTH,
        opacity(_segment) => BasePen::OPACITY,
        max_width(_base) => BasePen::WIDTH,
    }
}

impl BasePen {
    pub const WIDTH: f32 = 3.0;
    pub const OPACITY: f32 = 0.9;
}

/// Flat round brush; pressure drives both width and opacity.
#[derive(Debug, Clone)]
pub struct Paintbrush {
    color: Color,
}

impl Paintbrush {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Brush for Paintbrush {
    fn name(&self) -> &'static str {
        "paintbrush"
    }

    fn color(&self) -> Color {
        self.color
    }

    fn tip(&self) -> Tip<'_> {
        Tip::Disc
    }

    fn width(&self, segment: &Segment, base: f32) -> f32 {
        1.5 * pressure(segment) * base
    }

    fn opacity(&self, segment: &Segment) -> f32 {
        pressure(segment)
    }

    fn max_width(&self, base: f32) -> f32 {
        (1.5 * base).max(1.0)
    }
}
