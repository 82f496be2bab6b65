//! Decoded ink: drawings, layers, strokes and their sample points.

use crate::content::validate_layer_names;
use crate::error::ValidationError;
use inkpress_types::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The pen tool a stroke was drawn with, identified by its file-format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum BrushKind {
    PaintBrush,
    Pencil,
    Ballpoint,
    Marker,
    Fineliner,
    Highlighter,
    Eraser,
    MechanicalPencil,
    EraseArea,
    PaintBrushV5,
    MechanicalPencilV5,
    PencilV5,
    BallpointV5,
    MarkerV5,
    FinelinerV5,
    HighlighterV5,
    CalligraphyV5,
    /// A tool code this model does not know about.
    Unknown(u32),
}

impl BrushKind {
    pub fn code(&self) -> u32 {
        match self {
            BrushKind::PaintBrush => 0,
            BrushKind::Pencil => 1,
            BrushKind::Ballpoint => 2,
            BrushKind::Marker => 3,
            BrushKind::Fineliner => 4,
            BrushKind::Highlighter => 5,
            BrushKind::Eraser => 6,
            BrushKind::MechanicalPencil => 7,
            BrushKind::EraseArea => 8,
            BrushKind::PaintBrushV5 => 12,
            BrushKind::MechanicalPencilV5 => 13,
            BrushKind::PencilV5 => 14,
            BrushKind::BallpointV5 => 15,
            BrushKind::MarkerV5 => 16,
            BrushKind::FinelinerV5 => 17,
            BrushKind::HighlighterV5 => 18,
            BrushKind::CalligraphyV5 => 21,
            BrushKind::Unknown(code) => *code,
        }
    }

    /// Folds the newer tool revisions onto the tool they render like.
    pub fn canonical(self) -> BrushKind {
        match self {
            BrushKind::PaintBrushV5 => BrushKind::PaintBrush,
            BrushKind::MechanicalPencilV5 => BrushKind::MechanicalPencil,
            BrushKind::PencilV5 => BrushKind::Pencil,
            BrushKind::BallpointV5 => BrushKind::Ballpoint,
            BrushKind::MarkerV5 => BrushKind::Marker,
            BrushKind::FinelinerV5 => BrushKind::Fineliner,
            BrushKind::HighlighterV5 => BrushKind::Highlighter,
            other => other,
        }
    }
}

impl From<u32> for BrushKind {
    fn from(code: u32) -> Self {
        match code {
            0 => BrushKind::PaintBrush,
            1 => BrushKind::Pencil,
            2 => BrushKind::Ballpoint,
            3 => BrushKind::Marker,
            4 => BrushKind::Fineliner,
            5 => BrushKind::Highlighter,
            6 => BrushKind::Eraser,
            7 => BrushKind::MechanicalPencil,
            8 => BrushKind::EraseArea,
            12 => BrushKind::PaintBrushV5,
            13 => BrushKind::MechanicalPencilV5,
            14 => BrushKind::PencilV5,
            15 => BrushKind::BallpointV5,
            16 => BrushKind::MarkerV5,
            17 => BrushKind::FinelinerV5,
            18 => BrushKind::HighlighterV5,
            21 => BrushKind::CalligraphyV5,
            other => BrushKind::Unknown(other),
        }
    }
}

impl From<BrushKind> for u32 {
    fn from(kind: BrushKind) -> Self {
        kind.code()
    }
}

/// The ink color recorded with a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BrushColor {
    Black,
    Gray,
    White,
    Yellow,
    Green,
    Pink,
    Blue,
    Red,
    GrayOverlap,
}

impl BrushColor {
    pub const ALL: [BrushColor; 9] = [
        BrushColor::Black,
        BrushColor::Gray,
        BrushColor::White,
        BrushColor::Yellow,
        BrushColor::Green,
        BrushColor::Pink,
        BrushColor::Blue,
        BrushColor::Red,
        BrushColor::GrayOverlap,
    ];

    pub fn code(&self) -> u32 {
        match self {
            BrushColor::Black => 0,
            BrushColor::Gray => 1,
            BrushColor::White => 2,
            BrushColor::Yellow => 3,
            BrushColor::Green => 4,
            BrushColor::Pink => 5,
            BrushColor::Blue => 6,
            BrushColor::Red => 7,
            BrushColor::GrayOverlap => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BrushColor::Black => "Black",
            BrushColor::Gray => "Gray",
            BrushColor::White => "White",
            BrushColor::Yellow => "Yellow",
            BrushColor::Green => "Green",
            BrushColor::Pink => "Pink",
            BrushColor::Blue => "Blue",
            BrushColor::Red => "Red",
            BrushColor::GrayOverlap => "GrayOverlap",
        }
    }

    /// Case-insensitive lookup by name, as used in palette configuration.
    pub fn from_name(name: &str) -> Option<BrushColor> {
        BrushColor::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl TryFrom<u32> for BrushColor {
    type Error = String;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        BrushColor::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| format!("unknown brush color code {code}"))
    }
}

impl From<BrushColor> for u32 {
    fn from(color: BrushColor) -> Self {
        color.code()
    }
}

impl fmt::Display for BrushColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single sample along a stroke, in page pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x: f32,
    pub y: f32,
    /// Normalized pen pressure in `[0, 1]`.
    pub pressure: f32,
    pub tilt: f32,
    pub speed: f32,
    /// Per-point width recorded by newer firmware; overrides the stroke thickness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
}

impl Segment {
    pub fn new(x: f32, y: f32, pressure: f32) -> Self {
        Self {
            x,
            y,
            pressure,
            tilt: 0.0,
            speed: 0.0,
            width: None,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Position, pressure and width override are all finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.pressure.is_finite()
            && self.speed.is_finite()
            && self.width.is_none_or(f32::is_finite)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub brush: BrushKind,
    pub color: BrushColor,
    /// Base thickness as recorded by the tablet (brush size setting).
    pub thickness: f32,
    pub segments: Vec<Segment>,
}

impl Stroke {
    pub fn new(brush: BrushKind, color: BrushColor, thickness: f32) -> Self {
        Self {
            brush,
            color,
            thickness,
            segments: Vec::new(),
        }
    }

    pub fn with_segments(mut self, segments: impl IntoIterator<Item = Segment>) -> Self {
        self.segments.extend(segments);
        self
    }

    /// A stroke needs at least two samples to leave a mark.
    pub fn is_visible(&self) -> bool {
        self.segments.len() >= 2
    }

    pub fn is_finite(&self) -> bool {
        self.thickness.is_finite() && self.segments.iter().all(Segment::is_finite)
    }

    /// Bounding box of the stroke's sample positions.
    pub fn path_bounds(&self) -> Option<Rect> {
        Rect::bounding(self.segments.iter().map(Segment::point))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    #[serde(default)]
    pub strokes: Vec<Stroke>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strokes: Vec::new(),
        }
    }

    pub fn with_stroke(mut self, stroke: Stroke) -> Self {
        self.strokes.push(stroke);
        self
    }
}

/// The decoded ink of one page. Layers paint in stored order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub layers: Vec<Layer>,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    /// All strokes in paint order.
    pub fn strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.layers.iter().flat_map(|l| l.strokes.iter())
    }

    pub fn stroke_count(&self) -> usize {
        self.layers.iter().map(|l| l.strokes.len()).sum()
    }

    /// Checks the layer rules and that every sample is a finite number.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_layer_names(self.layers.iter().map(|l| l.name.as_str()))?;
        for (layer, l) in self.layers.iter().enumerate() {
            for (stroke, s) in l.strokes.iter().enumerate() {
                if !s.thickness.is_finite() {
                    return Err(ValidationError::NonFiniteSample {
                        layer,
                        stroke,
                        segment: None,
                    });
                }
                if let Some(segment) = s.segments.iter().position(|p| !p.is_finite()) {
                    return Err(ValidationError::NonFiniteSample {
                        layer,
                        stroke,
                        segment: Some(segment),
                    });
                }
            }
        }
        Ok(())
    }
}
