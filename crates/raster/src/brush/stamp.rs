//! Walking a stroke and compositing it.
//!
//! Stamps are accumulated into a coverage layer the size of the stroke's
//! extent, keeping the maximum coverage per pixel, and the layer is then
//! composited onto the canvas in one straight-alpha "over" pass. Overlapping
//! stamps of one stroke therefore never darken each other.

use super::{base_width, Brush, Tip};
use crate::atlas::MaskView;
use image::RgbaImage;
use inkpress_model::Stroke;
use inkpress_types::{Color, Point, Rect};

/// Area `stroke` may touch when painted with `brush`: the sample bounds
/// grown by half the widest stamp plus a pixel of anti-aliasing.
pub fn stroke_extent<B: Brush + ?Sized>(brush: &B, stroke: &Stroke) -> Option<Rect> {
    let bounds = stroke.path_bounds()?;
    let widest = stroke
        .segments
        .iter()
        .map(|s| brush.max_width(base_width(stroke, s)))
        .fold(1.0, f32::max);
    Some(bounds.inflate(widest / 2.0 + 1.0))
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    at: Point,
    width: f32,
    opacity: f32,
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Upper bound on stamps along one segment after clipping.
const MAX_STAMPS_PER_SEGMENT: usize = 1 << 16;

pub(super) fn paint_stroke<B: Brush + ?Sized>(brush: &B, stroke: &Stroke, canvas: &mut RgbaImage) {
    if !stroke.is_visible() {
        return;
    }
    if !stroke.is_finite() {
        log::debug!("Skipping {} stroke with non-finite samples", brush.name());
        return;
    }
    let Some(extent) = stroke_extent(brush, stroke) else {
        return;
    };
    let Some(mut layer) = Coverage::new(extent, canvas.width(), canvas.height()) else {
        return;
    };

    let tip = brush.tip();
    let samples: Vec<Sample> = stroke
        .segments
        .iter()
        .map(|s| Sample {
            at: s.point(),
            width: brush.width(s, base_width(stroke, s)).max(1.0),
            opacity: brush.opacity(s).clamp(0.0, 1.0),
        })
        .collect();

    let bounds = layer.bounds();
    for pair in samples.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let reach = a.width.max(b.width) / 2.0 + 1.0;
        let Some((t0, t1)) = clip_span(a.at, b.at, bounds.inflate(reach)) else {
            continue;
        };
        let (from, to) = (point_at(a.at, b.at, t0), point_at(a.at, b.at, t1));
        let (t0, t1) = (t0 as f32, t1 as f32);
        let spacing = (a.width.min(b.width) / 4.0).max(0.5);
        let steps =
            ((from.distance(to) / spacing).ceil() as usize).clamp(1, MAX_STAMPS_PER_SEGMENT);
        for i in 0..=steps {
            let f = i as f32 / steps as f32;
            let t = lerp(t0, t1, f);
            layer.stamp(
                tip,
                from.lerp(to, f),
                lerp(a.width, b.width, t),
                lerp(a.opacity, b.opacity, t),
            );
        }
    }

    layer.composite(canvas, brush.color());
}

/// Parameter range `[t0, t1]` of the segment `a -> b` inside `bounds`
/// (Liang-Barsky), or `None` when it misses them. Computed in `f64` so
/// that clipping a very long segment keeps sub-pixel precision.
fn clip_span(a: Point, b: Point, bounds: Rect) -> Option<(f64, f64)> {
    let (ax, ay) = (f64::from(a.x), f64::from(a.y));
    let (dx, dy) = (f64::from(b.x) - ax, f64::from(b.y) - ay);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    let edges = [
        (-dx, ax - f64::from(bounds.x)),
        (dx, f64::from(bounds.right()) - ax),
        (-dy, ay - f64::from(bounds.y)),
        (dy, f64::from(bounds.bottom()) - ay),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((t0, t1))
}

fn point_at(a: Point, b: Point, t: f64) -> Point {
    let along = |from: f32, to: f32| {
        let from = f64::from(from);
        (from + (f64::from(to) - from) * t) as f32
    };
    Point::new(along(a.x, b.x), along(a.y, b.y))
}

/// Per-stroke coverage, clipped to the canvas.
struct Coverage {
    x0: i64,
    y0: i64,
    width: i64,
    height: i64,
    values: Vec<f32>,
}

impl Coverage {
    fn new(extent: Rect, canvas_width: u32, canvas_height: u32) -> Option<Self> {
        let x0 = extent.x.floor().max(0.0) as i64;
        let y0 = extent.y.floor().max(0.0) as i64;
        let x1 = (extent.right().ceil() as i64).min(i64::from(canvas_width));
        let y1 = (extent.bottom().ceil() as i64).min(i64::from(canvas_height));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let (width, height) = (x1 - x0, y1 - y0);
        Some(Self {
            x0,
            y0,
            width,
            height,
            values: vec![0.0; (width * height) as usize],
        })
    }

    /// Pixel columns and rows of the layer overlapping `[lo, hi)` in canvas space.
    fn span(&self, lo: f32, hi: f32, origin: i64, len: i64) -> std::ops::Range<i64> {
        let start = (lo.floor() as i64).max(origin);
        let end = (hi.ceil() as i64).min(origin + len);
        start..end.max(start)
    }

    /// The canvas area this layer covers.
    fn bounds(&self) -> Rect {
        Rect::new(self.x0 as f32, self.y0 as f32, self.width as f32, self.height as f32)
    }

    fn put(&mut self, x: i64, y: i64, value: f32) {
        let idx = ((y - self.y0) * self.width + (x - self.x0)) as usize;
        if let Some(v) = self.values.get_mut(idx)
            && value > *v
        {
            *v = value;
        }
    }

    fn stamp(&mut self, tip: Tip<'_>, center: Point, width: f32, opacity: f32) {
        if opacity <= 0.0 {
            return;
        }
        match tip {
            Tip::Disc => self.stamp_disc(center, width, opacity),
            Tip::Mask(mask) => self.stamp_mask(mask, center, width, opacity),
        }
    }

    fn stamp_disc(&mut self, center: Point, width: f32, opacity: f32) {
        let r = width / 2.0;
        let reach = r + 0.5;
        for y in self.span(center.y - reach, center.y + reach, self.y0, self.height) {
            for x in self.span(center.x - reach, center.x + reach, self.x0, self.width) {
                let dist = Point::new(x as f32 + 0.5, y as f32 + 0.5).distance(center);
                let coverage = (r + 0.5 - dist).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.put(x, y, coverage * opacity);
                }
            }
        }
    }

    fn stamp_mask(&mut self, mask: &MaskView, center: Point, width: f32, opacity: f32) {
        let left = center.x - width / 2.0;
        let top = center.y - width / 2.0;
        for y in self.span(top, top + width, self.y0, self.height) {
            let v = (y as f32 + 0.5 - top) / width;
            for x in self.span(left, left + width, self.x0, self.width) {
                let u = (x as f32 + 0.5 - left) / width;
                let coverage = mask.sample(u, v);
                if coverage > 0.0 {
                    self.put(x, y, coverage * opacity);
                }
            }
        }
    }

    fn composite(&self, canvas: &mut RgbaImage, color: Color) {
        let src = [f32::from(color.r), f32::from(color.g), f32::from(color.b)];
        for (i, &coverage) in self.values.iter().enumerate() {
            let a = (coverage * color.a).clamp(0.0, 1.0);
            if a <= 0.0 {
                continue;
            }
            let i = i as i64;
            let x = (self.x0 + i % self.width) as u32;
            let y = (self.y0 + i / self.width) as u32;

            let px = canvas.get_pixel_mut(x, y);
            let dst_a = f32::from(px[3]) / 255.0;
            let out_a = a + dst_a * (1.0 - a);
            if out_a <= 0.0 {
                continue;
            }
            for c in 0..3 {
                let blended = (src[c] * a + f32::from(px[c]) * dst_a * (1.0 - a)) / out_a;
                px[c] = blended.round().clamp(0.0, 255.0) as u8;
            }
            px[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::SpriteAtlas;
    use crate::brush::{Ballpoint, Highlighter, Paintbrush};
    use image::Rgba;
    use inkpress_model::{BrushColor, BrushKind, Segment};
    use std::sync::Arc;

    fn solid_mask() -> MaskView {
        let atlas = SpriteAtlas::from_parts(
            RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255])),
            br#"{"ballpoint": [0, 0, 8, 8]}"#,
        )
        .unwrap();
        Arc::new(atlas).mask("ballpoint").unwrap()
    }

    fn line(kind: BrushKind, pressure: f32) -> Stroke {
        Stroke::new(kind, BrushColor::Black, 3.0).with_segments([
            Segment::new(20.0, 50.0, pressure),
            Segment::new(80.0, 50.0, pressure),
        ])
    }

    #[test]
    fn single_segment_paints_nothing() {
        let mut canvas = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        let stroke = Stroke::new(BrushKind::Ballpoint, BrushColor::Black, 3.0)
            .with_segments([Segment::new(50.0, 50.0, 1.0)]);
        Ballpoint::new(Color::BLACK, solid_mask()).paint(&stroke, &mut canvas);
        assert!(canvas.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn ballpoint_line_is_solid_and_gapless() {
        let mut canvas = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        Ballpoint::new(Color::BLACK, solid_mask())
            .paint(&line(BrushKind::Ballpoint, 1.0), &mut canvas);
        for x in 20..80 {
            assert_eq!(*canvas.get_pixel(x, 50), Rgba([0, 0, 0, 255]), "gap at x={x}");
        }
        assert_eq!(*canvas.get_pixel(50, 10), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn translucent_stroke_does_not_build_up() {
        let mut canvas = RgbaImage::new(100, 100);
        Paintbrush::new(Color::BLACK).paint(&line(BrushKind::PaintBrush, 0.5), &mut canvas);
        let alphas: Vec<u8> = (30..70).map(|x| canvas.get_pixel(x, 50)[3]).collect();
        assert!(alphas.iter().all(|&a| a == alphas[0]), "{alphas:?}");
        assert_eq!(alphas[0], 128);
    }

    #[test]
    fn overlapping_strokes_blend() {
        let mut canvas = RgbaImage::new(100, 100);
        let brush = Paintbrush::new(Color::BLACK);
        brush.paint(&line(BrushKind::PaintBrush, 0.5), &mut canvas);
        let once = canvas.get_pixel(50, 50)[3];
        brush.paint(&line(BrushKind::PaintBrush, 0.5), &mut canvas);
        assert!(canvas.get_pixel(50, 50)[3] > once);
    }

    #[test]
    fn ink_stays_inside_extent() {
        let mut canvas = RgbaImage::new(100, 100);
        let brush = Ballpoint::new(Color::BLACK, solid_mask());
        let stroke = Stroke::new(BrushKind::Ballpoint, BrushColor::Black, 4.0).with_segments([
            Segment::new(30.0, 30.0, 1.0),
            Segment::new(60.0, 45.0, 0.6),
            Segment::new(40.0, 70.0, 0.9),
        ]);
        brush.paint(&stroke, &mut canvas);

        let extent = stroke_extent(&brush, &stroke).unwrap();
        for (x, y, px) in canvas.enumerate_pixels() {
            if px[3] > 0 {
                assert!(extent.contains(Point::new(x as f32, y as f32)), "ink at {x},{y}");
            }
        }
    }

    #[test]
    fn strokes_off_canvas_are_clipped() {
        let mut canvas = RgbaImage::new(10, 10);
        let stroke = Stroke::new(BrushKind::Ballpoint, BrushColor::Black, 2.0)
            .with_segments([Segment::new(-50.0, -50.0, 1.0), Segment::new(-20.0, -20.0, 1.0)]);
        Ballpoint::new(Color::BLACK, solid_mask()).paint(&stroke, &mut canvas);
        assert!(canvas.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn far_segments_are_clipped_to_the_canvas() {
        let mut canvas = RgbaImage::new(100, 100);
        let brush = Ballpoint::new(Color::BLACK, solid_mask());
        let stroke = Stroke::new(BrushKind::Ballpoint, BrushColor::Black, 3.0).with_segments([
            Segment::new(-1.0e8, 50.0, 1.0),
            Segment::new(1.0e8, 50.0, 1.0),
            Segment::new(1.0e8, -1.0e8, 1.0),
        ]);
        brush.paint(&stroke, &mut canvas);
        for x in 0..100 {
            assert_eq!(canvas.get_pixel(x, 50)[3], 255, "gap at x={x}");
        }
        assert_eq!(canvas.get_pixel(50, 10)[3], 0);
    }

    #[test]
    fn non_finite_strokes_paint_nothing() {
        let mut canvas = RgbaImage::new(100, 100);
        let brush = Ballpoint::new(Color::BLACK, solid_mask());
        for bad in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let stroke = Stroke::new(BrushKind::Ballpoint, BrushColor::Black, 2.0)
                .with_segments([Segment::new(10.0, 10.0, 1.0), Segment::new(bad, 50.0, 1.0)]);
            brush.paint(&stroke, &mut canvas);
        }
        assert!(canvas.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn clip_span_trims_to_bounds() {
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        let inside = clip_span(Point::new(1.0, 1.0), Point::new(9.0, 9.0), bounds);
        assert_eq!(inside, Some((0.0, 1.0)));

        let (t0, t1) = clip_span(Point::new(-10.0, 5.0), Point::new(30.0, 5.0), bounds).unwrap();
        assert!((t0 - 0.25).abs() < 1e-9 && (t1 - 0.5).abs() < 1e-9, "{t0} {t1}");

        assert_eq!(clip_span(Point::new(-5.0, 20.0), Point::new(15.0, 20.0), bounds), None);
    }

    #[test]
    fn overlapping_highlighters_blend_semi_transparently() {
        let mut canvas = RgbaImage::new(100, 100);
        let brush = Highlighter::new(Color::gray(150), solid_mask());
        brush.paint(&line(BrushKind::Highlighter, 1.0), &mut canvas);
        let once: Vec<u8> = (30..70).map(|x| canvas.get_pixel(x, 50)[3]).collect();
        assert!(once.iter().all(|&a| a == once[0]), "{once:?}");
        assert!(once[0] > 0 && once[0] < 255);

        brush.paint(&line(BrushKind::Highlighter, 1.0), &mut canvas);
        let twice = canvas.get_pixel(50, 50);
        assert!(twice[3] > once[0] && twice[3] < 255, "{twice:?}");
        assert_eq!([twice[0], twice[1], twice[2]], [150, 150, 150]);
    }
}
