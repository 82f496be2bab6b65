//! Page rasterization benchmarks
//!
//! Measures stroke synthesis per brush and whole-document PDF assembly.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use image::{ImageFormat, Rgba, RgbaImage};
use inkpress::{
    BrushColor, BrushKind, DocumentRenderer, Drawing, ExecutorImpl, FileType, InMemoryDocument,
    InMemoryResourceProvider, Layer, PageRenderer, Palette, RenderContext, Segment, Stroke,
};
use std::hint::black_box;
use std::io::Cursor;
use std::sync::Arc;

const SPRITE_INDEX: &str = r#"{
    "ballpoint": [0, 0, 16, 16], "pencil": [16, 0, 32, 16], "mech-pencil": [32, 0, 48, 16],
    "marker": [48, 0, 64, 16], "fineliner": [64, 0, 80, 16], "highlighter": [80, 0, 96, 16]
}"#;

fn context() -> Arc<RenderContext> {
    let sheet = RgbaImage::from_fn(96, 16, |x, y| {
        let (cx, cy) = ((x % 16) as f32 - 7.5, y as f32 - 7.5);
        let alpha = if cx * cx + cy * cy <= 64.0 { 255 } else { 0 };
        Rgba([0, 0, 0, alpha])
    });
    let mut png = Vec::new();
    sheet
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .expect("encode sprite sheet");

    let provider = InMemoryResourceProvider::new();
    provider.add("sprites.png", png).expect("add sprites");
    provider
        .add("sprites.json", SPRITE_INDEX.as_bytes().to_vec())
        .expect("add index");
    Arc::new(RenderContext::with_provider(Arc::new(provider), Palette::default()))
}

/// Handwriting-like zigzag lines filling the page.
fn page(kind: BrushKind, lines: usize) -> Drawing {
    let mut layer = Layer::new("Layer 1");
    for line in 0..lines {
        let y = 100.0 + line as f32 * 40.0;
        let segments = (0..240).map(|i| {
            let x = 100.0 + i as f32 * 5.0;
            let wobble = if i % 2 == 0 { -6.0 } else { 6.0 };
            Segment::new(x, y + wobble, 0.5 + (i % 5) as f32 * 0.1).with_speed((i % 7) as f32)
        });
        layer
            .strokes
            .push(Stroke::new(kind, BrushColor::Black, 2.0).with_segments(segments));
    }
    Drawing::new().with_layer(layer)
}

fn benchmark_brushes(c: &mut Criterion) {
    let context = context();
    let mut group = c.benchmark_group("page_rasterize");

    for kind in [
        BrushKind::Ballpoint,
        BrushKind::Pencil,
        BrushKind::Marker,
        BrushKind::Highlighter,
        BrushKind::PaintBrush,
    ] {
        let drawing = page(kind, 40);
        group.throughput(Throughput::Elements(drawing.stroke_count() as u64));
        let id = BenchmarkId::from_parameter(format!("{:?}", kind));
        group.bench_with_input(id, &drawing, |b, drawing| {
            let renderer = PageRenderer::new(&context);
            b.iter(|| black_box(renderer.render(drawing, None).expect("render page")));
        });
    }

    group.finish();
}

fn benchmark_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_pdf");
    group.sample_size(10);

    let mut doc = InMemoryDocument::new("bench", "Bench", FileType::Notebook);
    for i in 0..8 {
        doc = doc.with_page(format!("p{}", i), page(BrushKind::Fineliner, 30));
    }

    for (name, executor) in [
        ("sequential", ExecutorImpl::sequential()),
        ("parallel", ExecutorImpl::parallel()),
    ] {
        let renderer = DocumentRenderer::new(context()).with_executor(executor);
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut out = Vec::new();
                renderer.render_pdf(&doc, &mut out).expect("render document");
                black_box(out.len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_brushes, benchmark_document);
criterion_main!(benches);
