#![allow(dead_code)]

use image::{ImageFormat, Rgba, RgbaImage};
use inkpress::{
    BrushColor, BrushKind, Drawing, InMemoryResourceProvider, Layer, Palette, RenderContext,
    Segment, Stroke,
};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document as LopdfDocument, Object, Stream};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Every brush mask the renderer asks for, each an opaque 8x8 square.
pub const SPRITE_INDEX: &str = r#"{
    "ballpoint":   [0, 0, 8, 8],
    "pencil":      [8, 0, 16, 8],
    "mech-pencil": [16, 0, 24, 8],
    "marker":      [24, 0, 32, 8],
    "fineliner":   [32, 0, 40, 8],
    "highlighter": [40, 0, 48, 8]
}"#;

pub const TEMPLATE_NAME: &str = "P Grid small";

pub fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .expect("encode fixture png");
    out
}

pub fn sprite_sheet() -> RgbaImage {
    RgbaImage::from_pixel(48, 8, Rgba([0, 0, 0, 255]))
}

/// A quarter-resolution template: light gray with one dark grid line.
pub fn template_image() -> RgbaImage {
    RgbaImage::from_fn(351, 468, |_, y| {
        if y == 100 {
            Rgba([120, 120, 120, 255])
        } else {
            Rgba([235, 235, 235, 255])
        }
    })
}

/// Writes a complete resource directory (sprites and one template).
pub fn write_data_dir(root: &Path) -> std::io::Result<()> {
    std::fs::write(root.join("sprites.png"), png_bytes(&sprite_sheet()))?;
    std::fs::write(root.join("sprites.json"), SPRITE_INDEX)?;
    std::fs::create_dir_all(root.join("templates"))?;
    std::fs::write(
        root.join("templates").join(format!("{}.png", TEMPLATE_NAME)),
        png_bytes(&template_image()),
    )
}

pub fn data_dir() -> std::io::Result<TempDir> {
    let dir = tempfile::tempdir()?;
    write_data_dir(dir.path())?;
    Ok(dir)
}

pub fn provider_with_index(index: &str) -> InMemoryResourceProvider {
    let provider = InMemoryResourceProvider::new();
    provider
        .add("sprites.png", png_bytes(&sprite_sheet()))
        .expect("add sprites");
    provider
        .add("sprites.json", index.as_bytes().to_vec())
        .expect("add index");
    provider
        .add(format!("templates/{}.png", TEMPLATE_NAME), png_bytes(&template_image()))
        .expect("add template");
    provider
}

pub fn context(palette: Palette) -> Arc<RenderContext> {
    Arc::new(RenderContext::with_provider(
        Arc::new(provider_with_index(SPRITE_INDEX)),
        palette,
    ))
}

pub fn stroke(kind: BrushKind, color: BrushColor, points: &[(f32, f32)]) -> Stroke {
    Stroke::new(kind, color, 2.0).with_segments(
        points
            .iter()
            .map(|&(x, y)| Segment::new(x, y, 0.8).with_speed(1.0)),
    )
}

/// A 300px horizontal line at y = 100.
pub fn horizontal_line(kind: BrushKind, color: BrushColor) -> Stroke {
    stroke(kind, color, &[(100.0, 100.0), (400.0, 100.0)])
}

pub fn drawing(strokes: impl IntoIterator<Item = Stroke>) -> Drawing {
    let mut layer = Layer::new("Layer 1");
    layer.strokes.extend(strokes);
    Drawing::new().with_layer(layer)
}

/// A page with a horizontal and a diagonal ballpoint line.
pub fn sample_drawing() -> Drawing {
    drawing([
        stroke(BrushKind::Ballpoint, BrushColor::Black, &[(200.0, 300.0), (900.0, 300.0)]),
        stroke(
            BrushKind::FinelinerV5,
            BrushColor::Gray,
            &[(200.0, 400.0), (500.0, 700.0), (800.0, 900.0)],
        ),
    ])
}

/// A source PDF with one page per entry of `sizes`.
///
/// `Resources` live on the page tree node so imported pages have to resolve
/// them by inheritance. Each page draws a filled rectangle and the text
/// `Source page <n>`.
pub fn source_pdf(sizes: &[(i64, i64)]) -> Vec<u8> {
    let mut doc = LopdfDocument::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids = Vec::new();
    for (index, &(width, height)) in sizes.iter().enumerate() {
        let content = Content {
            operations: vec![
                Operation::new("re", vec![10.into(), 10.into(), 100.into(), 50.into()]),
                Operation::new("f", vec![]),
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 72.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("Source page {}", index + 1))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode fixture content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("save fixture pdf");
    out
}
