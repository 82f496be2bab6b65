//! The brush spritesheet and read-only views into it.

use crate::error::RenderError;
use image::{ImageFormat, RgbaImage};
use std::collections::HashMap;
use std::sync::Arc;

/// Pixel rectangle of one sprite, half-open on the right and bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl SpriteRect {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

/// Spritesheet bitmap plus its name→rectangle index.
///
/// Every index entry is checked against the bitmap when the atlas is built,
/// so lookups afterwards cannot go out of bounds.
#[derive(Debug)]
pub struct SpriteAtlas {
    image: RgbaImage,
    index: HashMap<String, SpriteRect>,
}

impl SpriteAtlas {
    /// Decodes `sprites.png` and `sprites.json` contents.
    pub fn decode(png: &[u8], index_json: &[u8]) -> Result<Self, RenderError> {
        let image = image::load_from_memory_with_format(png, ImageFormat::Png)
            .map_err(|source| RenderError::Decode {
                name: "sprites.png".to_string(),
                source,
            })?
            .to_rgba8();
        Self::from_parts(image, index_json)
    }

    pub fn from_parts(image: RgbaImage, index_json: &[u8]) -> Result<Self, RenderError> {
        let raw: HashMap<String, Vec<i64>> = serde_json::from_slice(index_json)
            .map_err(|e| RenderError::SpriteIndex(e.to_string()))?;

        let (width, height) = image.dimensions();
        let mut index = HashMap::with_capacity(raw.len());
        for (name, coords) in raw {
            let rect = checked_rect(&coords, width, height).ok_or_else(|| {
                RenderError::SpriteOutOfBounds {
                    name: name.clone(),
                    rect: coords.clone(),
                    width,
                    height,
                }
            })?;
            index.insert(name, rect);
        }

        Ok(Self { image, index })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn rect(&self, name: &str) -> Option<SpriteRect> {
        self.index.get(name).copied()
    }

    /// A view of the named sprite sharing this atlas' pixels.
    pub fn mask(self: &Arc<Self>, name: &str) -> Result<MaskView, RenderError> {
        let rect = self
            .rect(name)
            .ok_or_else(|| RenderError::MissingSprite(name.to_string()))?;
        Ok(MaskView {
            atlas: Arc::clone(self),
            rect,
        })
    }
}

fn checked_rect(coords: &[i64], width: u32, height: u32) -> Option<SpriteRect> {
    let &[x0, y0, x1, y1] = coords else {
        return None;
    };
    let (w, h) = (i64::from(width), i64::from(height));
    if !(0 <= x0 && x0 < x1 && x1 <= w && 0 <= y0 && y0 < y1 && y1 <= h) {
        return None;
    }
    Some(SpriteRect {
        x0: u32::try_from(x0).ok()?,
        y0: u32::try_from(y0).ok()?,
        x1: u32::try_from(x1).ok()?,
        y1: u32::try_from(y1).ok()?,
    })
}

/// Read-only alpha mask aliasing a rectangle of a [`SpriteAtlas`].
#[derive(Debug, Clone)]
pub struct MaskView {
    atlas: Arc<SpriteAtlas>,
    rect: SpriteRect,
}

impl MaskView {
    pub fn rect(&self) -> SpriteRect {
        self.rect
    }

    pub fn width(&self) -> u32 {
        self.rect.width()
    }

    pub fn height(&self) -> u32 {
        self.rect.height()
    }

    /// Alpha at `(x, y)` relative to the sprite's top-left corner.
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        if x >= self.width() || y >= self.height() {
            return 0;
        }
        self.atlas.image.get_pixel(self.rect.x0 + x, self.rect.y0 + y)[3]
    }

    /// Nearest-neighbour coverage in `[0, 1]` at normalized coordinates.
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            return 0.0;
        }
        let x = (u * self.width() as f32) as u32;
        let y = (v * self.height() as f32) as u32;
        f32::from(self.alpha(x, y)) / 255.0
    }

    /// Whether `other` views the same atlas storage.
    pub fn shares_storage_with(&self, other: &MaskView) -> bool {
        Arc::ptr_eq(&self.atlas, &other.atlas)
    }
}
