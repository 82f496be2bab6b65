//! Pixel synthesis for digital ink.
//!
//! [`RenderContext`] holds the palette and the lazily loaded brush sprites
//! and templates; [`PageRenderer`] turns one decoded [`inkpress_model::Drawing`]
//! into a canvas using the [`Brush`] matching each stroke's tool.

pub mod atlas;
pub mod brush;
mod context;
mod error;
pub mod page;
mod palette;

pub use atlas::{MaskView, SpriteAtlas, SpriteRect};
pub use brush::{Brush, Tip};
pub use context::{RenderContext, DEFAULT_RESOURCE_ROOT, SPRITES_IMAGE, SPRITES_INDEX};
pub use error::RenderError;
pub use page::{encode_png, Background, PageRenderer, PAGE_HEIGHT, PAGE_WIDTH};
pub use palette::Palette;
