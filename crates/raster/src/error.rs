use inkpress_model::{BrushColor, ValidationError};
use inkpress_traits::ResourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("failed to decode image {name:?}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("malformed sprite index: {0}")]
    SpriteIndex(String),

    #[error("sprite {name:?} at {rect:?} is not within the {width}x{height} spritesheet")]
    SpriteOutOfBounds {
        name: String,
        rect: Vec<i64>,
        width: u32,
        height: u32,
    },

    #[error("no sprite image for brush {0:?}")]
    MissingSprite(String),

    #[error("invalid color {0}")]
    UnknownColor(BrushColor),

    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),
}
