use crate::atlas::{MaskView, SpriteAtlas};
use crate::brush::{
    mask_name, Ballpoint, BasePen, Brush, Fineliner, Highlighter, Marker, MechanicalPencil,
    Paintbrush, Pencil,
};
use crate::error::RenderError;
use crate::palette::Palette;
use image::{ImageFormat, RgbaImage};
use inkpress_model::{BrushColor, BrushKind, BLANK_TEMPLATE};
use inkpress_resource::FilesystemResourceProvider;
use inkpress_traits::ResourceProvider;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const DEFAULT_RESOURCE_ROOT: &str = "./data";
pub const SPRITES_IMAGE: &str = "sprites.png";
pub const SPRITES_INDEX: &str = "sprites.json";

/// Shared rendering resources.
///
/// The spritesheet, the background templates and the resolved brushes are
/// built on first use and cached for the lifetime of the context. Each cache
/// has its own lock, held across the whole check-and-populate step so
/// concurrent renders load a resource at most once. Share one context between
/// threads behind an `Arc`.
#[derive(Debug)]
pub struct RenderContext {
    provider: Arc<dyn ResourceProvider>,
    palette: Palette,
    sprites: Mutex<Option<Arc<SpriteAtlas>>>,
    templates: Mutex<HashMap<String, Arc<RgbaImage>>>,
    brushes: Mutex<HashMap<(BrushKind, BrushColor), Arc<dyn Brush>>>,
}

impl RenderContext {
    /// A context reading resources below `resource_root`. Nothing is loaded yet.
    pub fn new(resource_root: impl AsRef<Path>, palette: Palette) -> Self {
        Self::with_provider(
            Arc::new(FilesystemResourceProvider::new(resource_root)),
            palette,
        )
    }

    pub fn with_provider(provider: Arc<dyn ResourceProvider>, palette: Palette) -> Self {
        Self {
            provider,
            palette,
            sprites: Mutex::new(None),
            templates: Mutex::new(HashMap::new()),
            brushes: Mutex::new(HashMap::new()),
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn provider(&self) -> &Arc<dyn ResourceProvider> {
        &self.provider
    }

    /// The spritesheet, loading it on first call.
    pub fn sprite_atlas(&self) -> Result<Arc<SpriteAtlas>, RenderError> {
        let mut sprites = self
            .sprites
            .lock()
            .map_err(|_| RenderError::LockPoisoned("sprite cache"))?;
        if let Some(atlas) = sprites.as_ref() {
            return Ok(Arc::clone(atlas));
        }

        log::debug!("Loading sprite index {:?} via {}", SPRITES_INDEX, self.provider.name());
        let index = self.provider.load(SPRITES_INDEX)?;
        let png = self.provider.load(SPRITES_IMAGE)?;
        let atlas = Arc::new(SpriteAtlas::decode(&png, &index)?);
        log::debug!(
            "Loaded {}x{} spritesheet with {} entries",
            atlas.width(),
            atlas.height(),
            atlas.len()
        );

        *sprites = Some(Arc::clone(&atlas));
        Ok(atlas)
    }

    pub fn is_atlas_loaded(&self) -> bool {
        self.sprites.lock().map(|s| s.is_some()).unwrap_or(false)
    }

    /// A view of the named brush sprite.
    pub fn load_mask(&self, name: &str) -> Result<MaskView, RenderError> {
        self.sprite_atlas()?.mask(name)
    }

    /// The background template `templates/<name>.png`, cached by name.
    pub fn load_template(&self, name: &str) -> Result<Arc<RgbaImage>, RenderError> {
        let mut templates = self
            .templates
            .lock()
            .map_err(|_| RenderError::LockPoisoned("template cache"))?;
        if let Some(template) = templates.get(name) {
            return Ok(Arc::clone(template));
        }

        let path = format!("templates/{}.png", name);
        log::debug!("Loading template {:?}", path);
        let bytes = self.provider.load(&path)?;
        let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .map_err(|source| RenderError::Decode { name: path, source })?
            .to_rgba8();

        let template = Arc::new(image);
        templates.insert(name.to_string(), Arc::clone(&template));
        Ok(template)
    }

    /// The template selected for a page, skipping the blank and unset ones.
    pub fn page_template(
        &self,
        name: Option<&str>,
    ) -> Result<Option<Arc<RgbaImage>>, RenderError> {
        match name.map(str::trim) {
            None | Some("") | Some(BLANK_TEMPLATE) => Ok(None),
            Some(name) => self.load_template(name).map(Some),
        }
    }

    pub fn cached_template_count(&self) -> usize {
        self.templates.lock().map(|t| t.len()).unwrap_or(0)
    }

    /// The brush for a tool and ink color, resolved once per context.
    ///
    /// Failed resolutions are not cached.
    pub fn brush(
        &self,
        kind: BrushKind,
        color: BrushColor,
    ) -> Result<Arc<dyn Brush>, RenderError> {
        let mut brushes = self
            .brushes
            .lock()
            .map_err(|_| RenderError::LockPoisoned("brush cache"))?;
        if let Some(brush) = brushes.get(&(kind, color)) {
            return Ok(Arc::clone(brush));
        }
        let brush: Arc<dyn Brush> = Arc::from(self.resolve_brush(kind, color)?);
        brushes.insert((kind, color), Arc::clone(&brush));
        Ok(brush)
    }

    pub fn cached_brush_count(&self) -> usize {
        self.brushes.lock().map(|b| b.len()).unwrap_or(0)
    }

    /// Builds the brush for a tool and ink color.
    ///
    /// The color must resolve even for highlighters, which then paint in the
    /// palette's tint. Tools without a dedicated brush get the base pen.
    pub fn resolve_brush(
        &self,
        kind: BrushKind,
        color: BrushColor,
    ) -> Result<Box<dyn Brush>, RenderError> {
        let color = self.palette.color(color)?;
        let mask = self.load_mask(mask_name(kind))?;

        let brush: Box<dyn Brush> = match kind.canonical() {
            BrushKind::Ballpoint => Box::new(Ballpoint::new(color, mask)),
            BrushKind::Pencil => Box::new(Pencil::new(color, mask)),
            BrushKind::MechanicalPencil => Box::new(MechanicalPencil::new(color, mask)),
            BrushKind::Marker => Box::new(Marker::new(color, mask)),
            BrushKind::Fineliner => Box::new(Fineliner::new(color, mask)),
            BrushKind::Highlighter => Box::new(Highlighter::new(self.palette.highlighter(), mask)),
            BrushKind::PaintBrush => Box::new(Paintbrush::new(color)),
            other => {
                log::warn!("Unsupported brush type {:?}, drawing with base pen", other);
                Box::new(BasePen::new(color, mask))
            }
        };
        Ok(brush)
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(DEFAULT_RESOURCE_ROOT, Palette::default())
    }
}
