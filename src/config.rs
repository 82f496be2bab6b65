//! JSON configuration for building a renderer.
//!
//! ```json
//! {
//!   "resource_root": "./data",
//!   "palette": {
//!     "background": "#FFFFFF",
//!     "highlighter": {"r": 255, "g": 235, "b": 0, "a": 0.6},
//!     "colors": {"black": "#000", "blue": "#1F4FB4"}
//!   },
//!   "pdf": {"page_size": "A4", "margins": "0pt", "footer": true},
//!   "parallel": true
//! }
//! ```

use crate::document::{DocumentRenderer, PdfLayout};
use crate::error::Error;
use inkpress_executor::ExecutorImpl;
use inkpress_model::BrushColor;
use inkpress_raster::{Palette, RenderContext, DEFAULT_RESOURCE_ROOT};
use inkpress_types::{Color, Margins, PageSize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub background: Color,
    pub highlighter: Color,
    /// Color name (case-insensitive) to render color.
    pub colors: BTreeMap<String, Color>,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            highlighter: Color::gray(150),
            colors: BTreeMap::new(),
        }
    }
}

impl PaletteConfig {
    pub fn to_palette(&self) -> Palette {
        let mut palette = Palette::new(self.background, self.highlighter);
        for (name, color) in &self.colors {
            match BrushColor::from_name(name) {
                Some(id) => palette.set_color(id, *color),
                None => log::warn!("Ignoring palette entry for unknown color {:?}", name),
            }
        }
        palette
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    pub page_size: PageSize,
    pub margins: Margins,
    pub footer: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        let layout = PdfLayout::default();
        Self {
            page_size: layout.page_size,
            margins: layout.margins,
            footer: layout.footer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub resource_root: PathBuf,
    pub palette: PaletteConfig,
    pub pdf: PdfConfig,
    /// Rasterize pages of a document concurrently.
    pub parallel: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            resource_root: PathBuf::from(DEFAULT_RESOURCE_ROOT),
            palette: PaletteConfig::default(),
            pdf: PdfConfig::default(),
            parallel: true,
        }
    }
}

impl RenderConfig {
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config from '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn layout(&self) -> PdfLayout {
        PdfLayout {
            page_size: self.pdf.page_size,
            margins: self.pdf.margins,
            footer: self.pdf.footer,
        }
    }

    pub fn build_context(&self) -> RenderContext {
        RenderContext::new(&self.resource_root, self.palette.to_palette())
    }

    pub fn build_renderer(&self) -> DocumentRenderer {
        let executor = if self.parallel {
            ExecutorImpl::parallel()
        } else {
            ExecutorImpl::sequential()
        };
        DocumentRenderer::new(Arc::new(self.build_context()))
            .with_layout(self.layout())
            .with_executor(executor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = RenderConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.resource_root, PathBuf::from("./data"));
        assert_eq!(config.pdf.page_size, PageSize::A4);
        assert!(config.pdf.footer);
    }

    #[test]
    fn palette_entries_by_name() {
        let config = RenderConfig::from_json_str(
            r##"{"palette": {
                "background": "#FAFAFA",
                "colors": {
                    "Blue": "#0000FF",
                    "black": {"r": 10, "g": 10, "b": 10},
                    "mauve": "#123"
                }
            }}"##,
        )
        .unwrap();
        let palette = config.palette.to_palette();
        assert_eq!(palette.background(), Color::rgb(250, 250, 250));
        assert_eq!(palette.color(BrushColor::Blue).unwrap(), Color::rgb(0, 0, 255));
        assert_eq!(palette.color(BrushColor::Black).unwrap(), Color::rgb(10, 10, 10));
        assert_eq!(palette.color(BrushColor::Gray).unwrap(), Color::gray(150));
        assert!(palette.color(BrushColor::Red).is_err());
    }

    #[test]
    fn pdf_section() {
        let config = RenderConfig::from_json_str(
            r#"{
                "pdf": {
                    "page_size": {"width": 400, "height": 600},
                    "margins": "10pt",
                    "footer": false
                },
                "parallel": false
            }"#,
        )
        .unwrap();
        let layout = config.layout();
        assert_eq!(layout.page_size.dimensions_pt(), (400.0, 600.0));
        assert_eq!(layout.margins, Margins::all(10.0));
        assert!(!layout.footer);
        assert_eq!(config.build_renderer().executor_name(), "SyncExecutor");
    }

    #[test]
    fn malformed_config_is_a_config_error() {
        assert!(matches!(RenderConfig::from_json_str("{"), Err(Error::Config(_))));
        assert!(matches!(
            RenderConfig::from_json_str(r#"{"pdf": {"page_size": "B5"}}"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inkpress.json");
        std::fs::write(&path, r#"{"resource_root": "/opt/ink"}"#).unwrap();
        assert_eq!(
            RenderConfig::from_file(&path).unwrap().resource_root,
            PathBuf::from("/opt/ink")
        );
        assert!(matches!(
            RenderConfig::from_file(dir.path().join("missing.json")),
            Err(Error::Config(_))
        ));
    }
}
