//! Notebook-level metadata: the tablet's `.content` and per-page `.json` files.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Maximum number of layers a single page may carry.
pub const MAX_LAYERS: usize = 5;

/// Cover page sentinel meaning "not set".
pub const DEFAULT_COVER_PAGE: i64 = -1;

/// The kind of content backing a notebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum FileType {
    /// Handwritten pages only.
    #[default]
    Notebook,
    /// Ink annotations on top of an imported PDF.
    Pdf,
    /// An imported ebook.
    Epub,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Notebook => "notebook",
            FileType::Pdf => "pdf",
            FileType::Epub => "epub",
        }
    }

    /// File extension of the source attachment, empty for plain notebooks.
    pub fn ext(&self) -> &'static str {
        match self {
            FileType::Notebook => "",
            FileType::Pdf => ".pdf",
            FileType::Epub => ".epub",
        }
    }
}

impl FromStr for FileType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notebook" => Ok(FileType::Notebook),
            "pdf" => Ok(FileType::Pdf),
            "epub" => Ok(FileType::Epub),
            other => Err(ValidationError::InvalidFileType(other.to_string())),
        }
    }
}

impl TryFrom<String> for FileType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl FromStr for Orientation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            other => Err(ValidationError::InvalidOrientation(other.to_string())),
        }
    }
}

impl TryFrom<String> for Orientation {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Text alignment for reflowable (EPUB) content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TextAlign {
    #[default]
    Left,
    Justify,
}

impl FromStr for TextAlign {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(TextAlign::Left),
            "justify" => Ok(TextAlign::Justify),
            other => Err(ValidationError::InvalidTextAlign(other.to_string())),
        }
    }
}

impl TryFrom<String> for TextAlign {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Line height setting in percent; the tablet writes -1 for "default".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineHeight(pub i32);

impl LineHeight {
    pub const DEFAULT: LineHeight = LineHeight(-1);
    pub const SMALL: LineHeight = LineHeight(100);
    pub const MEDIUM: LineHeight = LineHeight(150);
    pub const LARGE: LineHeight = LineHeight(200);
}

impl Default for LineHeight {
    fn default() -> Self {
        LineHeight::DEFAULT
    }
}

/// A 3x3 page transform. Only the identity has been observed in practice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub m11: f32,
    pub m12: f32,
    pub m13: f32,
    pub m21: f32,
    pub m22: f32,
    pub m23: f32,
    pub m31: f32,
    pub m32: f32,
    pub m33: f32,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            m11: 1.0,
            m12: 0.0,
            m13: 0.0,
            m21: 0.0,
            m22: 1.0,
            m23: 0.0,
            m31: 0.0,
            m32: 0.0,
            m33: 1.0,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// The page collection of a notebook, as stored in its `.content` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub dummy_document: bool,
    #[serde(default)]
    pub extra_metadata: BTreeMap<String, serde_json::Value>,
    pub file_type: FileType,
    #[serde(default)]
    pub orientation: Orientation,
    pub page_count: usize,
    /// Page IDs in display order.
    #[serde(default)]
    pub pages: Vec<String>,
    /// 1-based cover page, or [`DEFAULT_COVER_PAGE`].
    #[serde(default = "default_cover_page", rename = "coverPageNumber")]
    pub cover_page: i64,
    #[serde(default)]
    pub font_name: String,
    #[serde(default)]
    pub line_height: LineHeight,
    #[serde(default = "default_margins")]
    pub margins: i32,
    #[serde(default)]
    pub text_alignment: TextAlign,
    #[serde(default = "default_text_scale")]
    pub text_scale: f32,
    #[serde(default)]
    pub transform: Transform,
}

fn default_cover_page() -> i64 {
    DEFAULT_COVER_PAGE
}

fn default_margins() -> i32 {
    100
}

fn default_text_scale() -> f32 {
    1.0
}

impl Content {
    /// An empty content description with the tablet's defaults.
    pub fn new(file_type: FileType) -> Self {
        Self {
            dummy_document: false,
            extra_metadata: BTreeMap::new(),
            file_type,
            orientation: Orientation::Portrait,
            page_count: 0,
            pages: Vec::new(),
            cover_page: DEFAULT_COVER_PAGE,
            font_name: String::new(),
            line_height: LineHeight::DEFAULT,
            margins: default_margins(),
            text_alignment: TextAlign::Left,
            text_scale: default_text_scale(),
            transform: Transform::identity(),
        }
    }

    /// Decodes and validates a `.content` document.
    ///
    /// Unknown enum strings surface as their own [`ValidationError`] variant
    /// rather than a silently substituted default.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        check_enum::<FileType>(&value, "fileType")?;
        check_enum::<Orientation>(&value, "orientation")?;
        check_enum::<TextAlign>(&value, "textAlignment")?;

        let content: Content = serde_json::from_value(value)?;
        content.validate()?;
        Ok(content)
    }

    /// Appends a page ID and keeps `page_count` in sync.
    pub fn push_page(&mut self, page_id: impl Into<String>) {
        self.pages.push(page_id.into());
        self.page_count = self.pages.len();
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page_count != self.pages.len() {
            return Err(ValidationError::PageCountMismatch {
                count: self.page_count,
                actual: self.pages.len(),
            });
        }

        if self.cover_page != DEFAULT_COVER_PAGE
            && (self.cover_page < 1 || self.cover_page > self.page_count as i64)
        {
            return Err(ValidationError::CoverPageOutOfRange(self.cover_page));
        }

        Ok(())
    }
}

/// Parses `key` as `T` when it holds a string, so a bad value reports the
/// enum's own error instead of a generic decode failure.
fn check_enum<T>(value: &serde_json::Value, key: &str) -> Result<(), ValidationError>
where
    T: FromStr<Err = ValidationError>,
{
    match value.get(key).and_then(serde_json::Value::as_str) {
        Some(s) => s.parse::<T>().map(|_| ()),
        None => Ok(()),
    }
}

/// Layer information for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(default)]
    pub layers: Vec<LayerMetadata>,
}

impl PageMetadata {
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let meta: PageMetadata = serde_json::from_str(json)?;
        meta.validate()?;
        Ok(meta)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_layer_names(self.layers.iter().map(|l| l.name.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerMetadata {
    /// Display name of the layer.
    pub name: String,
}

/// Shared layer rule: between one and [`MAX_LAYERS`] layers, none unnamed.
pub(crate) fn validate_layer_names<'a>(
    names: impl ExactSizeIterator<Item = &'a str>,
) -> Result<(), ValidationError> {
    let count = names.len();
    if count == 0 {
        return Err(ValidationError::NoLayers);
    }
    if count > MAX_LAYERS {
        return Err(ValidationError::TooManyLayers { count, max: MAX_LAYERS });
    }
    for (index, name) in names.enumerate() {
        if name.is_empty() {
            return Err(ValidationError::EmptyLayerName { index });
        }
    }
    Ok(())
}
