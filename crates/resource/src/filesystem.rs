//! Assets read from a data directory on disk.
//!
//! The expected layout is:
//!
//! ```text
//! <root>/sprites.png
//! <root>/sprites.json
//! <root>/templates/<name>.png
//! ```
//!
//! Paths are resolved relative to the root and may not escape it.

use inkpress_traits::{ResourceError, ResourceProvider, SharedResourceData};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

#[derive(Debug)]
pub struct FilesystemResourceProvider {
    root: PathBuf,
    root_str: Option<String>,
    /// Canonical root, when it existed at construction time.
    canonical_root: Option<PathBuf>,
}

impl FilesystemResourceProvider {
    /// No I/O beyond canonicalizing the root; the directory may not exist yet.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let canonical_root = root.canonicalize().ok();
        Self {
            root_str: root.to_str().map(str::to_string),
            root,
            canonical_root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins `path` onto the root, refusing absolute paths and anything that
    /// would resolve outside of it.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        if relative.is_absolute() {
            return None;
        }

        let full_path = self.root.join(relative);

        if let Ok(canonical) = full_path.canonicalize()
            && let Some(root) = &self.canonical_root
        {
            return canonical.starts_with(root).then_some(canonical);
        }

        if relative.components().any(|c| matches!(c, Component::ParentDir)) {
            return None;
        }

        Some(full_path)
    }
}

impl ResourceProvider for FilesystemResourceProvider {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let full_path = self.resolve(path).ok_or_else(|| {
            log::warn!("Refusing to load resource outside of {:?}: {}", self.root, path);
            ResourceError::NotFound(format!("{} (outside resource root)", path))
        })?;

        log::debug!("Read resource from {:?}", full_path);
        std::fs::read(&full_path).map(Arc::new).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ResourceError::NotFound(path.to_string())
            } else {
                ResourceError::LoadFailed {
                    path: path.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|p| p.exists())
    }

    fn base_path(&self) -> Option<&str> {
        self.root_str.as_deref()
    }

    fn name(&self) -> &'static str {
        "FilesystemResourceProvider"
    }
}
