//! Resource providers for the inkpress renderer.
//!
//! - [`FilesystemResourceProvider`]: assets below a data directory
//! - [`InMemoryResourceProvider`]: re-exported from `inkpress-traits`

mod filesystem;

pub use filesystem::FilesystemResourceProvider;

pub use inkpress_traits::InMemoryResourceProvider;
