//! Content factory for building the window catalog from a data directory.

use std::path::{Path, PathBuf};

use tracing::info;
use ui_core::{LayoutConfig, WindowCatalog};

use crate::loaders::{CatalogLoader, LayoutLoader, LoadResult};

/// Loads all UI content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── layout.toml        (optional)
/// ├── windows.ron
/// └── windows/           (optional, joined in file-name order)
///     ├── dialogue.ron
///     └── shop.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Every catalog file, `windows.ron` first.
    pub fn catalog_files(&self) -> LoadResult<Vec<PathBuf>> {
        let mut files = vec![self.data_dir.join("windows.ron")];

        let extra_dir = self.data_dir.join("windows");
        if extra_dir.is_dir() {
            let mut extra: Vec<PathBuf> = std::fs::read_dir(&extra_dir)
                .map_err(|e| anyhow::anyhow!("Failed to list {}: {}", extra_dir.display(), e))?
                .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
                .collect();
            extra.sort();
            files.extend(extra);
        }
        Ok(files)
    }

    /// Load and join every catalog file.
    pub fn load_catalog(&self) -> LoadResult<WindowCatalog> {
        let files = self.catalog_files()?;
        let catalog = CatalogLoader::load_all(&files)?;
        info!(
            target: "ui::content",
            files = files.len(),
            kinds = catalog.len(),
            "window catalog loaded"
        );
        Ok(catalog)
    }

    /// Load `layout.toml`, falling back to the default layout when absent.
    pub fn load_layout(&self) -> LoadResult<LayoutConfig> {
        let path = self.data_dir.join("layout.toml");
        if path.exists() {
            LayoutLoader::load(&path)
        } else {
            Ok(LayoutConfig::default())
        }
    }
}
