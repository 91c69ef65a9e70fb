//! Sorting-order layout loader.

use std::path::Path;

use ui_core::LayoutConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`LayoutConfig`] from TOML files.
///
/// Missing keys keep their defaults:
/// ```toml
/// band_increment = 10
/// pinned_order = 1000
/// ```
pub struct LayoutLoader;

impl LayoutLoader {
    pub fn load(path: &Path) -> LoadResult<LayoutConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<LayoutConfig> {
        let layout: LayoutConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse layout TOML: {}", e))?;

        if layout.band_increment <= 0 {
            anyhow::bail!("band_increment must be positive, got {}", layout.band_increment);
        }
        if layout.pinned_order <= layout.initial_band {
            anyhow::bail!(
                "pinned_order {} must sit above initial_band {}",
                layout.pinned_order,
                layout.initial_band
            );
        }
        Ok(layout)
    }
}
