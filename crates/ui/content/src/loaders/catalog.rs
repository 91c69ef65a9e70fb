//! Window catalog loader.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ui_core::{WindowBlueprint, WindowCatalog};

use crate::loaders::{LoadResult, read_file};

/// Window catalog structure for RON files.
///
/// ```ron
/// (
///     windows: [
///         (kind: "inventory", path: "ui/inventory", category: Popup, children: ["tooltip"]),
///         (kind: "hud", path: "ui/hud", category: Hud, destroy_on_scene_change: false),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub windows: Vec<WindowBlueprint>,
}

/// Loader for window catalogs from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load the entries of one catalog file, in file order.
    pub fn load(path: &Path) -> LoadResult<Vec<WindowBlueprint>> {
        let content = read_file(path)?;
        let entries = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse window catalog {}: {}", path.display(), e))?;
        debug!(
            target: "ui::content",
            path = %path.display(),
            entries = entries.len(),
            "catalog file loaded"
        );
        Ok(entries)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<WindowBlueprint>> {
        let catalog: CatalogFile = ron::from_str(content)?;
        if let Some(entry) = catalog.windows.iter().find(|entry| entry.kind.as_str().is_empty()) {
            anyhow::bail!("catalog entry with path {} has an empty kind", entry.path);
        }
        Ok(catalog.windows)
    }

    /// Join several catalog files. A kind declared twice keeps its first
    /// declaration.
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> LoadResult<WindowCatalog> {
        let mut catalog = WindowCatalog::new();
        for path in paths {
            catalog.extend(Self::load(path.as_ref())?);
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use ui_core::{UiCategory, WindowKind};

    use super::*;

    const BASE: &str = r#"(
        windows: [
            (kind: "inventory", path: "ui/inventory", category: Popup, children: ["tooltip"]),
            (kind: "tooltip", path: "ui/tooltip"),
        ],
    )"#;

    const OVERRIDE: &str = r#"(
        windows: [
            (kind: "inventory", path: "mods/inventory"),
            (kind: "hud", path: "ui/hud", category: Hud, destroy_on_scene_change: false),
        ],
    )"#;

    #[test]
    fn parse_applies_field_defaults() {
        let entries = CatalogLoader::parse(BASE).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].category, UiCategory::Popup);
        assert_eq!(entries[0].children, vec![WindowKind::from("tooltip")]);
        assert_eq!(entries[1].category, UiCategory::None);
        assert!(entries[1].destroy_on_scene_change);
    }

    #[test]
    fn joined_files_keep_first_declaration() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("base.ron");
        let extra = dir.path().join("extra.ron");
        fs::write(&base, BASE).unwrap();
        fs::write(&extra, OVERRIDE).unwrap();

        let catalog = CatalogLoader::load_all(&[base, extra]).unwrap();

        assert_eq!(catalog.len(), 3);
        let path = catalog.resolve_path(&WindowKind::from("inventory")).unwrap();
        assert_eq!(path.as_str(), "ui/inventory");
        assert_eq!(catalog.category(&WindowKind::from("hud")), UiCategory::Hud);
    }

    #[test]
    fn empty_kind_is_rejected() {
        let content = r#"(windows: [(kind: "", path: "ui/nothing")])"#;
        assert!(CatalogLoader::parse(content).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let error = CatalogLoader::load(Path::new("/nonexistent/windows.ron")).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/windows.ron"));
    }
}
