//! Window catalog: which resource backs each window kind.
//!
//! The catalog is the path-resolution collaborator of the window system. It is
//! built once (from code or from catalog files, see `ui-content`) and then
//! only read.
use std::collections::HashMap;

use tracing::warn;

use crate::error::{Result, UiError};
use crate::types::{ResourcePath, UiCategory, WindowKind};

/// Everything the window system needs to know about one window kind.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowBlueprint {
    pub kind: WindowKind,
    pub path: ResourcePath,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: UiCategory,
    /// Sub-window kinds opened inside this window, in display order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<WindowKind>,
    /// Closed automatically when a scene change starts.
    #[cfg_attr(feature = "serde", serde(default = "default_destroy_on_scene_change"))]
    pub destroy_on_scene_change: bool,
}

#[cfg(feature = "serde")]
fn default_destroy_on_scene_change() -> bool {
    true
}

impl WindowBlueprint {
    pub fn new(kind: impl Into<WindowKind>, path: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            path: ResourcePath::new(path),
            category: UiCategory::None,
            children: Vec::new(),
            destroy_on_scene_change: true,
        }
    }

    pub fn category(mut self, category: UiCategory) -> Self {
        self.category = category;
        self
    }

    pub fn child(mut self, kind: impl Into<WindowKind>) -> Self {
        self.children.push(kind.into());
        self
    }

    /// Keep this window alive across scene changes.
    pub fn persistent(mut self) -> Self {
        self.destroy_on_scene_change = false;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct WindowCatalog {
    entries: HashMap<WindowKind, WindowBlueprint>,
}

impl WindowCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, keeping the first entry for each kind.
    ///
    /// Later duplicates are logged and ignored.
    pub fn from_entries(entries: impl IntoIterator<Item = WindowBlueprint>) -> Self {
        let mut catalog = Self::new();
        catalog.extend(entries);
        catalog
    }

    /// Register a blueprint, rejecting a kind that is already present.
    pub fn register(&mut self, blueprint: WindowBlueprint) -> Result<()> {
        if let Some(existing) = self.entries.get(&blueprint.kind) {
            return Err(UiError::DuplicateRegistration {
                kind: blueprint.kind,
                kept: existing.path.clone(),
            });
        }
        self.entries.insert(blueprint.kind.clone(), blueprint);
        Ok(())
    }

    /// Merge entries into the catalog, first registration wins.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = WindowBlueprint>) {
        for (index, blueprint) in entries.into_iter().enumerate() {
            let ignored = blueprint.path.clone();
            if let Err(error) = self.register(blueprint) {
                warn!(
                    target: "ui::catalog",
                    index,
                    ignored = %ignored,
                    error = %error,
                    "duplicate window kind ignored"
                );
            }
        }
    }

    pub fn get(&self, kind: &WindowKind) -> Option<&WindowBlueprint> {
        self.entries.get(kind)
    }

    /// Resource path for a kind; empty paths count as missing.
    pub fn resolve_path(&self, kind: &WindowKind) -> Option<&ResourcePath> {
        self.entries
            .get(kind)
            .map(|blueprint| &blueprint.path)
            .filter(|path| !path.is_empty())
    }

    pub fn category(&self, kind: &WindowKind) -> UiCategory {
        self.entries
            .get(kind)
            .map(|blueprint| blueprint.category)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_registration_wins() {
        let catalog = WindowCatalog::from_entries([
            WindowBlueprint::new("inventory", "ui/inventory.prefab"),
            WindowBlueprint::new("inventory", "ui/inventory_old.prefab"),
            WindowBlueprint::new("shop", "ui/shop.prefab"),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.resolve_path(&"inventory".into()).unwrap().as_str(),
            "ui/inventory.prefab"
        );
    }

    #[test]
    fn register_reports_duplicate() {
        let mut catalog = WindowCatalog::new();
        catalog
            .register(WindowBlueprint::new("hud", "ui/hud.prefab"))
            .unwrap();

        let error = catalog
            .register(WindowBlueprint::new("hud", "ui/hud2.prefab"))
            .unwrap_err();

        assert!(matches!(error, UiError::DuplicateRegistration { .. }));
    }

    #[test]
    fn empty_path_does_not_resolve() {
        let catalog = WindowCatalog::from_entries([WindowBlueprint::new("broken", "")]);

        assert!(catalog.get(&"broken".into()).is_some());
        assert!(catalog.resolve_path(&"broken".into()).is_none());
    }
}
