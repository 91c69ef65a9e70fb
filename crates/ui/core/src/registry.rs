//! Registry of live root controllers.
//!
//! # Design
//!
//! ```text
//! ControllerRegistry
//! ├── containers: HashMap<WindowKind, KindContainer>   (one per open kind)
//! │   └── controllers: BTreeMap<InstanceId, NodeId>
//! └── created: Vec<(ControllerKey, NodeId)>            (creation order)
//! ```
//!
//! A container disappears as soon as its last instance is removed, so an
//! instance id is present exactly while its controller is open. Every listing
//! walks `created`, so bulk operations visit controllers in creation order.
use std::collections::{BTreeMap, HashMap};

use crate::types::{ControllerKey, InstanceId, NodeId, UiCategory, WindowKind};

#[derive(Debug, Default)]
struct KindContainer {
    category: UiCategory,
    controllers: BTreeMap<InstanceId, NodeId>,
}

#[derive(Debug, Default)]
pub struct ControllerRegistry {
    containers: HashMap<WindowKind, KindContainer>,
    created: Vec<(ControllerKey, NodeId)>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a root controller. Returns `false` if the key is taken.
    pub fn register(&mut self, key: &ControllerKey, node: NodeId, category: UiCategory) -> bool {
        let container = self.containers.entry(key.kind.clone()).or_default();
        if container.controllers.contains_key(&key.instance) {
            return false;
        }
        container.controllers.insert(key.instance, node);
        container.category = category;
        self.created.push((key.clone(), node));
        true
    }

    pub fn get(&self, key: &ControllerKey) -> Option<NodeId> {
        self.containers
            .get(&key.kind)
            .and_then(|container| container.controllers.get(&key.instance))
            .copied()
    }

    pub fn contains(&self, key: &ControllerKey) -> bool {
        self.get(key).is_some()
    }

    /// Remove a controller; returns the node it mapped to.
    pub fn remove(&mut self, key: &ControllerKey) -> Option<NodeId> {
        let container = self.containers.get_mut(&key.kind)?;
        let node = container.controllers.remove(&key.instance)?;
        if container.controllers.is_empty() {
            self.containers.remove(&key.kind);
        }
        self.created.retain(|(_, id)| *id != node);
        Some(node)
    }

    /// Number of open controllers across all kinds.
    pub fn len(&self) -> usize {
        self.created.len()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }

    /// Live roots in creation order.
    pub fn created(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.created.iter().map(|(_, node)| *node)
    }

    /// Number of open instances of `kind`.
    pub fn instances_of(&self, kind: &WindowKind) -> usize {
        self.containers
            .get(kind)
            .map(|container| container.controllers.len())
            .unwrap_or(0)
    }

    /// Every controller whose kind is registered under `category`, in
    /// creation order.
    pub fn keys_in_category(&self, category: UiCategory) -> Vec<ControllerKey> {
        self.created
            .iter()
            .filter(|(key, _)| {
                self.containers
                    .get(&key.kind)
                    .is_some_and(|container| container.category == category)
            })
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Every live controller in creation order.
    pub fn keys(&self) -> Vec<ControllerKey> {
        self.created.iter().map(|(key, _)| key.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_ids_are_unique_per_kind() {
        let mut registry = ControllerRegistry::new();
        let key = ControllerKey::new("shop", InstanceId(1));

        assert!(registry.register(&key, NodeId(1), UiCategory::Popup));
        assert!(!registry.register(&key, NodeId(2), UiCategory::Popup));
        assert!(registry.register(&ControllerKey::new("shop", InstanceId(2)), NodeId(3), UiCategory::Popup));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(&key), Some(NodeId(1)));
    }

    #[test]
    fn removing_last_instance_drops_the_container() {
        let mut registry = ControllerRegistry::new();
        let key = ControllerKey::new("hud", InstanceId(0));
        registry.register(&key, NodeId(1), UiCategory::Hud);

        assert_eq!(registry.remove(&key), Some(NodeId(1)));
        assert_eq!(registry.remove(&key), None);
        assert_eq!(registry.instances_of(&"hud".into()), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn category_lookup_collects_all_instances() {
        let mut registry = ControllerRegistry::new();
        registry.register(&ControllerKey::new("talk", InstanceId(0)), NodeId(1), UiCategory::Dialogue);
        registry.register(&ControllerKey::new("talk", InstanceId(1)), NodeId(2), UiCategory::Dialogue);
        registry.register(&ControllerKey::new("hud", InstanceId(0)), NodeId(3), UiCategory::Hud);

        assert_eq!(
            registry.keys_in_category(UiCategory::Dialogue),
            vec![
                ControllerKey::new("talk", InstanceId(0)),
                ControllerKey::new("talk", InstanceId(1)),
            ]
        );
        assert_eq!(
            registry.created().collect::<Vec<_>>(),
            vec![NodeId(1), NodeId(2), NodeId(3)]
        );
    }

    #[test]
    fn listings_follow_creation_order() {
        let mut registry = ControllerRegistry::new();
        let kinds = ["shop", "bag", "talk", "inventory", "map", "quest"];
        for (index, kind) in kinds.iter().enumerate() {
            registry.register(
                &ControllerKey::new(*kind, InstanceId(0)),
                NodeId(index as u64 + 1),
                UiCategory::Popup,
            );
        }
        registry.remove(&ControllerKey::new("talk", InstanceId(0)));

        let expected: Vec<ControllerKey> = ["shop", "bag", "inventory", "map", "quest"]
            .into_iter()
            .map(|kind| ControllerKey::new(kind, InstanceId(0)))
            .collect();
        assert_eq!(registry.keys(), expected);
        assert_eq!(registry.keys_in_category(UiCategory::Popup), expected);
    }
}
