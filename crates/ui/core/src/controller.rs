//! Controller nodes and the tree arena that owns them.
//!
//! A controller pairs application logic with exactly one window. Roots are
//! owned by the registry; children are owned by their parent and share the
//! parent's sorting band. The parent link is a plain [`NodeId`], so a child
//! never keeps its parent alive.
use std::collections::HashMap;

use crate::types::{
    ControllerKey, IdSequence, InstanceId, NodeId, UiCategory, WindowId, WindowKind,
    WindowOptions,
};

/// Lifecycle of a controller node.
///
/// ```text
/// Created → Loading → Ready → (Open ⇄ Hidden) → Closing → (removed)
/// ```
///
/// A closed node leaves the arena; its key then reads as not open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ControllerState {
    /// Registered, window not requested yet.
    Created,
    /// Window creation in flight.
    Loading,
    /// Window attached; sub-windows may still be loading.
    Ready,
    Open,
    Hidden,
    Closing,
}

#[derive(Clone, Debug)]
pub struct ControllerNode {
    pub id: NodeId,
    pub kind: WindowKind,
    pub instance: InstanceId,
    pub window: Option<WindowId>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub state: ControllerState,
    /// Whole subtree loaded.
    pub load_complete: bool,
    /// Close requested while loading; applied when the load resolves.
    pub pending_close: bool,
    /// Currently shown to the user (cleared by hide and by occlusion).
    pub is_opened: bool,
    pub category: UiCategory,
    pub options: WindowOptions,
    pub destroy_on_scene_change: bool,
}

impl ControllerNode {
    /// Registry key of this node; children carry their root's instance id.
    pub fn key(&self) -> ControllerKey {
        ControllerKey::new(self.kind.clone(), self.instance)
    }

    /// Band width this node reserves for its direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Arena of controller nodes.
#[derive(Debug, Default)]
pub struct ControllerTree {
    nodes: HashMap<NodeId, ControllerNode>,
    ids: IdSequence,
}

impl ControllerTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node in `Created` state, attached under `parent` if given.
    pub fn create(
        &mut self,
        kind: WindowKind,
        instance: InstanceId,
        parent: Option<NodeId>,
        category: UiCategory,
        options: WindowOptions,
        destroy_on_scene_change: bool,
    ) -> NodeId {
        let id = NodeId(self.ids.next());
        self.nodes.insert(
            id,
            ControllerNode {
                id,
                kind,
                instance,
                window: None,
                parent,
                children: Vec::new(),
                state: ControllerState::Created,
                load_complete: false,
                pending_close: false,
                is_opened: false,
                category,
                options,
                destroy_on_scene_change,
            },
        );
        if let Some(parent) = parent.and_then(|parent| self.nodes.get_mut(&parent)) {
            parent.children.push(id);
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&ControllerNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ControllerNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Remove a single node, detaching it from its parent's child list.
    ///
    /// Children are not touched; callers tear subtrees down leaf-first.
    pub fn remove(&mut self, id: NodeId) -> Option<ControllerNode> {
        let node = self.nodes.remove(&id)?;
        if let Some(parent) = node.parent.and_then(|parent| self.nodes.get_mut(&parent)) {
            parent.children.retain(|child| *child != id);
        }
        Some(node)
    }

    /// Subtree of `root` in depth-first pre-order (parent before children).
    pub fn pre_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            order.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// Subtree of `root` in depth-first post-order (children before parent).
    pub fn post_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        self.collect_post_order(root, &mut order);
        order
    }

    fn collect_post_order(&self, id: NodeId, order: &mut Vec<NodeId>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        for child in &node.children {
            self.collect_post_order(*child, order);
        }
        order.push(id);
    }

    /// Open descendants reached through open parents, parents first.
    ///
    /// A hidden child stops the walk: it and its subtree keep their state.
    pub fn open_descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self
            .nodes
            .get(&id)
            .map(|node| node.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(child) = stack.pop() {
            let Some(node) = self.nodes.get(&child) else {
                continue;
            };
            if node.state != ControllerState::Open {
                continue;
            }
            result.push(child);
            stack.extend(node.children.iter().rev().copied());
        }
        result
    }
}
