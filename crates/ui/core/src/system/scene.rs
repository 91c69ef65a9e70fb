use crate::arbiter::OcclusionScene;
use crate::controller::ControllerTree;
use crate::event::{LifecycleEvent, Notification, UiEvent};
use crate::registry::ControllerRegistry;
use crate::types::{NodeId, WindowId};
use crate::window::WindowStore;

/// Mutable view over the arenas the full-screen arbiter works on.
pub(super) struct SceneView<'a> {
    pub(super) tree: &'a mut ControllerTree,
    pub(super) windows: &'a mut WindowStore,
    pub(super) registry: &'a ControllerRegistry,
    pub(super) events: &'a mut Vec<UiEvent>,
}

impl SceneView<'_> {
    /// The node plus every open descendant, parents first.
    fn cascade(&self, node: NodeId) -> Vec<NodeId> {
        let mut nodes = vec![node];
        nodes.extend(self.tree.open_descendants(node));
        nodes
    }

    fn set_occluded(&mut self, node: NodeId, occluded: bool) {
        let Some(root_window) = self.tree.get(node).and_then(|node| node.window) else {
            return;
        };
        let Some(user_hidden) = self.windows.get(root_window).map(|handle| !handle.is_open())
        else {
            return;
        };

        for id in self.cascade(node) {
            let Some(node) = self.tree.get_mut(id) else {
                continue;
            };
            let Some(handle) = node.window.and_then(|window| self.windows.get_mut(window)) else {
                continue;
            };
            if occluded {
                handle.occlude();
            } else {
                handle.restore();
            }
            node.is_opened = handle.is_visible();

            // A window the user hid stays hidden once uncovered.
            if !occluded && user_hidden {
                continue;
            }
            let key = node.key();
            self.events.push(
                if occluded {
                    LifecycleEvent::HiddenByFullScreen { key }
                } else {
                    LifecycleEvent::ShownByFullScreen { key }
                }
                .into(),
            );
        }
    }
}

impl OcclusionScene for SceneView<'_> {
    fn controller_order(&self, node: NodeId) -> Option<i32> {
        self.tree
            .get(node)
            .and_then(|node| node.window)
            .and_then(|window| self.windows.sorting_order(window))
    }

    fn live_controllers(&self) -> Vec<NodeId> {
        self.registry.created().collect()
    }

    fn window_order(&self, window: WindowId) -> Option<i32> {
        self.windows.sorting_order(window)
    }

    fn hide_controller(&mut self, node: NodeId) {
        self.set_occluded(node, true);
    }

    fn restore_controller(&mut self, node: NodeId) {
        self.set_occluded(node, false);
    }

    fn hide_window(&mut self, window: WindowId) {
        if let Some(handle) = self.windows.get_mut(window) {
            handle.occlude();
        }
    }

    fn restore_window(&mut self, window: WindowId) {
        if let Some(handle) = self.windows.get_mut(window) {
            handle.restore();
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.events.push(notification.into());
    }
}
