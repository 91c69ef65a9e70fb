//! The window system: controller lifecycle, sorting bands and full-screen
//! arbitration behind one synchronous API.
//!
//! [`WindowSystem`] never performs I/O. Opening a controller hands back a
//! [`LoadRequest`] that the owner fulfils (usually asynchronously) and reports
//! through [`WindowSystem::complete_load`]. Everything observable is appended
//! to an event outbox drained with [`WindowSystem::drain_events`].
//!
//! ```text
//! request_open ──► Load(request) ──► complete_load ──► Next(request) ─┐
//!      │                                  ▲                           │
//!      │                                  └───────────────────────────┘
//!      ├──► Queued    (same identity already loading)
//!      └──► Ready     (already open)        complete_load ──► Resolved
//! ```
mod loading;
mod scene;

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info};

use crate::arbiter::FullScreenArbiter;
use crate::catalog::WindowCatalog;
use crate::config::LayoutConfig;
use crate::controller::{ControllerState, ControllerTree};
use crate::error::{Result, UiError};
use crate::event::{LifecycleEvent, Notification, UiEvent};
use crate::registry::ControllerRegistry;
use crate::sorting::SortingOrderAllocator;
use crate::types::{
    ControllerKey, IdSequence, LoadTicket, NodeId, UiCategory, WaiterId, WindowId,
};
use crate::window::{RawWindow, WindowHandle, WindowStore};

pub use loading::{LoadProgress, LoadRequest, OpenOutcome, OpenResolution};
use scene::SceneView;

/// Read-only snapshot of a controller and its sub-windows.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ControllerInfo {
    pub key: ControllerKey,
    pub node: NodeId,
    pub state: ControllerState,
    pub category: UiCategory,
    pub sorting_order: Option<i32>,
    pub pinned: bool,
    pub full_screen: bool,
    pub is_opened: bool,
    pub visible: bool,
    pub children: Vec<ControllerInfo>,
}

/// Result of a close request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Subtree torn down.
    Closed,
    /// Still loading; closes as soon as the in-flight load resolves.
    Deferred,
    /// Nothing open under that key.
    NotOpen,
}

/// Open identity waiting on its window tree.
#[derive(Debug)]
struct InFlight {
    root: NodeId,
    waiters: Vec<WaiterId>,
}

/// One outstanding loader call.
#[derive(Debug)]
struct PendingLoad {
    root_key: ControllerKey,
    node: NodeId,
}

pub struct WindowSystem {
    catalog: WindowCatalog,
    tree: ControllerTree,
    windows: WindowStore,
    registry: ControllerRegistry,
    allocator: SortingOrderAllocator,
    arbiter: FullScreenArbiter,
    in_flight: HashMap<ControllerKey, InFlight>,
    loads: HashMap<LoadTicket, PendingLoad>,
    delayed: BTreeSet<LoadTicket>,
    standalone: BTreeSet<WindowId>,
    tickets: IdSequence,
    events: Vec<UiEvent>,
}

impl WindowSystem {
    pub fn new(catalog: WindowCatalog, layout: LayoutConfig) -> Self {
        Self {
            catalog,
            tree: ControllerTree::new(),
            windows: WindowStore::new(),
            registry: ControllerRegistry::new(),
            allocator: SortingOrderAllocator::new(layout),
            arbiter: FullScreenArbiter::new(),
            in_flight: HashMap::new(),
            loads: HashMap::new(),
            delayed: BTreeSet::new(),
            standalone: BTreeSet::new(),
            tickets: IdSequence::default(),
            events: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &WindowCatalog {
        &self.catalog
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    // ===== queries =====

    /// Number of registered root controllers (loading ones included).
    pub fn open_count(&self) -> usize {
        self.registry.len()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn next_band(&self) -> i32 {
        self.allocator.next_band()
    }

    pub fn contains(&self, key: &ControllerKey) -> bool {
        self.registry.contains(key)
    }

    pub fn get(&self, key: &ControllerKey) -> Option<ControllerInfo> {
        self.registry.get(key).and_then(|node| self.info(node))
    }

    /// Whether the controller is currently shown to the user.
    pub fn is_opened(&self, key: &ControllerKey) -> bool {
        self.registry
            .get(key)
            .and_then(|node| self.tree.get(node))
            .is_some_and(|node| node.is_opened)
    }

    /// First live root controller, in creation order, matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&ControllerInfo) -> bool) -> Option<ControllerInfo> {
        self.registry
            .created()
            .filter_map(|node| self.info(node))
            .find(|info| predicate(info))
    }

    /// Snapshots of every live root controller in creation order.
    pub fn controllers(&self) -> Vec<ControllerInfo> {
        self.registry
            .created()
            .filter_map(|node| self.info(node))
            .collect()
    }

    pub fn window(&self, id: WindowId) -> Option<&WindowHandle> {
        self.windows.get(id)
    }

    /// Highest order among controller windows, 0 when none is open.
    pub fn max_sorting_order(&self, include_pinned: bool) -> i32 {
        self.windows
            .iter()
            .filter(|window| !self.standalone.contains(&window.id))
            .filter(|window| include_pinned || !window.pinned)
            .map(|window| window.sorting_order)
            .max()
            .unwrap_or(0)
    }

    pub fn is_full_screen_open(&self) -> bool {
        self.arbiter.is_full_screen_open()
    }

    pub fn is_culling(&self) -> bool {
        self.arbiter.is_culling()
    }

    pub fn is_paused(&self) -> bool {
        self.arbiter.is_paused()
    }

    /// Active full-screen controller, if any.
    pub fn active_full_screen(&self) -> Option<ControllerKey> {
        self.arbiter
            .full_screen_controllers()
            .iter()
            .filter_map(|id| self.tree.get(*id))
            .filter_map(|node| {
                let order = node.window.and_then(|window| self.windows.sorting_order(window))?;
                Some((node.key(), order))
            })
            .min_by_key(|(_, order)| *order)
            .map(|(key, _)| key)
    }

    fn info(&self, id: NodeId) -> Option<ControllerInfo> {
        let node = self.tree.get(id)?;
        let window = node.window.and_then(|window| self.windows.get(window));
        Some(ControllerInfo {
            key: node.key(),
            node: id,
            state: node.state,
            category: node.category,
            sorting_order: window.map(|window| window.sorting_order),
            pinned: window.is_some_and(|window| window.pinned),
            full_screen: window.is_some_and(|window| window.full_screen),
            is_opened: node.is_opened,
            visible: window.is_some_and(|window| window.is_visible()),
            children: node
                .children
                .iter()
                .filter_map(|child| self.info(*child))
                .collect(),
        })
    }

    // ===== show / hide =====

    pub fn show(&mut self, key: &ControllerKey) -> Result<()> {
        self.set_hidden(key, false)
    }

    pub fn hide(&mut self, key: &ControllerKey) -> Result<()> {
        self.set_hidden(key, true)
    }

    fn set_hidden(&mut self, key: &ControllerKey, hidden: bool) -> Result<()> {
        let root = self.loaded_root(key)?;
        let has_window = self
            .tree
            .get(root)
            .and_then(|node| node.window)
            .is_some_and(|window| self.windows.get(window).is_some());
        if !has_window {
            return Err(UiError::StaleReference { key: key.clone() });
        }

        if let Some(node) = self.tree.get_mut(root) {
            node.state = if hidden {
                ControllerState::Hidden
            } else {
                ControllerState::Open
            };
        }

        // Sub-windows are drawn inside their parent, so they follow it.
        let mut cascade = vec![root];
        cascade.extend(self.tree.open_descendants(root));
        for id in cascade {
            let Some(node) = self.tree.get_mut(id) else {
                continue;
            };
            if let Some(window) = node.window.and_then(|window| self.windows.get_mut(window)) {
                if hidden {
                    window.hide();
                } else {
                    window.show();
                }
                node.is_opened = window.is_visible();
            }
            let key = node.key();
            self.events.push(
                if hidden {
                    LifecycleEvent::Hidden { key }
                } else {
                    LifecycleEvent::Shown { key }
                }
                .into(),
            );
        }
        Ok(())
    }

    /// Registered root whose whole tree has loaded.
    fn loaded_root(&self, key: &ControllerKey) -> Result<NodeId> {
        let root = self
            .registry
            .get(key)
            .ok_or_else(|| UiError::StaleReference { key: key.clone() })?;
        match self.tree.get(root) {
            Some(node) if node.load_complete => Ok(root),
            Some(_) => Err(UiError::NotReady { key: key.clone() }),
            None => Err(UiError::StaleReference { key: key.clone() }),
        }
    }

    // ===== close =====

    /// Close a root controller and its sub-windows.
    ///
    /// Closing twice is a no-op. Closing while loading is deferred until the
    /// in-flight load resolves; the load itself is never cancelled.
    pub fn close(&mut self, key: &ControllerKey) -> CloseOutcome {
        let Some(root) = self.registry.get(key) else {
            debug!(target: "ui::system", key = %key, "close ignored, controller not open");
            return CloseOutcome::NotOpen;
        };
        let Some(node) = self.tree.get_mut(root) else {
            return CloseOutcome::NotOpen;
        };
        if !node.load_complete {
            node.pending_close = true;
            debug!(target: "ui::system", key = %key, "close deferred until load completes");
            return CloseOutcome::Deferred;
        }

        self.close_tree(root);
        CloseOutcome::Closed
    }

    /// Close every controller of `category`. [`UiCategory::None`] is never
    /// closed in bulk.
    pub fn close_by_category(
        &mut self,
        category: UiCategory,
    ) -> Vec<(ControllerKey, CloseOutcome)> {
        if category == UiCategory::None {
            debug!(target: "ui::system", "bulk close of uncategorised controllers refused");
            return Vec::new();
        }
        let keys = self.registry.keys_in_category(category);
        self.close_keys(keys)
    }

    pub fn close_all(&mut self) -> Vec<(ControllerKey, CloseOutcome)> {
        let keys = self.registry.keys();
        self.close_keys(keys)
    }

    fn close_keys(&mut self, keys: Vec<ControllerKey>) -> Vec<(ControllerKey, CloseOutcome)> {
        keys.into_iter()
            .map(|key| {
                let outcome = self.close(&key);
                (key, outcome)
            })
            .collect()
    }

    /// Tear down a subtree, children first.
    fn close_tree(&mut self, root: NodeId) {
        let order = self.tree.post_order(root);
        for id in &order {
            if let Some(node) = self.tree.get_mut(*id) {
                node.state = ControllerState::Closing;
            }
        }

        for id in order {
            let Some(node) = self.tree.remove(id) else {
                continue;
            };
            let key = node.key();
            let sorting_order = node
                .window
                .and_then(|window| self.windows.remove(window))
                .map(|window| window.sorting_order);
            self.events.push(
                LifecycleEvent::Closed {
                    key: key.clone(),
                    sorting_order,
                }
                .into(),
            );

            if id == root {
                if let Some(threshold) = sorting_order {
                    self.allocator.release(root, threshold, &mut self.windows);
                }
                self.registry.remove(&key);
                let (arbiter, mut scene) = self.scene();
                arbiter.leave(root, &mut scene);
                info!(target: "ui::system", key = %key, ?sorting_order, "controller closed");
            }
        }
    }

    // ===== scene transitions =====

    /// Restart band allocation, then close every scene-bound controller.
    ///
    /// Band tracking is detached before anything closes, so survivors keep
    /// their orders. New bands start above the highest surviving window.
    pub fn begin_scene_change(&mut self) -> Vec<(ControllerKey, CloseOutcome)> {
        self.allocator.reset();
        self.windows.detach_band_tracking();

        let doomed: Vec<ControllerKey> = self
            .registry
            .created()
            .filter_map(|id| self.tree.get(id))
            .filter(|node| node.destroy_on_scene_change)
            .map(|node| node.key())
            .collect();
        let closed = self.close_keys(doomed);

        let top = self.max_sorting_order(false);
        self.allocator.resume_above(top);
        info!(
            target: "ui::system",
            closed = closed.len(),
            surviving = self.registry.len(),
            next_band = self.allocator.next_band(),
            "scene change started"
        );
        closed
    }

    /// Re-bind every window that renders through the UI camera.
    pub fn complete_scene_change(&mut self) {
        let rebound: Vec<WindowId> = self
            .windows
            .iter()
            .filter(|window| window.uses_ui_camera)
            .map(|window| window.id)
            .collect();
        for window in rebound {
            self.events
                .push(Notification::CameraRebound { window }.into());
        }
    }

    // ===== standalone windows =====

    /// Register a window that has no controller, at a fixed order.
    pub fn open_standalone(&mut self, raw: RawWindow, sorting_order: i32) -> WindowId {
        let id = self.windows.insert(raw, sorting_order, true);
        if let Some(window) = self.windows.get_mut(id) {
            window.show();
        }
        self.standalone.insert(id);
        id
    }

    /// Show a standalone full-screen window, hiding what sits below it.
    pub fn show_full_screen_window(&mut self, window: WindowId) -> Result<()> {
        self.require_standalone(window)?;
        if let Some(handle) = self.windows.get_mut(window) {
            handle.restore();
        }
        let (arbiter, mut scene) = self.scene();
        arbiter.show_full_screen_window(window, &mut scene);
        Ok(())
    }

    /// Hide a standalone window because a full-screen window covers it.
    pub fn occlude_window(&mut self, window: WindowId) -> Result<()> {
        self.require_standalone(window)?;
        let full_screen = self
            .windows
            .get(window)
            .is_some_and(|handle| handle.full_screen);
        let (arbiter, mut scene) = self.scene();
        arbiter.occlude_window(window, full_screen, &mut scene);
        Ok(())
    }

    pub fn close_standalone(&mut self, window: WindowId) -> Result<()> {
        self.require_standalone(window)?;
        let (arbiter, mut scene) = self.scene();
        arbiter.close_full_screen_window(window, &mut scene);
        self.windows.remove(window);
        self.standalone.remove(&window);
        Ok(())
    }

    fn require_standalone(&self, window: WindowId) -> Result<()> {
        if self.standalone.contains(&window) {
            Ok(())
        } else {
            Err(UiError::UnknownWindow { window })
        }
    }

    fn scene(&mut self) -> (&mut FullScreenArbiter, SceneView<'_>) {
        (
            &mut self.arbiter,
            SceneView {
                tree: &mut self.tree,
                windows: &mut self.windows,
                registry: &self.registry,
                events: &mut self.events,
            },
        )
    }
}

#[cfg(test)]
mod tests;
