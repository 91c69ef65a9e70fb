//! Open requests, de-duplication and the load state machine.
use core::time::Duration;

use tracing::{debug, info, warn};

use super::{ControllerInfo, InFlight, PendingLoad, WindowSystem};
use crate::controller::ControllerState;
use crate::error::{LoadError, Result, UiError};
use crate::event::{LifecycleEvent, Notification};
use crate::types::{
    ControllerKey, InstanceId, LoadTicket, NodeId, ResourcePath, WaiterId, WindowKind,
    WindowOptions,
};
use crate::window::RawWindow;

/// Sub-window nesting deeper than this is ignored (guards against catalog
/// cycles such as a window listing itself as a child).
const MAX_TREE_DEPTH: usize = 8;

/// A window the owner must load and report back with
/// [`WindowSystem::complete_load`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    /// Root controller the load belongs to.
    pub key: ControllerKey,
    pub node: NodeId,
    pub kind: WindowKind,
    pub path: ResourcePath,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Already open; the caller is resolved right away.
    Ready(ControllerInfo),
    /// Same identity already loading; the waiter resolves with that load.
    Queued,
    /// New load started.
    Load(LoadRequest),
}

/// Every waiter of one identity, resolved together in request order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenResolution {
    pub key: ControllerKey,
    pub waiters: Vec<WaiterId>,
    pub result: Result<ControllerInfo>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadProgress {
    /// Subtree not finished; load this next.
    Next(LoadRequest),
    /// Open finished (successfully or not).
    Resolved(OpenResolution),
    /// Ticket unknown or already resolved.
    Stale,
}

impl WindowSystem {
    /// Request a controller; see [`OpenOutcome`] for the three paths.
    ///
    /// # Errors
    ///
    /// [`UiError::ResourceNotFound`] when the kind has no resource path. No
    /// controller is registered in that case.
    pub fn request_open(
        &mut self,
        kind: WindowKind,
        instance: InstanceId,
        options: WindowOptions,
        waiter: WaiterId,
    ) -> Result<OpenOutcome> {
        let key = ControllerKey::new(kind.clone(), instance);

        if let Some(root) = self.registry.get(&key) {
            let loaded = self.tree.get(root).is_some_and(|node| node.load_complete);
            if loaded {
                self.events.push(
                    LifecycleEvent::Opened {
                        key: key.clone(),
                        reopened: true,
                    }
                    .into(),
                );
                let info = self
                    .info(root)
                    .ok_or_else(|| UiError::StaleReference { key: key.clone() })?;
                return Ok(OpenOutcome::Ready(info));
            }
            if let Some(flight) = self.in_flight.get_mut(&key) {
                flight.waiters.push(waiter);
                debug!(
                    target: "ui::system",
                    key = %key,
                    waiting = flight.waiters.len(),
                    "joined in-flight open"
                );
                return Ok(OpenOutcome::Queued);
            }
        }

        let Some(path) = self.catalog.resolve_path(&kind).cloned() else {
            warn!(target: "ui::system", key = %key, "no window resource registered");
            return Err(UiError::ResourceNotFound { kind, path: None });
        };
        let Some(blueprint) = self.catalog.get(&kind).cloned() else {
            return Err(UiError::ResourceNotFound { kind, path: None });
        };

        let root = self.tree.create(
            kind,
            instance,
            None,
            blueprint.category,
            options,
            blueprint.destroy_on_scene_change,
        );
        self.build_children(root, &blueprint.children, 1);
        self.registry.register(&key, root, blueprint.category);
        self.in_flight.insert(
            key.clone(),
            InFlight {
                root,
                waiters: vec![waiter],
            },
        );

        info!(target: "ui::system", key = %key, path = %path, "open requested");
        Ok(OpenOutcome::Load(self.start_load(key, root, path)))
    }

    /// Report the outcome of a [`LoadRequest`].
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: core::result::Result<RawWindow, LoadError>,
    ) -> LoadProgress {
        let Some(pending) = self.loads.remove(&ticket) else {
            debug!(target: "ui::system", ticket = %ticket, "stale load completion ignored");
            return LoadProgress::Stale;
        };
        self.clear_delay(ticket);

        let Some(root) = self.in_flight.get(&pending.root_key).map(|flight| flight.root) else {
            return LoadProgress::Stale;
        };

        match result {
            Ok(raw) => self.attach_window(pending.node, root, raw),
            Err(error) if pending.node == root => {
                warn!(
                    target: "ui::system",
                    key = %pending.root_key,
                    error = %error,
                    "window load failed, open aborted"
                );
                return self.abort_open(pending.root_key, root, error);
            }
            Err(error) => {
                warn!(
                    target: "ui::system",
                    key = %pending.root_key,
                    node = %pending.node,
                    error = %error,
                    "sub-window load failed, skipped"
                );
                self.drop_subtree(pending.node);
            }
        }

        let pending_close = self.tree.get(root).is_some_and(|node| node.pending_close);
        if pending_close {
            return self.finish_deferred_close(pending.root_key, root);
        }

        match self.next_child_load(&pending.root_key, root) {
            Some(request) => LoadProgress::Next(request),
            None => self.finish_open(pending.root_key, root),
        }
    }

    /// Note that a load has outlived the delay timeout.
    ///
    /// Purely diagnostic: the load keeps running. Returns `false` if the
    /// ticket already resolved or was reported before.
    pub fn mark_delayed(&mut self, ticket: LoadTicket, elapsed: Duration) -> bool {
        let Some(pending) = self.loads.get(&ticket) else {
            return false;
        };
        if !self.delayed.insert(ticket) {
            return false;
        }

        warn!(
            target: "ui::system",
            key = %pending.root_key,
            elapsed_ms = elapsed.as_millis() as u64,
            "window load is taking unusually long"
        );
        self.events.push(
            Notification::LoadDelayed {
                key: pending.root_key.clone(),
                elapsed,
            }
            .into(),
        );
        if self.delayed.len() == 1 {
            self.events
                .push(Notification::DelayIndicator { visible: true }.into());
        }
        true
    }

    fn clear_delay(&mut self, ticket: LoadTicket) {
        if self.delayed.remove(&ticket) && self.delayed.is_empty() {
            self.events
                .push(Notification::DelayIndicator { visible: false }.into());
        }
    }

    fn build_children(&mut self, parent: NodeId, children: &[WindowKind], depth: usize) {
        if depth > MAX_TREE_DEPTH {
            warn!(target: "ui::system", parent = %parent, "sub-window nesting too deep, truncated");
            return;
        }
        let Some((instance, options, destroy_on_scene_change)) = self
            .tree
            .get(parent)
            .map(|node| (node.instance, node.options, node.destroy_on_scene_change))
        else {
            return;
        };

        for kind in children {
            let blueprint = self.catalog.get(kind).cloned();
            let child = self.tree.create(
                kind.clone(),
                instance,
                Some(parent),
                self.catalog.category(kind),
                options,
                destroy_on_scene_change,
            );
            if let Some(blueprint) = blueprint {
                self.build_children(child, &blueprint.children, depth + 1);
            }
        }
    }

    fn start_load(
        &mut self,
        root_key: ControllerKey,
        node: NodeId,
        path: ResourcePath,
    ) -> LoadRequest {
        let ticket = LoadTicket(self.tickets.next());
        let kind = match self.tree.get_mut(node) {
            Some(node) => {
                node.state = ControllerState::Loading;
                node.kind.clone()
            }
            None => root_key.kind.clone(),
        };
        self.loads.insert(
            ticket,
            PendingLoad {
                root_key: root_key.clone(),
                node,
            },
        );
        LoadRequest {
            ticket,
            key: root_key,
            node,
            kind,
            path,
        }
    }

    /// Give a freshly loaded window its order and attach it.
    ///
    /// Roots reserve a band; the k-th child of a parent sits at
    /// `parent_order + child_order_offset * k`.
    fn attach_window(&mut self, node_id: NodeId, root: NodeId, mut raw: RawWindow) {
        let pinned = self
            .tree
            .get(root)
            .is_some_and(|node| node.options.is_pinned());

        let sorting_order = if node_id == root {
            let child_count = self.tree.get(root).map_or(0, |node| node.child_count());
            self.allocator.assign(root, child_count, pinned)
        } else {
            raw.full_screen = false;
            let Some(parent) = self.tree.get(node_id).and_then(|node| node.parent) else {
                return;
            };
            let Some(parent_node) = self.tree.get(parent) else {
                return;
            };
            let parent_order = parent_node
                .window
                .and_then(|window| self.windows.sorting_order(window))
                .unwrap_or_default();
            let position = parent_node
                .children
                .iter()
                .position(|child| *child == node_id)
                .unwrap_or_default() as i32;
            parent_order + self.allocator.layout().child_order_offset * (position + 1)
        };

        let window = self.windows.insert(raw, sorting_order, pinned);
        if let Some(node) = self.tree.get_mut(node_id) {
            node.window = Some(window);
            node.state = ControllerState::Ready;
        }
        debug!(
            target: "ui::system",
            node = %node_id,
            window = %window,
            sorting_order,
            "window attached"
        );
    }

    /// Next unloaded node of the tree, parents before children.
    ///
    /// Sub-windows whose kind has no resource are dropped with a warning.
    fn next_child_load(&mut self, root_key: &ControllerKey, root: NodeId) -> Option<LoadRequest> {
        loop {
            let next = self
                .tree
                .pre_order(root)
                .into_iter()
                .find(|id| {
                    self.tree
                        .get(*id)
                        .is_some_and(|node| node.state == ControllerState::Created)
                })?;
            let kind = self.tree.get(next)?.kind.clone();
            match self.catalog.resolve_path(&kind).cloned() {
                Some(path) => return Some(self.start_load(root_key.clone(), next, path)),
                None => {
                    warn!(
                        target: "ui::system",
                        key = %root_key,
                        kind = %kind,
                        "no resource for sub-window, skipped"
                    );
                    self.drop_subtree(next);
                }
            }
        }
    }

    /// Everything loaded: show the tree and resolve its waiters.
    fn finish_open(&mut self, key: ControllerKey, root: NodeId) -> LoadProgress {
        for id in self.tree.pre_order(root) {
            let Some(node) = self.tree.get_mut(id) else {
                continue;
            };
            node.load_complete = true;
            node.state = ControllerState::Open;
            node.is_opened = true;
            let node_key = node.key();
            if let Some(window) = node.window.and_then(|window| self.windows.get_mut(window)) {
                window.show();
            }
            self.events.push(
                LifecycleEvent::Opened {
                    key: node_key,
                    reopened: false,
                }
                .into(),
            );
        }

        let full_screen = self
            .tree
            .get(root)
            .and_then(|node| node.window)
            .and_then(|window| self.windows.get(window))
            .is_some_and(|window| window.full_screen);
        if full_screen {
            let (arbiter, mut scene) = self.scene();
            arbiter.enter(root, &mut scene);
        }

        let waiters = self.take_waiters(&key);
        info!(target: "ui::system", key = %key, waiters = waiters.len(), "controller opened");
        let result = self
            .info(root)
            .ok_or_else(|| UiError::StaleReference { key: key.clone() });
        LoadProgress::Resolved(OpenResolution {
            key,
            waiters,
            result,
        })
    }

    fn finish_deferred_close(&mut self, key: ControllerKey, root: NodeId) -> LoadProgress {
        let waiters = self.take_waiters(&key);
        if let Some(node) = self.tree.get_mut(root) {
            node.load_complete = true;
        }
        self.close_tree(root);
        info!(target: "ui::system", key = %key, "deferred close applied after load");
        LoadProgress::Resolved(OpenResolution {
            key: key.clone(),
            waiters,
            result: Err(UiError::ClosedWhileLoading { key }),
        })
    }

    fn abort_open(&mut self, key: ControllerKey, root: NodeId, error: LoadError) -> LoadProgress {
        let waiters = self.take_waiters(&key);
        self.drop_subtree(root);
        self.registry.remove(&key);
        let path = match error {
            LoadError::NotFound(path) | LoadError::Failed { path, .. } => path,
        };
        LoadProgress::Resolved(OpenResolution {
            key: key.clone(),
            waiters,
            result: Err(UiError::ResourceNotFound {
                kind: key.kind,
                path: Some(path),
            }),
        })
    }

    fn take_waiters(&mut self, key: &ControllerKey) -> Vec<WaiterId> {
        self.in_flight
            .remove(key)
            .map(|flight| flight.waiters)
            .unwrap_or_default()
    }

    /// Remove an unopened subtree. Windows already attached are released.
    fn drop_subtree(&mut self, id: NodeId) {
        for node in self.tree.post_order(id) {
            if let Some(window) = self.tree.remove(node).and_then(|node| node.window) {
                self.windows.remove(window);
            }
        }
    }
}
