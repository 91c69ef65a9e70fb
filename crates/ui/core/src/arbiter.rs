//! Full-screen occlusion arbitration.
//!
//! While a full-screen controller is showing, every root controller below it
//! is temporarily hidden, and camera culling plus gameplay pause are switched
//! on. Standalone full-screen windows (opened without a controller) take part
//! in the same arbitration.
//!
//! The arbiter owns only bookkeeping. Reading orders and toggling visibility
//! goes through [`OcclusionScene`], which the window system implements over
//! its arenas.
use crate::event::Notification;
use crate::types::{NodeId, WindowId};

/// View of the windows the arbiter hides and restores.
pub trait OcclusionScene {
    /// Current order of a root controller's window, `None` while it has none.
    fn controller_order(&self, node: NodeId) -> Option<i32>;

    /// Registered root controllers in creation order.
    fn live_controllers(&self) -> Vec<NodeId>;

    fn window_order(&self, window: WindowId) -> Option<i32>;

    fn hide_controller(&mut self, node: NodeId);

    fn restore_controller(&mut self, node: NodeId);

    fn hide_window(&mut self, window: WindowId);

    fn restore_window(&mut self, window: WindowId);

    fn notify(&mut self, notification: Notification);
}

#[derive(Debug, Default)]
pub struct FullScreenArbiter {
    /// Open full-screen controllers in the order they became full-screen.
    full_screen: Vec<NodeId>,
    /// Controllers hidden underneath a full-screen window.
    occluded_controllers: Vec<NodeId>,
    /// Standalone non-full-screen windows hidden underneath one.
    occluded_windows: Vec<WindowId>,
    /// Standalone full-screen windows covered by a higher full-screen window.
    hidden_full_screen_windows: Vec<WindowId>,
    /// Standalone full-screen window currently showing.
    last_full_screen_window: Option<WindowId>,
    culling: bool,
    paused: bool,
}

impl FullScreenArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_full_screen_open(&self) -> bool {
        !self.full_screen.is_empty() || self.last_full_screen_window.is_some()
    }

    pub fn is_culling(&self) -> bool {
        self.culling
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn full_screen_controllers(&self) -> &[NodeId] {
        &self.full_screen
    }

    pub fn is_occluded(&self, node: NodeId) -> bool {
        self.occluded_controllers.contains(&node)
    }

    /// Active full-screen controller: the lowest-ordered one still open.
    pub fn active(&self, scene: &impl OcclusionScene) -> Option<NodeId> {
        self.full_screen
            .iter()
            .filter_map(|node| scene.controller_order(*node).map(|order| (*node, order)))
            .min_by_key(|(_, order)| *order)
            .map(|(node, _)| node)
    }

    /// A full-screen controller finished opening.
    pub fn enter(&mut self, node: NodeId, scene: &mut impl OcclusionScene) {
        if !self.full_screen.contains(&node) {
            self.full_screen.push(node);
        }
        if let Some(order) = scene.controller_order(node) {
            self.hide_below(order, scene);
        }
        self.apply_effects(scene);
    }

    /// A controller is closing.
    ///
    /// Only the departure of a full-screen controller triggers arbitration; any
    /// other controller simply drops out of the hidden set.
    pub fn leave(&mut self, node: NodeId, scene: &mut impl OcclusionScene) {
        let was_full_screen = remove_item(&mut self.full_screen, &node);
        remove_item(&mut self.occluded_controllers, &node);

        if was_full_screen {
            self.settle(scene);
        }
    }

    /// Show a standalone full-screen window on top of what is open.
    pub fn show_full_screen_window(&mut self, window: WindowId, scene: &mut impl OcclusionScene) {
        if let Some(order) = scene.window_order(window) {
            self.hide_below(order, scene);
        }
        remove_item(&mut self.hidden_full_screen_windows, &window);
        self.last_full_screen_window = Some(window);
    }

    /// Hide a standalone window because something covers it.
    pub fn occlude_window(
        &mut self,
        window: WindowId,
        full_screen: bool,
        scene: &mut impl OcclusionScene,
    ) {
        let target = if full_screen {
            &mut self.hidden_full_screen_windows
        } else {
            &mut self.occluded_windows
        };
        if target.contains(&window) {
            return;
        }
        target.push(window);
        scene.hide_window(window);
    }

    /// A standalone window is closing.
    pub fn close_full_screen_window(&mut self, window: WindowId, scene: &mut impl OcclusionScene) {
        remove_item(&mut self.hidden_full_screen_windows, &window);
        remove_item(&mut self.occluded_windows, &window);
        if self.last_full_screen_window == Some(window) {
            self.last_full_screen_window = None;
        }
        self.settle(scene);
    }

    fn settle(&mut self, scene: &mut impl OcclusionScene) {
        if self.last_full_screen_window.is_some() {
            return;
        }
        if self.full_screen.is_empty() && self.hidden_full_screen_windows.is_empty() {
            self.restore_all(scene);
        } else {
            self.arbitrate(scene);
        }
    }

    fn hide_below(&mut self, order: i32, scene: &mut impl OcclusionScene) {
        if let Some(window) = self.last_full_screen_window
            && scene.window_order(window).is_some_and(|current| current < order)
        {
            scene.hide_window(window);
            if !self.hidden_full_screen_windows.contains(&window) {
                self.hidden_full_screen_windows.push(window);
            }
            self.last_full_screen_window = None;
        }

        for node in scene.live_controllers() {
            let below = scene
                .controller_order(node)
                .is_some_and(|current| current < order);
            if below && !self.occluded_controllers.contains(&node) {
                self.occluded_controllers.push(node);
                scene.hide_controller(node);
            }
        }
    }

    /// Pick what shows next when full-screen windows remain.
    ///
    /// The lowest remaining full-screen controller competes with the lowest
    /// hidden standalone full-screen window. The controller wins only with a
    /// strictly greater order; on a tie the window is restored.
    fn arbitrate(&mut self, scene: &mut impl OcclusionScene) {
        let controller = self
            .active(&*scene)
            .and_then(|node| scene.controller_order(node).map(|order| (node, order)));
        let window = self
            .hidden_full_screen_windows
            .iter()
            .filter_map(|window| scene.window_order(*window).map(|order| (*window, order)))
            .min_by_key(|(_, order)| *order);

        match (controller, window) {
            (Some((_, controller_order)), Some((_, window_order)))
                if controller_order > window_order =>
            {
                self.resume_controllers(scene)
            }
            (Some(_), None) => self.resume_controllers(scene),
            (_, Some((window, _))) => {
                remove_item(&mut self.hidden_full_screen_windows, &window);
                scene.restore_window(window);
                self.last_full_screen_window = Some(window);
                self.set_paused(false, scene);
            }
            (None, None) => self.restore_all(scene),
        }
    }

    /// Re-apply effects and uncover controllers no remaining full-screen
    /// controller sits above.
    fn resume_controllers(&mut self, scene: &mut impl OcclusionScene) {
        self.apply_effects(scene);

        let Some(top) = self
            .full_screen
            .iter()
            .filter_map(|node| scene.controller_order(*node))
            .max()
        else {
            return;
        };

        let (uncovered, still_hidden): (Vec<NodeId>, Vec<NodeId>) = self
            .occluded_controllers
            .iter()
            .copied()
            .partition(|node| scene.controller_order(*node).is_none_or(|order| order >= top));
        self.occluded_controllers = still_hidden;
        for node in uncovered {
            scene.restore_controller(node);
        }
    }

    fn restore_all(&mut self, scene: &mut impl OcclusionScene) {
        self.set_culling(false, scene);
        for node in std::mem::take(&mut self.occluded_controllers) {
            scene.restore_controller(node);
        }
        for window in std::mem::take(&mut self.occluded_windows) {
            scene.restore_window(window);
        }
        self.set_paused(false, scene);
    }

    fn apply_effects(&mut self, scene: &mut impl OcclusionScene) {
        self.set_culling(true, scene);
        self.set_paused(true, scene);
    }

    fn set_culling(&mut self, enabled: bool, scene: &mut impl OcclusionScene) {
        if self.culling != enabled {
            self.culling = enabled;
            scene.notify(Notification::CameraCulling { enabled });
        }
    }

    fn set_paused(&mut self, paused: bool, scene: &mut impl OcclusionScene) {
        if self.paused != paused {
            self.paused = paused;
            scene.notify(Notification::Pause { paused });
        }
    }
}

fn remove_item<T: PartialEq>(items: &mut Vec<T>, item: &T) -> bool {
    let before = items.len();
    items.retain(|existing| existing != item);
    items.len() != before
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;

    #[derive(Default)]
    struct FakeScene {
        controllers: BTreeMap<NodeId, i32>,
        windows: BTreeMap<WindowId, i32>,
        hidden_controllers: BTreeSet<NodeId>,
        hidden_windows: BTreeSet<WindowId>,
        notifications: Vec<Notification>,
    }

    impl FakeScene {
        fn controller(mut self, id: u64, order: i32) -> Self {
            self.controllers.insert(NodeId(id), order);
            self
        }

        fn window(mut self, id: u64, order: i32) -> Self {
            self.windows.insert(WindowId(id), order);
            self
        }

        fn controller_hidden(&self, id: u64) -> bool {
            self.hidden_controllers.contains(&NodeId(id))
        }

        fn window_hidden(&self, id: u64) -> bool {
            self.hidden_windows.contains(&WindowId(id))
        }
    }

    impl OcclusionScene for FakeScene {
        fn controller_order(&self, node: NodeId) -> Option<i32> {
            self.controllers.get(&node).copied()
        }

        fn live_controllers(&self) -> Vec<NodeId> {
            self.controllers.keys().copied().collect()
        }

        fn window_order(&self, window: WindowId) -> Option<i32> {
            self.windows.get(&window).copied()
        }

        fn hide_controller(&mut self, node: NodeId) {
            self.hidden_controllers.insert(node);
        }

        fn restore_controller(&mut self, node: NodeId) {
            self.hidden_controllers.remove(&node);
        }

        fn hide_window(&mut self, window: WindowId) {
            self.hidden_windows.insert(window);
        }

        fn restore_window(&mut self, window: WindowId) {
            self.hidden_windows.remove(&window);
        }

        fn notify(&mut self, notification: Notification) {
            self.notifications.push(notification);
        }
    }

    #[test]
    fn full_screen_hides_lower_windows_and_restores_on_close() {
        let mut scene = FakeScene::default().controller(1, 5).controller(2, 20);
        let mut arbiter = FullScreenArbiter::new();

        arbiter.enter(NodeId(2), &mut scene);
        assert!(scene.controller_hidden(1));
        assert!(!scene.controller_hidden(2));
        assert!(arbiter.is_culling() && arbiter.is_paused());

        scene.controllers.remove(&NodeId(2));
        arbiter.leave(NodeId(2), &mut scene);

        assert!(!scene.controller_hidden(1));
        assert!(!arbiter.is_full_screen_open());
        assert_eq!(
            scene.notifications,
            vec![
                Notification::CameraCulling { enabled: true },
                Notification::Pause { paused: true },
                Notification::CameraCulling { enabled: false },
                Notification::Pause { paused: false },
            ]
        );
    }

    #[test]
    fn stacked_full_screen_uncovers_the_one_below() {
        let mut scene = FakeScene::default()
            .controller(1, 1)
            .controller(2, 11)
            .controller(3, 21);
        let mut arbiter = FullScreenArbiter::new();

        arbiter.enter(NodeId(2), &mut scene);
        arbiter.enter(NodeId(3), &mut scene);
        assert!(scene.controller_hidden(1));
        assert!(scene.controller_hidden(2));

        scene.controllers.remove(&NodeId(3));
        arbiter.leave(NodeId(3), &mut scene);

        assert!(scene.controller_hidden(1));
        assert!(!scene.controller_hidden(2));
        assert!(arbiter.is_culling());
    }

    #[test]
    fn closing_plain_controller_only_drops_it_from_hidden_set() {
        let mut scene = FakeScene::default().controller(1, 1).controller(2, 11);
        let mut arbiter = FullScreenArbiter::new();
        arbiter.enter(NodeId(2), &mut scene);

        scene.controllers.remove(&NodeId(1));
        arbiter.leave(NodeId(1), &mut scene);

        assert!(!arbiter.is_occluded(NodeId(1)));
        assert!(arbiter.is_culling());
    }

    #[test]
    fn entering_twice_hides_each_window_once() {
        let mut scene = FakeScene::default().controller(1, 1).controller(2, 11);
        let mut arbiter = FullScreenArbiter::new();

        arbiter.enter(NodeId(2), &mut scene);
        arbiter.enter(NodeId(2), &mut scene);

        assert_eq!(arbiter.occluded_controllers, vec![NodeId(1)]);
        assert_eq!(arbiter.full_screen_controllers(), &[NodeId(2)]);
    }

    #[test]
    fn equal_orders_prefer_restoring_the_standalone_window() {
        let mut scene = FakeScene::default()
            .controller(1, 30)
            .controller(2, 40)
            .window(9, 30);
        let mut arbiter = FullScreenArbiter::new();

        arbiter.show_full_screen_window(WindowId(9), &mut scene);
        arbiter.enter(NodeId(1), &mut scene);
        arbiter.enter(NodeId(2), &mut scene);
        assert!(scene.window_hidden(9));

        scene.controllers.remove(&NodeId(2));
        arbiter.leave(NodeId(2), &mut scene);

        assert!(!scene.window_hidden(9));
        assert!(!arbiter.is_paused());
        assert!(arbiter.is_full_screen_open());
    }

    #[test]
    fn higher_controller_beats_hidden_window() {
        let mut scene = FakeScene::default()
            .controller(1, 31)
            .controller(2, 40)
            .window(9, 30);
        let mut arbiter = FullScreenArbiter::new();

        arbiter.show_full_screen_window(WindowId(9), &mut scene);
        arbiter.enter(NodeId(1), &mut scene);
        arbiter.enter(NodeId(2), &mut scene);

        scene.controllers.remove(&NodeId(2));
        arbiter.leave(NodeId(2), &mut scene);

        assert!(scene.window_hidden(9));
        assert!(!scene.controller_hidden(1));
        assert!(arbiter.is_paused());
    }

    #[test]
    fn closing_standalone_window_restores_occluded_windows() {
        let mut scene = FakeScene::default().window(4, 3).window(9, 50);
        let mut arbiter = FullScreenArbiter::new();

        arbiter.show_full_screen_window(WindowId(9), &mut scene);
        arbiter.occlude_window(WindowId(4), false, &mut scene);
        arbiter.occlude_window(WindowId(4), false, &mut scene);
        assert!(scene.window_hidden(4));

        scene.windows.remove(&WindowId(9));
        arbiter.close_full_screen_window(WindowId(9), &mut scene);

        assert!(!scene.window_hidden(4));
        assert!(!arbiter.is_full_screen_open());
    }
}
