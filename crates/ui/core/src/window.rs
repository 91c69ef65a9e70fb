//! Window handles and the arena that owns them.
//!
//! A window has two independent visibility bits: `hidden` is what its owner
//! asked for through show/hide, `occluded` is set while a full-screen window
//! covers it. It is rendered only when neither is set, and clearing the
//! occlusion restores whatever the owner last asked for.
use std::collections::BTreeMap;

use crate::types::{IdSequence, WindowId};

/// What the loader hands back for a resource path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawWindow {
    /// Window covers the whole screen when shown.
    pub full_screen: bool,
    /// Window renders through the UI camera (re-bound after scene changes).
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub uses_ui_camera: bool,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

impl RawWindow {
    pub const fn new() -> Self {
        Self {
            full_screen: false,
            uses_ui_camera: true,
        }
    }

    pub const fn full_screen() -> Self {
        Self {
            full_screen: true,
            uses_ui_camera: true,
        }
    }
}

impl Default for RawWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// A live window instance.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WindowHandle {
    pub id: WindowId,
    pub sorting_order: i32,
    pub pinned: bool,
    pub full_screen: bool,
    pub uses_ui_camera: bool,
    hidden: bool,
    occluded: bool,
    tracks_band_release: bool,
}

impl WindowHandle {
    /// Windows are created hidden; their owner shows them once loaded.
    fn new(id: WindowId, raw: RawWindow, sorting_order: i32, pinned: bool) -> Self {
        Self {
            id,
            sorting_order,
            pinned,
            full_screen: raw.full_screen,
            uses_ui_camera: raw.uses_ui_camera,
            hidden: true,
            occluded: false,
            tracks_band_release: !pinned,
        }
    }

    /// Owner-requested visibility, ignoring occlusion.
    pub fn is_open(&self) -> bool {
        !self.hidden
    }

    /// Actually rendered.
    pub fn is_visible(&self) -> bool {
        !self.hidden && !self.occluded
    }

    pub fn is_occluded(&self) -> bool {
        self.occluded
    }

    pub fn show(&mut self) {
        self.hidden = false;
    }

    pub fn hide(&mut self) {
        self.hidden = true;
    }

    /// Hide underneath a full-screen window, keeping the owner's visibility.
    pub fn occlude(&mut self) {
        self.occluded = true;
    }

    /// Return to the owner's last requested visibility.
    pub fn restore(&mut self) {
        self.occluded = false;
    }

    /// Reaction to a band release broadcast.
    ///
    /// Only windows strictly above the released threshold move, so the window
    /// that just gave up its band never shifts onto itself.
    pub fn on_band_released(&mut self, threshold: i32, amount: i32) -> bool {
        if self.tracks_band_release && self.sorting_order > threshold {
            self.sorting_order -= amount;
            true
        } else {
            false
        }
    }
}

/// Arena of all live windows, controller-owned and standalone alike.
#[derive(Debug, Default)]
pub struct WindowStore {
    windows: BTreeMap<WindowId, WindowHandle>,
    ids: IdSequence,
}

impl WindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, raw: RawWindow, sorting_order: i32, pinned: bool) -> WindowId {
        let id = WindowId(self.ids.next());
        self.windows
            .insert(id, WindowHandle::new(id, raw, sorting_order, pinned));
        id
    }

    pub fn get(&self, id: WindowId) -> Option<&WindowHandle> {
        self.windows.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut WindowHandle> {
        self.windows.get_mut(&id)
    }

    pub fn remove(&mut self, id: WindowId) -> Option<WindowHandle> {
        self.windows.remove(&id)
    }

    pub fn sorting_order(&self, id: WindowId) -> Option<i32> {
        self.windows.get(&id).map(|window| window.sorting_order)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindowHandle> {
        self.windows.values()
    }

    /// Broadcast a band release to every live window; returns how many moved.
    pub fn broadcast_band_release(&mut self, threshold: i32, amount: i32) -> usize {
        self.windows
            .values_mut()
            .map(|window| window.on_band_released(threshold, amount))
            .filter(|moved| *moved)
            .count()
    }

    /// Stop every current window from reacting to future band releases.
    pub fn detach_band_tracking(&mut self) {
        for window in self.windows.values_mut() {
            window.tracks_band_release = false;
        }
    }

    pub fn max_sorting_order(&self, include_pinned: bool) -> Option<i32> {
        self.windows
            .values()
            .filter(|window| include_pinned || !window.pinned)
            .map(|window| window.sorting_order)
            .max()
    }
}
