//! Events emitted by the window system.
//!
//! The system never calls out while mutating state. It appends to an outbox
//! that the owner drains after each operation and forwards to subscribers.
use core::time::Duration;

use crate::types::{ControllerKey, WindowId};

/// Controller lifecycle notifications, in the order they happened.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LifecycleEvent {
    /// Controller finished loading, or an open request hit an existing one.
    Opened {
        key: ControllerKey,
        reopened: bool,
    },
    Shown {
        key: ControllerKey,
    },
    Hidden {
        key: ControllerKey,
    },
    /// Hidden underneath a full-screen window.
    HiddenByFullScreen {
        key: ControllerKey,
    },
    /// Uncovered after a full-screen window closed.
    ShownByFullScreen {
        key: ControllerKey,
    },
    /// Window released. Children always precede their parent.
    Closed {
        key: ControllerKey,
        sorting_order: Option<i32>,
    },
}

impl LifecycleEvent {
    pub fn key(&self) -> &ControllerKey {
        match self {
            Self::Opened { key, .. }
            | Self::Shown { key }
            | Self::Hidden { key }
            | Self::HiddenByFullScreen { key }
            | Self::ShownByFullScreen { key }
            | Self::Closed { key, .. } => key,
        }
    }
}

/// Fire-and-forget hooks for collaborators outside the window system.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Notification {
    /// Main camera culling toggled by full-screen windows.
    CameraCulling { enabled: bool },
    /// Gameplay pause toggled by full-screen windows.
    Pause { paused: bool },
    /// A window load is taking longer than the configured timeout.
    LoadDelayed {
        key: ControllerKey,
        elapsed: Duration,
    },
    /// "Please wait" indicator visibility.
    DelayIndicator { visible: bool },
    /// Window should re-bind to the UI camera after a scene change.
    CameraRebound { window: WindowId },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum UiEvent {
    Lifecycle(LifecycleEvent),
    Notification(Notification),
}

impl From<LifecycleEvent> for UiEvent {
    fn from(event: LifecycleEvent) -> Self {
        Self::Lifecycle(event)
    }
}

impl From<Notification> for UiEvent {
    fn from(notification: Notification) -> Self {
        Self::Notification(notification)
    }
}
