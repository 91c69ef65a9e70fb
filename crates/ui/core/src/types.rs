//! Identity and tag types shared across the window system.
//!
//! Controllers are identified by a [`WindowKind`] tag plus an [`InstanceId`].
//! Internal arena handles ([`NodeId`], [`WindowId`]) never leave the process and
//! are only meaningful for the [`crate::WindowSystem`] that issued them.
use core::fmt;

use bitflags::bitflags;

/// Logical window kind, registered once in the [`crate::WindowCatalog`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WindowKind(String);

impl WindowKind {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowKind {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Caller-chosen instance number; several instances of one kind may be open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceId(pub i32);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry identity of a root controller.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerKey {
    pub kind: WindowKind,
    pub instance: InstanceId,
}

impl ControllerKey {
    pub fn new(kind: impl Into<WindowKind>, instance: InstanceId) -> Self {
        Self {
            kind: kind.into(),
            instance,
        }
    }
}

impl fmt::Display for ControllerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.instance)
    }
}

/// Resource identifier handed to the window loader.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ResourcePath(String);

impl ResourcePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

arena_id!(
    /// Handle of a controller node in the [`crate::ControllerTree`].
    NodeId
);
arena_id!(
    /// Handle of a window in the [`crate::WindowStore`].
    WindowId
);
arena_id!(
    /// Identifies one pending open request so its result can be routed back.
    WaiterId
);
arena_id!(
    /// Identifies one outstanding window load.
    LoadTicket
);

/// Bulk-close category of a window kind.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum UiCategory {
    /// Never closed in bulk.
    #[default]
    None,
    Dialogue,
    Popup,
    Hud,
}

bitflags! {
    /// Options requested when opening a controller.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct WindowOptions: u8 {
        /// Window is pinned at the reserved order and never shifted.
        const KEEP_SORTING_ORDER = 1 << 0;
    }
}

impl WindowOptions {
    pub const fn is_pinned(&self) -> bool {
        self.contains(Self::KEEP_SORTING_ORDER)
    }
}

/// Monotonic id source for the arenas.
#[derive(Debug, Default)]
pub(crate) struct IdSequence(u64);

impl IdSequence {
    pub(crate) fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}
