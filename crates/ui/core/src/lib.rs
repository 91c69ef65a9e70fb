//! Window and controller lifecycle for a layered UI.
//!
//! `ui-core` owns the deterministic part of the UI: which controllers are
//! open, which sorting order each window holds, and what a full-screen window
//! hides. It performs no I/O. Loading a window's resource is delegated to the
//! owner through [`LoadRequest`]s, and all observable changes are emitted as
//! [`UiEvent`]s. The `ui-runtime` crate drives [`WindowSystem`] from an async
//! worker.
pub mod arbiter;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod registry;
pub mod sorting;
pub mod system;
pub mod types;
pub mod window;

pub use arbiter::{FullScreenArbiter, OcclusionScene};
pub use catalog::{WindowBlueprint, WindowCatalog};
pub use config::LayoutConfig;
pub use controller::{ControllerNode, ControllerState, ControllerTree};
pub use error::{LoadError, Result, UiError};
pub use event::{LifecycleEvent, Notification, UiEvent};
pub use registry::ControllerRegistry;
pub use sorting::{BandRelease, Reservation, SortingOrderAllocator};
pub use system::{
    CloseOutcome, ControllerInfo, LoadProgress, LoadRequest, OpenOutcome, OpenResolution,
    WindowSystem,
};
pub use types::{
    ControllerKey, InstanceId, LoadTicket, NodeId, ResourcePath, UiCategory, WaiterId, WindowId,
    WindowKind, WindowOptions,
};
pub use window::{RawWindow, WindowHandle, WindowStore};
