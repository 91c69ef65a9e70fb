//! Error types for the window system.
//!
//! Nothing here is fatal to the process: every failure degrades to "the window
//! doesn't open" (or "the call did nothing") while the rest of the UI tree
//! stays operable.

use thiserror::Error;

use crate::types::{ControllerKey, ResourcePath, WindowId, WindowKind};

pub type Result<T> = core::result::Result<T, UiError>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UiError {
    /// No resource registered for the kind, or the loader could not find it.
    #[error("window resource for {kind} not found{}", path_suffix(.path))]
    ResourceNotFound {
        kind: WindowKind,
        path: Option<ResourcePath>,
    },

    /// Two catalog entries map to the same kind; the first one is kept.
    #[error("window kind {kind} is already registered to {kept}")]
    DuplicateRegistration { kind: WindowKind, kept: ResourcePath },

    /// Operation on a controller that is closed or was never opened.
    #[error("controller {key} is not open")]
    StaleReference { key: ControllerKey },

    /// Standalone window id that is not (or no longer) live.
    #[error("window {window} is not a live standalone window")]
    UnknownWindow { window: WindowId },

    /// Show/hide requested before the controller finished loading.
    #[error("controller {key} is still loading")]
    NotReady { key: ControllerKey },

    /// Controller was closed while its window was still being created.
    #[error("controller {key} was closed before its window finished loading")]
    ClosedWhileLoading { key: ControllerKey },
}

impl UiError {
    /// Short label used as a structured log field.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceNotFound { .. } => "resource_not_found",
            Self::DuplicateRegistration { .. } => "duplicate_registration",
            Self::StaleReference { .. } => "stale_reference",
            Self::UnknownWindow { .. } => "unknown_window",
            Self::NotReady { .. } => "not_ready",
            Self::ClosedWhileLoading { .. } => "closed_while_loading",
        }
    }
}

fn path_suffix(path: &Option<ResourcePath>) -> String {
    match path {
        Some(path) => format!(" at {path}"),
        None => String::new(),
    }
}

/// Failure reported by a window loader.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("resource {0} does not exist")]
    NotFound(ResourcePath),

    #[error("resource {path} failed to instantiate: {reason}")]
    Failed { path: ResourcePath, reason: String },
}
