//! Asynchronous abstraction for instantiating window resources.
//!
//! The window system decides *what* to load and when; a [`WindowLoader`]
//! turns a resource path into a window. Implementations may hit disk, the
//! network or an asset pipeline, and may take arbitrarily long.
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use ui_core::{LoadError, RawWindow, ResourcePath, WindowKind};

#[async_trait]
pub trait WindowLoader: Send + Sync {
    /// Instantiate the window behind `path`.
    ///
    /// Loads are never cancelled: the runtime always waits for the result,
    /// even if the controller was closed in the meantime.
    async fn load(&self, kind: &WindowKind, path: &ResourcePath)
    -> Result<RawWindow, LoadError>;
}

/// Loader backed by a fixed table, with optional artificial latency.
///
/// Unknown paths load as a plain [`RawWindow`]. Useful for tests, tools and
/// headless runs.
#[derive(Clone, Debug, Default)]
pub struct StaticLoader {
    windows: HashMap<ResourcePath, RawWindow>,
    missing: HashSet<ResourcePath>,
    latency: HashMap<ResourcePath, Duration>,
    default_latency: Duration,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(mut self, path: impl Into<String>, window: RawWindow) -> Self {
        self.windows.insert(ResourcePath::new(path), window);
        self
    }

    /// Loading `path` fails with [`LoadError::NotFound`].
    pub fn with_missing(mut self, path: impl Into<String>) -> Self {
        self.missing.insert(ResourcePath::new(path));
        self
    }

    /// Latency applied to every load without a specific one.
    pub fn with_default_latency(mut self, latency: Duration) -> Self {
        self.default_latency = latency;
        self
    }

    pub fn with_latency(mut self, path: impl Into<String>, latency: Duration) -> Self {
        self.latency.insert(ResourcePath::new(path), latency);
        self
    }
}

#[async_trait]
impl WindowLoader for StaticLoader {
    async fn load(
        &self,
        _kind: &WindowKind,
        path: &ResourcePath,
    ) -> Result<RawWindow, LoadError> {
        let latency = self
            .latency
            .get(path)
            .copied()
            .unwrap_or(self.default_latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.missing.contains(path) {
            return Err(LoadError::NotFound(path.clone()));
        }
        Ok(self.windows.get(path).copied().unwrap_or_default())
    }
}
