//! High-level runtime orchestrator.
//!
//! The runtime owns the UI worker, wires up command/event channels, and
//! exposes a builder-based API for clients to drive the window system.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use ui_core::{WindowCatalog, WindowSystem};

use crate::api::{Result, RuntimeError, UiHandle, WindowLoader};
use crate::config::UiConfig;
use crate::events::EventBus;
use crate::workers::{Command, UiWorker};

/// Main runtime that owns the window system.
///
/// [`UiHandle`] provides a cloneable façade for clients; the runtime itself
/// only keeps the worker alive and shuts it down.
pub struct UiRuntime {
    handle: UiHandle,
    worker_handle: JoinHandle<()>,
}

impl UiRuntime {
    /// Create a new runtime builder
    pub fn builder() -> UiRuntimeBuilder {
        UiRuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> UiHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker stops once every outstanding [`UiHandle`] clone is dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`UiRuntime`] with flexible configuration.
pub struct UiRuntimeBuilder {
    config: UiConfig,
    catalog: Option<WindowCatalog>,
    loader: Option<Arc<dyn WindowLoader>>,
}

impl UiRuntimeBuilder {
    fn new() -> Self {
        Self {
            config: UiConfig::default(),
            catalog: None,
            loader: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: UiConfig) -> Self {
        self.config = config;
        self
    }

    /// Set required window catalog
    pub fn catalog(mut self, catalog: WindowCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set required window loader
    pub fn loader(mut self, loader: impl WindowLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Build the runtime and spawn its worker.
    ///
    /// Must be called inside a tokio runtime.
    pub fn build(self) -> Result<UiRuntime> {
        let catalog = self.catalog.ok_or(RuntimeError::MissingCatalog)?;
        let loader = self.loader.ok_or(RuntimeError::MissingLoader)?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = UiHandle::new(command_tx, event_bus.clone());

        let system = WindowSystem::new(catalog, self.config.layout.clone());
        let worker = UiWorker::new(
            system,
            loader,
            command_rx,
            event_bus,
            self.config.load_delay_timeout,
        );
        let worker_handle = tokio::spawn(worker.run());

        Ok(UiRuntime {
            handle,
            worker_handle,
        })
    }
}
