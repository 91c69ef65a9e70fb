//! Cloneable façade for issuing commands to the runtime.
//!
//! [`UiHandle`] hides channel plumbing and offers async helpers for opening,
//! closing and querying controllers, or streaming events from specific topics.
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};

use ui_core::{
    CloseOutcome, ControllerInfo, ControllerKey, InstanceId, RawWindow, UiCategory, UiEvent,
    WindowId, WindowKind, WindowOptions,
};

use super::errors::{Result, RuntimeError};
use crate::events::{EventBus, Topic};
use crate::workers::{Command, UiStatus};

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct UiHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl UiHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Open a root controller and wait until its whole window tree is shown.
    ///
    /// Concurrent calls for the same kind and instance share one load and
    /// resolve together, in call order. Opening an already open controller
    /// resolves immediately.
    pub async fn open(&self, kind: impl Into<WindowKind>, instance: InstanceId) -> Result<ControllerInfo> {
        self.open_with(kind, instance, WindowOptions::empty()).await
    }

    pub async fn open_with(
        &self,
        kind: impl Into<WindowKind>,
        instance: InstanceId,
        options: WindowOptions,
    ) -> Result<ControllerInfo> {
        let kind = kind.into();
        self.request(|reply| Command::Open {
            kind,
            instance,
            options,
            reply,
        })
        .await?
    }

    /// Close a root controller and its sub-windows.
    pub async fn close(&self, key: ControllerKey) -> Result<CloseOutcome> {
        self.request(|reply| Command::Close { key, reply }).await
    }

    pub async fn close_category(
        &self,
        category: UiCategory,
    ) -> Result<Vec<(ControllerKey, CloseOutcome)>> {
        self.request(|reply| Command::CloseCategory { category, reply })
            .await
    }

    pub async fn close_all(&self) -> Result<Vec<(ControllerKey, CloseOutcome)>> {
        self.request(|reply| Command::CloseAll { reply }).await
    }

    pub async fn show(&self, key: ControllerKey) -> Result<()> {
        self.request(|reply| Command::Show { key, reply }).await?
    }

    pub async fn hide(&self, key: ControllerKey) -> Result<()> {
        self.request(|reply| Command::Hide { key, reply }).await?
    }

    pub async fn get(&self, key: ControllerKey) -> Result<Option<ControllerInfo>> {
        self.request(|reply| Command::Get { key, reply }).await
    }

    /// Whether the controller is currently shown to the user.
    pub async fn is_opened(&self, key: ControllerKey) -> Result<bool> {
        Ok(self.get(key).await?.is_some_and(|info| info.is_opened))
    }

    /// First live root controller, in creation order, matching `filter`.
    pub async fn find(
        &self,
        filter: impl Fn(&ControllerInfo) -> bool + Send + 'static,
    ) -> Result<Option<ControllerInfo>> {
        self.request(|reply| Command::Find {
            filter: Box::new(filter),
            reply,
        })
        .await
    }

    /// Snapshots of every live root controller in creation order.
    pub async fn snapshot(&self) -> Result<Vec<ControllerInfo>> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    pub async fn status(&self) -> Result<UiStatus> {
        self.request(|reply| Command::Status { reply }).await
    }

    /// Close scene-bound controllers and restart band allocation.
    pub async fn begin_scene_change(&self) -> Result<Vec<(ControllerKey, CloseOutcome)>> {
        self.request(|reply| Command::BeginSceneChange { reply })
            .await
    }

    pub async fn complete_scene_change(&self) -> Result<()> {
        self.request(|reply| Command::CompleteSceneChange { reply })
            .await
    }

    /// Register a window that has no controller, at a fixed order.
    pub async fn open_standalone(&self, window: RawWindow, sorting_order: i32) -> Result<WindowId> {
        self.request(|reply| Command::OpenStandalone {
            window,
            sorting_order,
            reply,
        })
        .await
    }

    pub async fn show_full_screen_window(&self, window: WindowId) -> Result<()> {
        self.request(|reply| Command::ShowFullScreenWindow { window, reply })
            .await?
    }

    pub async fn occlude_window(&self, window: WindowId) -> Result<()> {
        self.request(|reply| Command::OccludeWindow { window, reply })
            .await?
    }

    pub async fn close_standalone(&self, window: WindowId) -> Result<()> {
        self.request(|reply| Command::CloseStandalone { window, reply })
            .await?
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Lifecycle` - Opened, shown, hidden and closed controllers
    /// - `Topic::Notification` - Culling, pause, load delays, camera re-binds
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use ui_runtime::Topic;
    ///
    /// let mut lifecycle = handle.subscribe(Topic::Lifecycle);
    /// while let Ok(event) = lifecycle.recv().await {
    ///     // React to controllers opening and closing
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<UiEvent> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<UiEvent>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
