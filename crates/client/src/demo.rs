//! Scripted walkthrough of the window system.
//!
//! Opens a HUD, an inventory with sub-windows (twice, concurrently), a
//! dialogue and a slow full-screen map, then closes things down through a
//! category close and a scene change. Every event is logged as it happens.

use anyhow::Result;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use ui_core::{ControllerInfo, ControllerKey, InstanceId, RawWindow, UiCategory, UiEvent};
use ui_runtime::{StaticLoader, Topic, UiHandle};

use crate::config::ClientConfig;

const WORLD_MAP: &str = "ui/map/world";
const SETTINGS: &str = "ui/system/settings";

/// Loader simulating asset latency; the world map is slow and full-screen.
pub fn demo_loader(config: &ClientConfig) -> StaticLoader {
    StaticLoader::new()
        .with_default_latency(config.load_latency)
        .with_window(WORLD_MAP, RawWindow::full_screen())
        .with_latency(WORLD_MAP, config.slow_load_latency)
        .with_window(SETTINGS, RawWindow::full_screen())
}

/// Log every published event until the runtime shuts down.
pub fn spawn_event_logger(handle: &UiHandle) -> JoinHandle<()> {
    let mut lifecycle = handle.subscribe(Topic::Lifecycle);
    let mut notifications = handle.subscribe(Topic::Notification);

    tokio::spawn(async move {
        let mut lifecycle_open = true;
        let mut notifications_open = true;
        while lifecycle_open || notifications_open {
            tokio::select! {
                event = lifecycle.recv(), if lifecycle_open => {
                    lifecycle_open = log_event(event, Topic::Lifecycle);
                }
                event = notifications.recv(), if notifications_open => {
                    notifications_open = log_event(event, Topic::Notification);
                }
            }
        }
    })
}

/// Returns `false` once the topic is closed.
fn log_event(event: Result<UiEvent, RecvError>, topic: Topic) -> bool {
    match event {
        Ok(UiEvent::Lifecycle(event)) => {
            info!(target: "ui::demo", key = %event.key(), ?event, "lifecycle");
            true
        }
        Ok(UiEvent::Notification(notification)) => {
            info!(target: "ui::demo", ?notification, "notification");
            true
        }
        Err(RecvError::Lagged(skipped)) => {
            warn!(target: "ui::demo", ?topic, skipped, "event logger lagged");
            true
        }
        Err(RecvError::Closed) => false,
    }
}

/// Run the walkthrough and return the controllers still open at the end.
pub async fn run_scenario(handle: &UiHandle) -> Result<Vec<ControllerInfo>> {
    let main = InstanceId(0);

    let hud = handle.open("hud", main).await?;
    info!(target: "ui::demo", key = %hud.key, order = ?hud.sorting_order, "hud ready");

    let (first, second) = tokio::join!(
        handle.open("inventory", main),
        handle.open("inventory", main)
    );
    let (first, second) = (first?, second?);
    info!(
        target: "ui::demo",
        shared = first.node == second.node,
        children = first.children.len(),
        "inventory opened by two concurrent requests"
    );

    handle.open("dialogue", main).await?;

    let map = handle.open("world_map", main).await?;
    let status = handle.status().await?;
    info!(
        target: "ui::demo",
        order = ?map.sorting_order,
        culling = status.culling,
        paused = status.paused,
        inventory_visible = handle.is_opened(ControllerKey::new("inventory", main)).await?,
        "world map covers the screen"
    );

    handle.close(map.key).await?;
    let closed = handle.close_category(UiCategory::Dialogue).await?;
    info!(target: "ui::demo", closed = closed.len(), "dialogues closed");

    let closed = handle.begin_scene_change().await?;
    info!(target: "ui::demo", closed = closed.len(), "scene change started");
    handle.complete_scene_change().await?;

    let snapshot = handle.snapshot().await?;
    info!(target: "ui::demo", open = snapshot.len(), "scenario finished");
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ui_content::ContentFactory;
    use ui_runtime::{UiConfig, UiRuntime};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn scenario_leaves_only_persistent_windows() {
        let config = ClientConfig::default();
        let factory = ContentFactory::new(&config.data_dir);
        let runtime = UiRuntime::builder()
            .config(UiConfig::default().with_load_delay_timeout(Duration::from_secs(1)))
            .catalog(factory.load_catalog().unwrap())
            .loader(demo_loader(&config))
            .build()
            .unwrap();
        let handle = runtime.handle();
        let logger = spawn_event_logger(&handle);

        let snapshot = run_scenario(&handle).await.unwrap();

        let keys: Vec<_> = snapshot.into_iter().map(|info| info.key).collect();
        assert_eq!(keys, vec![ControllerKey::new("hud", InstanceId(0))]);

        drop(handle);
        runtime.shutdown().await.unwrap();
        logger.await.unwrap();
    }
}
