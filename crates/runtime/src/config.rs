//! Runtime configuration.

use std::env;
use std::time::Duration;

use ui_core::LayoutConfig;

/// Runtime configuration shared across the orchestrator and the worker.
#[derive(Debug, Clone)]
pub struct UiConfig {
    pub layout: LayoutConfig,
    /// A load running longer than this is reported as delayed.
    pub load_delay_timeout: Duration,
    pub command_buffer_size: usize,
    pub event_buffer_size: usize,
}

impl UiConfig {
    pub const DEFAULT_LOAD_DELAY_TIMEOUT: Duration = Duration::from_secs(5);

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `UI_LOAD_DELAY_MS` - Delay diagnostic timeout (default: 5000)
    /// - `UI_COMMAND_BUFFER` - Worker command queue size (default: 32)
    /// - `UI_EVENT_BUFFER` - Per-topic event buffer (default: 100)
    /// - `UI_BAND_INCREMENT` - Width added to every band (default: 10)
    /// - `UI_CHILD_ORDER_OFFSET` - Step between sub-windows (default: 1)
    /// - `UI_PINNED_ORDER` - Order of pinned windows (default: 1000)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_env::<u64>("UI_LOAD_DELAY_MS") {
            config.load_delay_timeout = Duration::from_millis(ms.max(1));
        }
        if let Some(capacity) = read_env::<usize>("UI_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("UI_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        config.layout = layout_overrides(config.layout, |key| env::var(key).ok());

        config
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Take `base` (usually a layout file) as the layout, with the `UI_*`
    /// layout variables still applied on top.
    pub fn with_base_layout(mut self, base: LayoutConfig) -> Self {
        self.layout = layout_overrides(base, |key| env::var(key).ok());
        self
    }

    pub fn with_load_delay_timeout(mut self, timeout: Duration) -> Self {
        self.load_delay_timeout = timeout;
        self
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            load_delay_timeout: Self::DEFAULT_LOAD_DELAY_TIMEOUT,
            command_buffer_size: 32,
            event_buffer_size: 100,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn layout_overrides(
    mut layout: LayoutConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> LayoutConfig {
    let read = |key: &str| lookup(key).and_then(|value| value.parse::<i32>().ok());

    if let Some(increment) = read("UI_BAND_INCREMENT") {
        layout.band_increment = increment.max(1);
    }
    if let Some(offset) = read("UI_CHILD_ORDER_OFFSET") {
        layout.child_order_offset = offset.max(1);
    }
    if let Some(order) = read("UI_PINNED_ORDER") {
        layout.pinned_order = order;
    }
    layout
}
