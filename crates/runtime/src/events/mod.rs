//! Topic-based event bus for window-system events.
//!
//! The worker drains [`ui_core::UiEvent`]s after every operation and publishes
//! them here; consumers subscribe only to the topics they need.

mod bus;

pub use bus::{EventBus, Topic};
