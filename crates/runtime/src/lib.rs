//! Async runtime around the window system.
//!
//! This crate wires the synchronous [`ui_core::WindowSystem`] to an async
//! world: window resources load concurrently through a [`WindowLoader`],
//! slow loads are reported after a configurable timeout, and every event is
//! published on a topic-based bus. Consumers embed [`UiRuntime`] and talk to
//! it through the cloneable [`UiHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`config`] reads runtime settings from the environment
//! - `workers` keeps the background task internal to the crate
pub mod api;
pub mod config;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, StaticLoader, UiHandle, WindowLoader};
pub use config::UiConfig;
pub use events::{EventBus, Topic};
pub use runtime::{UiRuntime, UiRuntimeBuilder};
pub use workers::UiStatus;
