//! Worker tasks that back the runtime orchestration.

mod ui;

pub use ui::{Command, ControllerFilter, UiStatus, UiWorker};
