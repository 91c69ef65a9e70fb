//! Demo client for the window system.
//!
//! This crate is the composition root: it loads the window catalog from data
//! files, builds a [`ui_runtime::UiRuntime`] around a simulated loader, and
//! walks through a scripted scenario while logging every event.

pub mod config;
pub mod demo;
pub mod logging;

pub use config::ClientConfig;
