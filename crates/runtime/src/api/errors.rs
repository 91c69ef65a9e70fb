//! Unified error types surfaced by the runtime API.
//!
//! Wraps window-system failures and worker coordination failures so clients
//! can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use ui_core::UiError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Ui(#[from] UiError),

    #[error("ui worker command channel closed")]
    CommandChannelClosed,

    #[error("ui worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("ui worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a window catalog before building")]
    MissingCatalog,

    #[error("runtime requires a window loader before building")]
    MissingLoader,
}

impl RuntimeError {
    /// Window-system error behind this failure, if any.
    pub fn as_ui(&self) -> Option<&UiError> {
        match self {
            Self::Ui(error) => Some(error),
            _ => None,
        }
    }
}
