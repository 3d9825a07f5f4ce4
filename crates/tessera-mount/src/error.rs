//! Error types for the mount engine.

use thiserror::Error;

/// Result type for mount operations.
pub type MountResult<T> = Result<T, MountError>;

/// Errors that abort a mount. Other mounts are unaffected.
#[derive(Debug, Error)]
pub enum MountError {
    /// No container element was given.
    #[error("no container element to mount into")]
    MissingContainer,

    /// The container is not attached to the document.
    #[error("the container element is not attached to the document")]
    DetachedContainer,

    /// The runtime rejected the module.
    #[error("runtime failed to instantiate the module: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Failure reported by a [`ReactiveRuntime`](crate::ReactiveRuntime).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RuntimeError {
    pub message: String,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
