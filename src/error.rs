/*
 * Error taxonomy for the window core. Creation failures roll the registry back
 * before an error is returned; misrouted events are never errors (they are
 * logged and dropped by the router), so everything here describes a request
 * the core refused or a native call that failed.
 */
use crate::types::{ResourceId, WindowId};

#[derive(thiserror::Error, Debug)]
pub enum PlatformError {
    #[error("Platform initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Native window creation failed: {0}")]
    WindowCreationFailed(String),

    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    #[error("Native handle {0:#x} is already attached to a live window")]
    DuplicateNativeHandle(u64),

    #[error("No frame window exists")]
    NoFrameWindow,

    #[error("A frame window already exists ({0:?})")]
    FrameAlreadyExists(WindowId),

    #[error("A client window already exists ({0:?})")]
    ClientAlreadyExists(WindowId),

    #[error("Cannot create a document window: the frame has no client window")]
    NoClientWindow,

    #[error("PopModal called with an empty modal stack")]
    ModalStackEmpty,

    #[error("No modal loop is running")]
    NoModalLoop,

    #[error("Modal dialog {0:?} was destroyed before its loop was exited")]
    ModalDialogDestroyed(WindowId),

    #[error("Event pump re-entered from a {0} handler")]
    ReentrantPump(String),

    #[error("Resource {0:?} not found")]
    ResourceNotFound(ResourceId),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

pub type Result<T> = std::result::Result<T, PlatformError>;

#[cfg(target_os = "windows")]
impl From<windows::core::Error> for PlatformError {
    fn from(err: windows::core::Error) -> Self {
        PlatformError::OperationFailed(format!("Win32 error: {err:?}"))
    }
}
