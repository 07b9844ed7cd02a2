use std::path::PathBuf;

use crate::types::TabId;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failure to get an answer out of a tab.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("channel to {0} closed")]
    Closed(TabId),

    #[error("no response from {0} in time")]
    TimedOut(TabId),

    #[error("{0} is unreachable")]
    Unreachable(TabId),

    #[error("unexpected response from {tab}: {kind}")]
    UnexpectedResponse { tab: TabId, kind: String },
}

/// Media/PiP API rejections, named after the DOMException the browser raises.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("NotAllowedError: {0}")]
    NotAllowed(String),

    #[error("InvalidStateError: {0}")]
    InvalidState(String),

    #[error("AbortError: {0}")]
    Aborted(String),
}

impl MediaError {
    /// Missing user activation is the common reason a request is refused.
    pub fn is_gesture_required(&self) -> bool {
        matches!(self, MediaError::NotAllowed(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(String),
}
