use shared::{
    error::{DecodeError, EncodeError},
    protocol::MessageKind,
};
use thiserror::Error;

use crate::session::SessionState;

/// How a caller should react to a failed session operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network, channel or protocol failure. Present the message to the user.
    Transport,
    /// The dispatcher's rights were rescinded by the simulator.
    PermissionDenied,
    /// The caller asked for the operation to stop. Not an error from the user's point of view.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },
    #[error("channel failure: {0}")]
    Channel(String),
    #[error("channel closed by the simulator")]
    ChannelClosed,
    #[error("protocol error: {0}")]
    Protocol(#[from] DecodeError),
    #[error("expected {expected} but received {received}")]
    UnexpectedMessage {
        expected: MessageKind,
        received: MessageKind,
    },
    #[error("dispatcher permission was rescinded")]
    PermissionDenied,
    #[error("operation cancelled")]
    Cancelled,
    #[error("failed to encode outgoing frame: {0}")]
    Encode(#[from] EncodeError),
    #[error("cannot {operation} while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::PermissionDenied => ErrorKind::PermissionDenied,
            SessionError::Cancelled => ErrorKind::Cancelled,
            SessionError::Connect { .. }
            | SessionError::Channel(_)
            | SessionError::ChannelClosed
            | SessionError::Protocol(_)
            | SessionError::UnexpectedMessage { .. }
            | SessionError::Encode(_)
            | SessionError::InvalidState { .. } => ErrorKind::Transport,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }
}
