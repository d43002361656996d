//! The dispatcher session state machine.
//!
//! ```text
//! Idle -> Connecting -> AwaitingPermission -> Streaming
//!   \__________\_______________\_________________\__> Closed(reason)
//! ```
//!
//! Exactly one operation is outstanding at a time: callers drive the session through
//! [`TransportSession::connect`] and then [`TransportSession::receive_message`] in a loop.
//! Any failure closes the session for good and releases the channel.

use std::fmt;

use shared::{
    error::DecodeError,
    protocol::{
        decode_binary_frame, decode_frame, dispatcher_connected_frame, InboundMessage,
        MessageKind, SimulationState, TrainData,
    },
};
use tracing::{debug, info, warn};

use crate::{
    cancel::CancelSignal,
    error::{ErrorKind, SessionError},
    permission,
    transport::{Connector, DuplexChannel, Frame, ServiceEndpoint, WsConnector},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// A transport, protocol or decode failure.
    Error,
    NoPermission,
    Cancelled,
    /// Closed on request by the owner via [`TransportSession::disconnect`].
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    AwaitingPermission,
    Streaming,
    Closed(CloseReason),
}

impl SessionState {
    pub fn is_closed(self) -> bool {
        matches!(self, SessionState::Closed(_))
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => f.write_str("idle"),
            SessionState::Connecting => f.write_str("connecting"),
            SessionState::AwaitingPermission => f.write_str("awaiting permission"),
            SessionState::Streaming => f.write_str("streaming"),
            SessionState::Closed(reason) => write!(f, "closed ({reason:?})"),
        }
    }
}

/// A message the session hands to its consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionMessage {
    Heartbeat(SimulationState),
    TrainUpdate(TrainData),
}

pub struct TransportSession<C: Connector = WsConnector> {
    connector: C,
    channel: Option<C::Channel>,
    state: SessionState,
    cancel: CancelSignal,
    last_message: Option<SessionMessage>,
}

impl TransportSession<WsConnector> {
    pub fn new(cancel: CancelSignal) -> Self {
        Self::with_connector(WsConnector, cancel)
    }
}

impl<C: Connector> TransportSession<C> {
    pub fn with_connector(connector: C, cancel: CancelSignal) -> Self {
        Self {
            connector,
            channel: None,
            state: SessionState::Idle,
            cancel,
            last_message: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The message returned by the latest successful [`Self::receive_message`] call.
    ///
    /// Cleared as soon as the next receive starts.
    pub fn last_message(&self) -> Option<&SessionMessage> {
        self.last_message.as_ref()
    }

    /// Opens the channel, sends the handshake and waits for the initial permission.
    ///
    /// Only valid from [`SessionState::Idle`]. On success the session is streaming.
    pub async fn connect(&mut self, endpoint: &ServiceEndpoint) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::InvalidState {
                operation: "connect",
                state: self.state,
            });
        }

        self.state = SessionState::Connecting;
        match self.handshake(endpoint).await {
            Ok(()) => {
                self.state = SessionState::Streaming;
                info!(host = %endpoint.host, port = endpoint.port, "dispatcher session streaming");
                Ok(())
            }
            Err(err) => {
                self.fail(&err).await;
                Err(err)
            }
        }
    }

    /// Waits for the next heartbeat or train update.
    ///
    /// Permission updates are checked and swallowed; discarded kinds are skipped. Any error
    /// ends the session.
    ///
    /// Cancel safe: dropping the future while it waits for a frame loses nothing.
    pub async fn receive_message(&mut self) -> Result<SessionMessage, SessionError> {
        if self.state != SessionState::Streaming {
            return Err(SessionError::InvalidState {
                operation: "receive",
                state: self.state,
            });
        }

        match self.next_message().await {
            Ok(message) => {
                self.last_message = Some(message.clone());
                Ok(message)
            }
            Err(err) => {
                self.fail(&err).await;
                Err(err)
            }
        }
    }

    /// Closes a live session. A no-op once closed.
    pub async fn disconnect(&mut self) {
        if !self.state.is_closed() {
            self.close(CloseReason::Disconnected).await;
        }
    }

    async fn handshake(&mut self, endpoint: &ServiceEndpoint) -> Result<(), SessionError> {
        let url = endpoint.url()?;
        info!(%url, "connecting to simulator");
        let opened = self.cancel.guard(self.connector.open(&url)).await?;
        let channel = self.channel.insert(opened);

        let hello = dispatcher_connected_frame()?;
        self.cancel.guard(channel.send_text(hello)).await?;
        self.state = SessionState::AwaitingPermission;

        let frame = self.cancel.guard(channel.recv_frame()).await?;
        match decode(frame)? {
            InboundMessage::PermissionUpdate(update) => permission::check(&update),
            other => Err(SessionError::UnexpectedMessage {
                expected: MessageKind::PermissionUpdate,
                received: other.kind(),
            }),
        }
    }

    async fn next_message(&mut self) -> Result<SessionMessage, SessionError> {
        loop {
            self.last_message = None;
            let channel = self.channel.as_mut().ok_or(SessionError::ChannelClosed)?;
            let frame = self.cancel.guard(channel.recv_frame()).await?;
            match decode(frame)? {
                InboundMessage::SimulationState(state) => {
                    return Ok(SessionMessage::Heartbeat(state))
                }
                InboundMessage::TrainData(train) => return Ok(SessionMessage::TrainUpdate(train)),
                InboundMessage::PermissionUpdate(update) => permission::check(&update)?,
                InboundMessage::Ignored(kind) => debug!(%kind, "discarding message"),
            }
        }
    }

    async fn fail(&mut self, err: &SessionError) {
        let reason = match err.kind() {
            ErrorKind::Transport => {
                warn!(error = %err, state = %self.state, "dispatcher session failed");
                CloseReason::Error
            }
            ErrorKind::PermissionDenied => CloseReason::NoPermission,
            ErrorKind::Cancelled => {
                info!(state = %self.state, "dispatcher session cancelled");
                CloseReason::Cancelled
            }
        };
        self.close(reason).await;
    }

    async fn close(&mut self, reason: CloseReason) {
        self.last_message = None;
        if let Some(mut channel) = self.channel.take() {
            channel.abort().await;
        }
        self.state = SessionState::Closed(reason);
        debug!(?reason, "dispatcher session closed");
    }
}

fn decode(frame: Frame) -> Result<InboundMessage, DecodeError> {
    match frame {
        Frame::Text(text) => decode_frame(&text),
        Frame::Binary(bytes) => decode_binary_frame(&bytes),
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
