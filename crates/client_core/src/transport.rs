//! Duplex channel plumbing beneath the session.
//!
//! [`Connector`] and [`DuplexChannel`] are the seam between the session state machine and the
//! network. The production implementation is a WebSocket; tests plug in scripted channels.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use shared::protocol::{SERVICE_PATH, SERVICE_PORT};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{protocol::CloseFrame, Message},
    MaybeTlsStream, WebSocketStream,
};
use tracing::debug;
use url::Url;

use crate::error::SessionError;

const ABORT_GRACE: Duration = Duration::from_millis(250);

/// Where the simulator's dispatcher service lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl ServiceEndpoint {
    /// The simulator's fixed port and path on `host`.
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: SERVICE_PORT,
            path: SERVICE_PATH.to_string(),
        }
    }

    pub fn url(&self) -> Result<Url, SessionError> {
        let invalid = |reason: String| SessionError::Connect {
            url: format!("ws://{}:{}{}", self.host, self.port, self.path),
            reason,
        };
        let host = self.host.trim();
        if host.is_empty() {
            return Err(invalid("host must not be empty".to_string()));
        }
        // IPv6 literals need brackets in a url.
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]")
        } else {
            host.to_string()
        };
        let mut url = Url::parse("ws://localhost/").map_err(|err| invalid(err.to_string()))?;
        url.set_host(Some(&host))
            .map_err(|err| invalid(err.to_string()))?;
        url.set_port(Some(self.port))
            .map_err(|_| invalid("url cannot carry a port".to_string()))?;
        url.set_path(&self.path);
        Ok(url)
    }
}

/// One data frame as it came off the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

#[async_trait]
pub trait DuplexChannel: Send {
    async fn send_text(&mut self, text: String) -> Result<(), SessionError>;

    /// Waits for the next data frame. Control frames never surface here.
    async fn recv_frame(&mut self) -> Result<Frame, SessionError>;

    /// Tears the channel down immediately. Pending operations on it are abandoned.
    async fn abort(&mut self);
}

#[async_trait]
pub trait Connector: Send + Sync {
    type Channel: DuplexChannel;

    async fn open(&self, url: &Url) -> Result<Self::Channel, SessionError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

pub struct WsChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Connector for WsConnector {
    type Channel = WsChannel;

    async fn open(&self, url: &Url) -> Result<WsChannel, SessionError> {
        let (stream, _) = connect_async(url.as_str())
            .await
            .map_err(|err| SessionError::Connect {
                url: url.to_string(),
                reason: err.to_string(),
            })?;
        Ok(WsChannel { stream })
    }
}

#[async_trait]
impl DuplexChannel for WsChannel {
    async fn send_text(&mut self, text: String) -> Result<(), SessionError> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|err| SessionError::Channel(format!("websocket send failed: {err}")))
    }

    async fn recv_frame(&mut self) -> Result<Frame, SessionError> {
        while let Some(msg) = self.stream.next().await {
            match msg {
                Ok(Message::Text(text)) => return Ok(Frame::Text(text)),
                Ok(Message::Binary(bytes)) => return Ok(Frame::Binary(bytes)),
                Ok(Message::Close(frame)) => {
                    debug!(reason = ?frame.as_ref().map(|f| f.reason.to_string()), "websocket closed by peer");
                    return Err(SessionError::ChannelClosed);
                }
                Ok(_) => {}
                Err(err) => {
                    return Err(SessionError::Channel(format!(
                        "websocket receive failed: {err}"
                    )))
                }
            }
        }
        Err(SessionError::ChannelClosed)
    }

    async fn abort(&mut self) {
        let close = self.stream.close(None::<CloseFrame<'static>>);
        if tokio::time::timeout(ABORT_GRACE, close).await.is_err() {
            debug!("websocket close handshake abandoned");
        }
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
