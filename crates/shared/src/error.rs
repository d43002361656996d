use thiserror::Error;

use crate::protocol::MessageKind;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not a valid envelope: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error("action {0:?} is not in the message catalog")]
    UnknownAction(String),
    #[error("{kind} message has no body")]
    MissingBody { kind: MessageKind },
    #[error("{kind} message has a malformed body: {source}")]
    Body {
        kind: MessageKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("binary frame is not valid UTF-8")]
    NotUtf8,
}

#[derive(Debug, Error)]
#[error("failed to encode {kind} frame: {source}")]
pub struct EncodeError {
    pub kind: MessageKind,
    #[source]
    pub source: serde_json::Error,
}
