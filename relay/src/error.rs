use parsers::{jid::Jid, DecodeError};
use thiserror::Error;

/// Failures of the session layer. Any of these ends the affected connection.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed xml stream: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid stream header: {0}")]
    Header(#[from] DecodeError),

    #[error("expected stream header, found {0}")]
    MissingHeader(String),

    #[error("stream restarted after negotiation")]
    UnexpectedRestart,

    #[error("stream ended inside <{0}>")]
    Truncated(String),

    #[error("expected peer {expected}, found {found}")]
    UnexpectedPeer { expected: Jid, found: Jid },

    #[error("message has no recipient")]
    MissingRecipient,

    #[error("session is closed")]
    Closed,
}
