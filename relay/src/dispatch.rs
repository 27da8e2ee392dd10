//! Per-session control loop.
//!
//! A [`DispatchLoop`] owns one [`Session`] and handles its elements strictly
//! in arrival order: classify, decode, hand to the handler or the log, send
//! the reply if there is one. Only a broken stream or a failed send stops it.

use std::fmt;

use parsers::{
    stanza::{
        classify, decode, iq::Iq, message::Message, presence::Presence, Decoded, RawElement,
        Stanza,
    },
    DecodeError,
};

use crate::{error::SessionError, session::Session};

/// Decides how to answer an incoming message
pub trait MessageHandler: Send {
    /// Returns the reply to send back, if any
    fn handle(&mut self, message: &Message) -> Option<Message>;
}

/// Handler that never replies
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl MessageHandler for Silent {
    fn handle(&mut self, _message: &Message) -> Option<Message> {
        None
    }
}

/// Sink for everything the loop observes
pub trait StanzaLog: Send + Sync {
    fn message(&self, message: &Message);
    fn presence(&self, presence: &Presence);
    fn iq(&self, iq: &Iq);
    /// Element with an unrecognized tag name
    fn unknown(&self, name: &str);
    fn decode_failed(&self, name: &str, error: &DecodeError);
    fn state_changed(&self, state: LoopState);
    fn close_failed(&self, error: &SessionError);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Draining,
    Closed,
}

/// Why a loop stopped
#[derive(Debug)]
pub enum LoopExit {
    /// The peer closed the stream
    EndOfStream,
    ReceiveFailed(SessionError),
    SendFailed(SessionError),
}

impl LoopExit {
    pub fn is_clean(&self) -> bool {
        matches!(self, LoopExit::EndOfStream)
    }

    pub fn into_result(self) -> Result<(), SessionError> {
        match self {
            LoopExit::EndOfStream => Ok(()),
            LoopExit::ReceiveFailed(error) | LoopExit::SendFailed(error) => Err(error),
        }
    }
}

impl fmt::Display for LoopExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopExit::EndOfStream => write!(f, "peer closed the stream"),
            LoopExit::ReceiveFailed(error) => write!(f, "failed to receive: {error}"),
            LoopExit::SendFailed(error) => write!(f, "failed to send: {error}"),
        }
    }
}

pub struct DispatchLoop<S, H, L> {
    session: S,
    handler: H,
    log: L,
}

impl<S, H, L> DispatchLoop<S, H, L>
where
    S: Session,
    H: MessageHandler,
    L: StanzaLog,
{
    pub fn new(session: S, handler: H, log: L) -> Self {
        Self {
            session,
            handler,
            log,
        }
    }

    /// Runs until the stream ends or breaks, then closes the session
    pub async fn run(mut self) -> LoopExit {
        let exit = loop {
            let element = match self.session.next_element().await {
                Ok(Some(element)) => element,
                Ok(None) => break LoopExit::EndOfStream,
                Err(error) => break LoopExit::ReceiveFailed(error),
            };

            if let Err(error) = self.dispatch(element).await {
                break LoopExit::SendFailed(error);
            }
        };

        self.transition(LoopState::Draining);
        if let Err(error) = self.session.close().await {
            self.log.close_failed(&error);
        }
        self.transition(LoopState::Closed);

        exit
    }

    /// Handles one element. Only a failed send is returned as an error.
    async fn dispatch(&mut self, element: RawElement) -> Result<(), SessionError> {
        let kind = classify(&element.name);
        let decoded = match decode(kind, &element) {
            Ok(decoded) => decoded,
            Err(error) => {
                self.log.decode_failed(&element.name, &error);
                return Ok(());
            }
        };

        match decoded {
            Decoded::Stanza(Stanza::Message(message)) => {
                self.log.message(&message);
                if let Some(reply) = self.handler.handle(&message) {
                    self.session.send(Stanza::Message(reply)).await?;
                }
            }
            Decoded::Stanza(Stanza::Presence(presence)) => self.log.presence(&presence),
            Decoded::Stanza(Stanza::Iq(iq)) => self.log.iq(&iq),
            Decoded::Unknown(name) => self.log.unknown(&name),
        }

        Ok(())
    }

    /// Loops start out `Running`, only the later states are reported
    fn transition(&self, state: LoopState) {
        self.log.state_changed(state);
    }
}
