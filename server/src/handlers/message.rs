use parsers::stanza::message::Message;
use relay::MessageHandler;

pub const ECHO_PREFIX: &str = "Echo: ";

/// Builds the reply to an incoming message.
///
/// The reply goes back to the sender with the same type, carrying the body
/// prefixed with `"Echo: "`. `from` is left for the session to fill in.
pub fn echo_reply(incoming: &Message) -> Message {
    Message {
        id: None,
        from: None,
        to: incoming.from.clone(),
        type_: incoming.type_,
        body: format!("{ECHO_PREFIX}{}", incoming.body),
    }
}

/// Answers every message with [`echo_reply`]
#[derive(Debug, Default, Clone, Copy)]
pub struct Echo;

impl MessageHandler for Echo {
    fn handle(&mut self, message: &Message) -> Option<Message> {
        Some(echo_reply(message))
    }
}
