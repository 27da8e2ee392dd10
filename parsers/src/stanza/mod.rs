use std::io::Cursor;

use quick_xml::Writer;

use crate::{
    error::DecodeError,
    from_xml::{ReadXmlString, WriteXml},
    jid::Jid,
};

use self::iq::Iq;
use self::message::Message;
use self::presence::Presence;

pub mod iq;
pub mod message;
pub mod presence;

/// Kind of a top-level element, derived from its tag name alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StanzaKind {
    Message,
    Presence,
    Iq,
    Unknown,
}

/// Classifies an element by its local (namespace-stripped) tag name.
///
/// Matching is exact and case-sensitive. Anything that is not one of the
/// three stanza names is `Unknown`.
pub fn classify(local_name: &str) -> StanzaKind {
    match local_name {
        "message" => StanzaKind::Message,
        "presence" => StanzaKind::Presence,
        "iq" => StanzaKind::Iq,
        _ => StanzaKind::Unknown,
    }
}

/// A single top-level element as framed off the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement {
    /// Local tag name, without any namespace prefix
    pub name: String,
    /// The element serialized as a standalone XML fragment
    pub xml: String,
}

impl RawElement {
    pub fn new<N: Into<String>, X: Into<String>>(name: N, xml: X) -> Self {
        Self {
            name: name.into(),
            xml: xml.into(),
        }
    }
}

/// Basic unit of communication in XMPP.
/// They are the equivalent of HTTP requests and responses.
///
/// https://www.rfc-editor.org/rfc/rfc6120.html#section-8
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stanza {
    Message(Message),
    Presence(Presence),
    Iq(Iq),
}

impl Stanza {
    pub fn from(&self) -> Option<&Jid> {
        match self {
            Stanza::Message(message) => message.from.as_ref(),
            Stanza::Presence(presence) => presence.from.as_ref(),
            Stanza::Iq(iq) => iq.from.as_ref(),
        }
    }

    pub fn from_mut(&mut self) -> &mut Option<Jid> {
        match self {
            Stanza::Message(message) => &mut message.from,
            Stanza::Presence(presence) => &mut presence.from,
            Stanza::Iq(iq) => &mut iq.from,
        }
    }
}

impl WriteXml for Stanza {
    fn write_xml(&self, writer: &mut Writer<Cursor<Vec<u8>>>) -> quick_xml::Result<()> {
        match self {
            Stanza::Message(message) => message.write_xml(writer),
            Stanza::Presence(presence) => presence.write_xml(writer),
            Stanza::Iq(iq) => iq.write_xml(writer),
        }
    }
}

/// Result of decoding one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Stanza(Stanza),
    /// Unrecognized element, only the tag name is kept
    Unknown(String),
}

/// Decodes a framed element into the record matching its kind.
///
/// Unknown elements are not parsed at all.
pub fn decode(kind: StanzaKind, element: &RawElement) -> Result<Decoded, DecodeError> {
    let stanza = match kind {
        StanzaKind::Message => Stanza::Message(Message::read_xml_string(&element.xml)?),
        StanzaKind::Presence => Stanza::Presence(Presence::read_xml_string(&element.xml)?),
        StanzaKind::Iq => Stanza::Iq(Iq::read_xml_string(&element.xml)?),
        StanzaKind::Unknown => return Ok(Decoded::Unknown(element.name.clone())),
    };
    Ok(Decoded::Stanza(stanza))
}
