use std::io::Cursor;

use quick_xml::{
    events::{BytesEnd, BytesStart, BytesText, Event},
    Reader, Writer,
};

use crate::{
    error::DecodeError,
    from_xml::{ReadXml, WriteXml},
    jid::Jid,
    utils::{decode_utf8, expect_start, skip_children, try_get_attribute, try_get_jid},
};

/// `type` attribute of a message
///
/// https://www.rfc-editor.org/rfc/rfc6121.html#section-5.2.2
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    #[default]
    Normal,
    Chat,
    Groupchat,
    Headline,
    Error,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Normal => "normal",
            MessageType::Chat => "chat",
            MessageType::Groupchat => "groupchat",
            MessageType::Headline => "headline",
            MessageType::Error => "error",
        }
    }

    /// Unrecognized values are treated as `normal`, as RFC 6121 asks
    pub fn from_attribute(value: &str) -> Self {
        match value {
            "chat" => MessageType::Chat,
            "groupchat" => MessageType::Groupchat,
            "headline" => MessageType::Headline,
            "error" => MessageType::Error,
            _ => MessageType::Normal,
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Option<String>,
    pub from: Option<Jid>,
    pub to: Option<Jid>,
    pub type_: MessageType,
    pub body: String,
}

impl Message {
    pub fn new() -> Self {
        Default::default()
    }
}

impl ReadXml for Message {
    fn read_xml(root: Event, reader: &mut Reader<&[u8]>) -> Result<Self, DecodeError> {
        let (start, empty) = expect_start(root, "message")?;

        let mut result = Self::new();

        // <message id from to type>
        result.id = try_get_attribute(&start, "id")?;
        // Replies are addressed to `from`, so it has to be there
        result.from = try_get_jid(&start, "from")?;
        if result.from.is_none() {
            return Err(DecodeError::MissingAttribute("from"));
        }
        result.to = try_get_jid(&start, "to")?;
        result.type_ = try_get_attribute(&start, "type")?
            .map(|value| MessageType::from_attribute(&value))
            .unwrap_or_default();

        if empty {
            return Ok(result);
        }

        let mut body: Option<String> = None;
        loop {
            match reader.read_event()? {
                // <body>
                Event::Start(tag) if tag.local_name().as_ref() == b"body" => {
                    let text = read_text(reader)?;
                    body.get_or_insert(text);
                }
                // <body/>
                Event::Empty(tag) if tag.local_name().as_ref() == b"body" => {
                    body.get_or_insert_with(String::new);
                }
                // Anything else is not ours to parse
                Event::Start(_) => skip_children(reader)?,
                // </message>
                Event::End(_) => break,
                Event::Eof => return Err(DecodeError::UnexpectedEof),
                _ => {}
            }
        }
        result.body = body.unwrap_or_default();

        Ok(result)
    }
}

/// Reads text up to the end tag of the current element
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String, DecodeError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(content) => text.push_str(&content.unescape()?),
            Event::CData(content) => text.push_str(&decode_utf8(&content)?),
            Event::Start(_) => skip_children(reader)?,
            Event::End(_) => return Ok(text),
            Event::Eof => return Err(DecodeError::UnexpectedEof),
            _ => {}
        }
    }
}

impl WriteXml for Message {
    fn write_xml(&self, writer: &mut Writer<Cursor<Vec<u8>>>) -> quick_xml::Result<()> {
        // <message id={...} from={...} to={...} type={...}>
        let mut message_start = BytesStart::new("message");
        if let Some(id) = &self.id {
            message_start.push_attribute(("id", id.as_str()));
        }
        if let Some(from) = &self.from {
            message_start.push_attribute(("from", from.to_string().as_str()));
        }
        if let Some(to) = &self.to {
            message_start.push_attribute(("to", to.to_string().as_str()));
        }
        message_start.push_attribute(("type", self.type_.as_str()));

        writer.write_event(Event::Start(message_start))?;

        // <body>{...}</body>
        writer.write_event(Event::Start(BytesStart::new("body")))?;
        writer.write_event(Event::Text(BytesText::new(&self.body)))?;
        writer.write_event(Event::End(BytesEnd::new("body")))?;

        // </message>
        writer.write_event(Event::End(BytesEnd::new("message")))?;

        Ok(())
    }
}
