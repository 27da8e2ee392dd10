use std::io::Cursor;

use quick_xml::{
    events::{BytesStart, Event},
    Reader, Writer,
};

use crate::{
    error::DecodeError,
    from_xml::{ReadXml, WriteXml},
    jid::Jid,
    utils::{expect_start, skip_children, try_get_attribute, try_get_jid},
};

/// `type` attribute of an IQ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IqType {
    Get,
    Set,
    Result,
    Error,
}

impl IqType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IqType::Get => "get",
            IqType::Set => "set",
            IqType::Result => "result",
            IqType::Error => "error",
        }
    }

    pub fn from_attribute(value: &str) -> Result<Self, DecodeError> {
        match value {
            "get" => Ok(IqType::Get),
            "set" => Ok(IqType::Set),
            "result" => Ok(IqType::Result),
            "error" => Ok(IqType::Error),
            _ => Err(DecodeError::InvalidAttribute {
                name: "type",
                value: value.to_string(),
            }),
        }
    }
}

/// Represents an IQ stanza in XMPP, which is used for sending queries or
/// commands and receiving responses.
///
/// The payload is never interpreted here.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Iq {
    pub id: Option<String>,
    pub from: Option<Jid>,
    pub to: Option<Jid>,
    pub type_: Option<IqType>,
}

impl Iq {
    pub fn new() -> Self {
        Default::default()
    }
}

impl ReadXml for Iq {
    fn read_xml(root: Event, reader: &mut Reader<&[u8]>) -> Result<Self, DecodeError> {
        let (start, empty) = expect_start(root, "iq")?;

        let mut result = Self::new();
        result.id = try_get_attribute(&start, "id")?;
        result.from = try_get_jid(&start, "from")?;
        result.to = try_get_jid(&start, "to")?;
        result.type_ = try_get_attribute(&start, "type")?
            .map(|value| IqType::from_attribute(&value))
            .transpose()?;

        if !empty {
            skip_children(reader)?;
        }

        Ok(result)
    }
}

impl WriteXml for Iq {
    fn write_xml(&self, writer: &mut Writer<Cursor<Vec<u8>>>) -> quick_xml::Result<()> {
        let mut iq_start = BytesStart::new("iq");
        if let Some(id) = &self.id {
            iq_start.push_attribute(("id", id.as_str()));
        }
        if let Some(from) = &self.from {
            iq_start.push_attribute(("from", from.to_string().as_str()));
        }
        if let Some(to) = &self.to {
            iq_start.push_attribute(("to", to.to_string().as_str()));
        }
        if let Some(type_) = &self.type_ {
            iq_start.push_attribute(("type", type_.as_str()));
        }

        // <iq />
        writer.write_event(Event::Empty(iq_start))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::from_xml::{ReadXmlString, WriteXmlString};

    use super::*;

    #[test]
    fn test_iq_read() {
        let raw = r#"
            <iq
                id='123'
                from='alice@mail.com/home'
                type='get'>
                    <query xmlns='jabber:iq:roster'>
                        <item jid='bob@mail.com'/>
                    </query>
            </iq>
        "#;

        let iq = Iq::read_xml_string(raw).unwrap();
        assert_eq!(
            iq,
            Iq {
                id: Some("123".into()),
                from: Some(Jid::new("alice", "mail.com").with_resource("home")),
                to: None,
                type_: Some(IqType::Get),
            }
        );
    }

    #[test]
    fn test_iq_write() {
        let mut iq = Iq::new();
        iq.id = Some("ping-1".into());
        iq.to = Some(Jid::new("server", "example.com"));
        iq.type_ = Some(IqType::Result);

        let serialized = iq.write_xml_string().unwrap();
        assert_eq!(
            serialized,
            "<iq id=\"ping-1\" to=\"server@example.com\" type=\"result\"/>"
        );
        assert_eq!(Iq::read_xml_string(&serialized).unwrap(), iq);
    }

    #[test]
    fn test_iq_invalid_type() {
        let err = Iq::read_xml_string("<iq id='1' type='fetch'/>").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidAttribute { name: "type", .. }
        ));
    }
}
