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

/// Presence information for a XMPP user
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub id: Option<String>,
    pub from: Option<Jid>,
    pub to: Option<Jid>,
}

impl Presence {
    pub fn new() -> Presence {
        Default::default()
    }
}

impl ReadXml for Presence {
    fn read_xml(event: Event, reader: &mut Reader<&[u8]>) -> Result<Self, DecodeError> {
        let (start, empty) = expect_start(event, "presence")?;

        let mut presence = Self::new();
        presence.id = try_get_attribute(&start, "id")?;
        presence.from = try_get_jid(&start, "from")?;
        presence.to = try_get_jid(&start, "to")?;

        // Status, show and priority are passed through untouched
        if !empty {
            skip_children(reader)?;
        }

        Ok(presence)
    }
}

impl WriteXml for Presence {
    fn write_xml(&self, writer: &mut Writer<Cursor<Vec<u8>>>) -> quick_xml::Result<()> {
        // <presence/>
        let mut presence_start = BytesStart::new("presence");

        if let Some(id) = &self.id {
            presence_start.push_attribute(("id", id.as_str()));
        }

        if let Some(from) = &self.from {
            presence_start.push_attribute(("from", from.to_string().as_str()));
        }

        if let Some(to) = &self.to {
            presence_start.push_attribute(("to", to.to_string().as_str()));
        }

        writer.write_event(Event::Empty(presence_start))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::from_xml::{ReadXmlString, WriteXmlString};

    use super::*;

    #[test]
    fn test_presence_empty() {
        let presence: Presence = Presence::new();

        let serialized = presence.write_xml_string().unwrap();
        assert_eq!(serialized, "<presence/>");

        let presence: Presence = Presence::read_xml_string(serialized.as_str()).unwrap();
        assert_eq!(presence, Presence::new());
    }

    #[test]
    fn test_presence() {
        let mut presence: Presence = Presence::new();
        presence.id = Some("123".to_string());
        presence.from = Some(Jid::new("alice", "mail.com").with_resource("phone"));
        presence.to = Some(Jid::new("bob", "mail.com").with_resource("phone"));

        let serialized = presence.write_xml_string().unwrap();
        assert_eq!(
            serialized,
            [
                "<presence ",
                "id=\"123\" ",
                "from=\"alice@mail.com/phone\" ",
                "to=\"bob@mail.com/phone\"/>",
            ]
            .concat()
        );

        let deserialized: Presence = Presence::read_xml_string(serialized.as_str()).unwrap();
        assert_eq!(deserialized, presence);
    }

    #[test]
    fn test_presence_with_children() {
        let raw = r#"
            <presence from='a@b/c'>
                <show>away</show>
                <status>lunch</status>
                <priority>5</priority>
            </presence>
        "#;
        let presence = Presence::read_xml_string(raw).unwrap();
        assert_eq!(presence.from, Some(Jid::new("a", "b").with_resource("c")));
        assert_eq!(presence.to, None);
    }
}
