use std::io::Cursor;

use quick_xml::{
    events::{BytesDecl, BytesStart, Event},
    Writer,
};

use crate::{
    constants::{DEFAULT_LANG, NAMESPACE_CLIENT, NAMESPACE_STREAM, STREAM_VERSION},
    error::DecodeError,
    from_xml::WriteXml,
    utils::try_get_attribute,
};

//
// Stream Header
//

/// Attributes of the `<stream:stream>` tag that opens each direction of a
/// session
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    pub id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub version: Option<String>,
    pub xml_lang: Option<String>,
    pub xmlns: Option<String>,
    pub xmlns_stream: Option<String>,
}

impl StreamHeader {
    pub fn new() -> Self {
        Self {
            ..Default::default()
        }
    }

    /// Header with the version and namespaces every client stream carries
    pub fn client() -> Self {
        Self {
            version: Some(STREAM_VERSION.to_string()),
            xml_lang: Some(DEFAULT_LANG.to_string()),
            xmlns: Some(NAMESPACE_CLIENT.to_string()),
            xmlns_stream: Some(NAMESPACE_STREAM.to_string()),
            ..Default::default()
        }
    }

    /// Reads the header out of an already parsed `<stream:stream>` tag
    pub fn from_start(start: &BytesStart) -> Result<Self, DecodeError> {
        if start.local_name().as_ref() != b"stream" {
            return Err(DecodeError::UnexpectedTag {
                expected: "stream:stream",
                found: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            });
        }

        Ok(Self {
            id: try_get_attribute(start, "id")?,
            from: try_get_attribute(start, "from")?,
            to: try_get_attribute(start, "to")?,
            version: try_get_attribute(start, "version")?,
            xml_lang: try_get_attribute(start, "xml:lang")?,
            xmlns: try_get_attribute(start, "xmlns")?,
            xmlns_stream: try_get_attribute(start, "xmlns:stream")?,
        })
    }
}

impl WriteXml for StreamHeader {
    /// Writes the XML declaration and the opening tag. The matching
    /// `</stream:stream>` is only written when the session closes.
    fn write_xml(&self, writer: &mut Writer<Cursor<Vec<u8>>>) -> quick_xml::Result<()> {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;

        let mut start = BytesStart::new("stream:stream");
        let attributes = [
            ("id", &self.id),
            ("from", &self.from),
            ("to", &self.to),
            ("version", &self.version),
            ("xml:lang", &self.xml_lang),
            ("xmlns", &self.xmlns),
            ("xmlns:stream", &self.xmlns_stream),
        ];
        for (name, value) in attributes {
            if let Some(value) = value {
                start.push_attribute((name, value.as_str()));
            }
        }

        writer.write_event(Event::Start(start))?;
        Ok(())
    }
}
