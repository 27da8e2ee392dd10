//! `ReadXml` and `WriteXml` traits are used to convert between XML form and
//! XMPP structs. `Display` and `FromStr` are kept for the textual form of
//! addresses, so they could not double as the wire encoding.

use std::io::Cursor;

use quick_xml::{events::Event, Reader, Writer};

use crate::{error::DecodeError, utils::Collect};

pub trait ReadXml: Sized {
    /// Reads XML starting from the root event
    fn read_xml(root: Event, reader: &mut Reader<&[u8]>) -> Result<Self, DecodeError>;
}

/// Trait to read XML from a string
pub trait ReadXmlString: ReadXml {
    /// Reads XML from a string and returns `Result<Self>`
    fn read_xml_string(xml: &str) -> Result<Self, DecodeError> {
        let mut reader = Reader::from_str(xml);
        // Text is not trimmed, body whitespace has to survive
        let root = loop {
            match reader.read_event()? {
                Event::Text(_) | Event::Decl(_) | Event::Comment(_) => continue,
                event => break event,
            }
        };
        Self::read_xml(root, &mut reader)
    }
}

/// Blanket implementation for `ReadXmlString` for all `ReadXml` types
impl<T: ReadXml> ReadXmlString for T {}

pub trait WriteXml {
    /// Writes XML to the writer
    fn write_xml(&self, writer: &mut Writer<Cursor<Vec<u8>>>) -> quick_xml::Result<()>;
}

pub trait WriteXmlString: WriteXml {
    /// Writes XML to a string
    fn write_xml_string(&self) -> quick_xml::Result<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        self.write_xml(&mut writer)?;
        writer.collect()
    }
}

/// Blanket implementation for `WriteXmlString` for all `WriteXml` types
impl<T: WriteXml> WriteXmlString for T {}
