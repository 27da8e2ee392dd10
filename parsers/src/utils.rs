use std::io::Cursor;

use quick_xml::{
    events::{BytesStart, Event},
    Reader, Writer,
};

use crate::{error::DecodeError, jid::Jid};

/// Trait for converting a structure into string
pub trait Collect {
    /// Collect data as a `String` by consuming itself. Fails on bytes that
    /// are not UTF-8.
    fn collect(self) -> quick_xml::Result<String>;
}

impl Collect for Writer<Cursor<Vec<u8>>> {
    fn collect(self) -> quick_xml::Result<String> {
        String::from_utf8(self.into_inner().into_inner())
            .map_err(|error| quick_xml::Error::NonDecodable(Some(error.utf8_error())))
    }
}

/// Copies raw XML bytes into a `String`, refusing anything not UTF-8
pub fn decode_utf8(bytes: &[u8]) -> quick_xml::Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|error| quick_xml::Error::NonDecodable(Some(error)))
}

/// Tries to get an unescaped XML attribute from the starting tag
///
/// ## Params
/// - `tag`: Starting tag
/// - `attribute`: Attribute as a string literal
pub fn try_get_attribute(
    tag: &BytesStart,
    attribute: &'static str,
) -> Result<Option<String>, DecodeError> {
    match tag.try_get_attribute(attribute)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

/// Same as [`try_get_attribute`], parsing the value as an address
pub fn try_get_jid(tag: &BytesStart, attribute: &'static str) -> Result<Option<Jid>, DecodeError> {
    try_get_attribute(tag, attribute)?
        .map(|value| value.parse::<Jid>())
        .transpose()
        .map_err(DecodeError::from)
}

/// Splits a root event into its start tag and whether it is self-closing,
/// checking the local tag name along the way
pub fn expect_start<'a>(
    root: Event<'a>,
    expected: &'static str,
) -> Result<(BytesStart<'a>, bool), DecodeError> {
    let (start, empty) = match root {
        Event::Start(tag) => (tag, false),
        Event::Empty(tag) => (tag, true),
        _ => return Err(DecodeError::NotAnElement),
    };

    if start.local_name().as_ref() != expected.as_bytes() {
        return Err(DecodeError::UnexpectedTag {
            expected,
            found: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        });
    }

    Ok((start, empty))
}

/// Consumes events up to and including the end tag of the element whose
/// start tag has just been read
pub fn skip_children(reader: &mut Reader<&[u8]>) -> Result<(), DecodeError> {
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return Ok(()),
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(DecodeError::UnexpectedEof),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_rejects_invalid_utf8() {
        let writer = Writer::new(Cursor::new(b"<body>caf\xc3\xa9</body>".to_vec()));
        assert_eq!(writer.collect().unwrap(), "<body>café</body>");

        let writer = Writer::new(Cursor::new(b"<body>\xff</body>".to_vec()));
        assert!(matches!(
            writer.collect(),
            Err(quick_xml::Error::NonDecodable(Some(_)))
        ));
    }

    #[test]
    fn decode_utf8_rejects_invalid_bytes() {
        assert_eq!(decode_utf8(b"message").unwrap(), "message");
        assert!(decode_utf8(b"mess\xc3age").is_err());
    }
}
