use std::io::Cursor;

use parsers::{
    stanza::RawElement,
    stream::StreamHeader,
    utils::{decode_utf8, Collect},
};
use quick_xml::{
    events::{BytesStart, Event},
    Reader, Writer,
};
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
};

use crate::error::SessionError;

/// One unit read off the XML stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// The peer's `<stream:stream>` opening tag
    Open(StreamHeader),
    /// A complete top-level element
    Element(RawElement),
    /// `</stream:stream>`, or the peer hung up between elements
    Close,
}

/// Struct to represent one XML stream over a byte transport
///
/// Reading frames the stream into top-level elements, writing sends
/// already serialized XML.
pub struct Connection<R = OwnedReadHalf, W = OwnedWriteHalf> {
    reader: Reader<BufReader<R>>,
    writer: W,
    /// Whether the peer's stream header has been read
    opened: bool,
    /// Address put on inbound elements that carry no `from`
    stamp: Option<String>,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Self {
        let (reader, writer) = stream.into_split();
        Self::from_parts(reader, writer)
    }
}

impl<R, W> Connection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn from_parts(reader: R, writer: W) -> Self {
        let mut reader = Reader::from_reader(BufReader::new(reader));
        // Framing goes by depth. A mismatched end tag only spoils its own
        // stanza, which then fails to decode.
        reader.check_end_names(false);
        Self {
            reader,
            writer,
            opened: false,
            stamp: None,
        }
    }

    pub fn set_stamp(&mut self, from: Option<String>) {
        self.stamp = from;
    }

    /// Reads until the next complete frame.
    ///
    /// Elements nested deeper than the stanza level are copied verbatim into
    /// the stanza's XML. Whitespace and other text between stanzas is dropped.
    /// A `<stream:stream>` tag after the first one is returned as `Open`.
    /// Bytes that are not UTF-8 fail the stream.
    pub async fn read_frame(&mut self) -> Result<Frame, SessionError> {
        let mut buf = Vec::new();
        // Stanza being collected, with its local name
        let mut element: Option<(String, Writer<Cursor<Vec<u8>>>)> = None;
        // Depth inside the stanza being collected
        let mut depth = 0usize;

        loop {
            buf.clear();
            let event = self.reader.read_event_into_async(&mut buf).await?;

            match element.as_mut() {
                None => match event {
                    Event::Start(start) if !self.opened => {
                        self.opened = true;
                        return Ok(Frame::Open(StreamHeader::from_start(&start)?));
                    }
                    Event::Empty(start) if !self.opened => {
                        return Err(SessionError::MissingHeader(local_name(&start)?));
                    }
                    Event::Start(start) if start.local_name().as_ref() == b"stream" => {
                        return Ok(Frame::Open(StreamHeader::from_start(&start)?));
                    }
                    Event::Start(start) => {
                        let name = local_name(&start)?;
                        let mut writer = Writer::new(Cursor::new(Vec::new()));
                        writer.write_event(Event::Start(self.stamped(start)?))?;
                        element = Some((name, writer));
                        depth = 1;
                    }
                    Event::Empty(start) => {
                        let name = local_name(&start)?;
                        let mut writer = Writer::new(Cursor::new(Vec::new()));
                        writer.write_event(Event::Empty(self.stamped(start)?))?;
                        return Ok(Frame::Element(RawElement::new(name, writer.collect()?)));
                    }
                    Event::End(_) | Event::Eof => return Ok(Frame::Close),
                    // Declarations, keepalive whitespace, comments
                    _ => {}
                },
                Some((name, writer)) => {
                    match &event {
                        Event::Start(_) => depth += 1,
                        Event::End(_) => depth -= 1,
                        Event::Eof => return Err(SessionError::Truncated(name.clone())),
                        _ => {}
                    }
                    writer.write_event(event)?;

                    if depth == 0 {
                        if let Some((name, writer)) = element.take() {
                            return Ok(Frame::Element(RawElement::new(name, writer.collect()?)));
                        }
                    }
                }
            }
        }
    }

    /// Adds the stamp as `from` unless the element already has one
    fn stamped<'a>(&self, mut start: BytesStart<'a>) -> Result<BytesStart<'a>, SessionError> {
        if let Some(from) = &self.stamp {
            if start.try_get_attribute("from")?.is_none() {
                start.push_attribute(("from", from.as_str()));
            }
        }
        Ok(start)
    }

    /// Sends serialized XML to the peer
    pub async fn send(&mut self, data: &str) -> Result<(), SessionError> {
        self.writer.write_all(data.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Shuts the write half down, the peer sees end of file
    pub async fn shutdown(&mut self) -> Result<(), SessionError> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

fn local_name(start: &BytesStart) -> quick_xml::Result<String> {
    decode_utf8(start.local_name().as_ref())
}

#[cfg(test)]
mod tests {
    use parsers::{
        from_xml::ReadXmlString,
        jid::Jid,
        stanza::{message::Message, presence::Presence},
        DecodeError,
    };
    use tokio::io::{duplex, split, AsyncReadExt, DuplexStream, ReadHalf, WriteHalf};

    use super::*;

    const HEADER: &str = concat!(
        "<?xml version='1.0'?>",
        "<stream:stream to='example.com' version='1.0' ",
        "xmlns='jabber:client' xmlns:stream='http://etherx.jabber.org/streams'>"
    );

    type Pipe = Connection<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

    fn pipe() -> (Pipe, DuplexStream) {
        let (local, remote) = duplex(4096);
        let (reader, writer) = split(local);
        (Connection::from_parts(reader, writer), remote)
    }

    async fn expect_element(conn: &mut Pipe) -> RawElement {
        match conn.read_frame().await.unwrap() {
            Frame::Element(element) => element,
            frame => panic!("expected element, got {frame:?}"),
        }
    }

    #[tokio::test]
    async fn frames_stream() {
        let (mut conn, mut remote) = pipe();
        let input = [
            HEADER,
            "\n  ",
            "<message from='a@b' to='c@d'><body>hi &amp; bye</body></message>",
            " ",
            "<presence from='a@b/c'/>",
            "<foo><bar><baz/></bar>text</foo>",
            "</stream:stream>",
        ]
        .concat();
        remote.write_all(input.as_bytes()).await.unwrap();

        match conn.read_frame().await.unwrap() {
            Frame::Open(header) => {
                assert_eq!(header.to.as_deref(), Some("example.com"));
                assert_eq!(header.xmlns.as_deref(), Some("jabber:client"));
            }
            frame => panic!("expected header, got {frame:?}"),
        }

        let message = expect_element(&mut conn).await;
        assert_eq!(message.name, "message");
        assert_eq!(
            message.xml,
            "<message from='a@b' to='c@d'><body>hi &amp; bye</body></message>"
        );
        assert_eq!(
            Message::read_xml_string(&message.xml).unwrap().body,
            "hi & bye"
        );

        let presence = expect_element(&mut conn).await;
        assert_eq!(presence.name, "presence");
        assert_eq!(presence.xml, "<presence from='a@b/c'/>");

        let unknown = expect_element(&mut conn).await;
        assert_eq!(unknown.name, "foo");
        assert_eq!(unknown.xml, "<foo><bar><baz/></bar>text</foo>");

        assert_eq!(conn.read_frame().await.unwrap(), Frame::Close);
    }

    #[tokio::test]
    async fn hang_up_between_elements_closes() {
        let (mut conn, mut remote) = pipe();
        remote.write_all(HEADER.as_bytes()).await.unwrap();
        drop(remote);

        assert!(matches!(conn.read_frame().await.unwrap(), Frame::Open(_)));
        assert_eq!(conn.read_frame().await.unwrap(), Frame::Close);
    }

    #[tokio::test]
    async fn hang_up_inside_element_fails() {
        let (mut conn, mut remote) = pipe();
        remote
            .write_all([HEADER, "<message from='a@b'><body>cut"].concat().as_bytes())
            .await
            .unwrap();
        drop(remote);

        assert!(matches!(conn.read_frame().await.unwrap(), Frame::Open(_)));
        assert!(conn.read_frame().await.is_err());
    }

    #[tokio::test]
    async fn stanza_before_header_fails() {
        let (mut conn, mut remote) = pipe();
        remote.write_all(b"<presence/>").await.unwrap();

        assert!(matches!(
            conn.read_frame().await,
            Err(SessionError::MissingHeader(name)) if name == "presence"
        ));
    }

    #[tokio::test]
    async fn stamps_missing_from() {
        let (mut conn, mut remote) = pipe();
        conn.set_stamp(Some("client@example.com".to_string()));
        let input = [
            HEADER,
            "<message to='server@example.com'><body>x</body></message>",
            "<presence from='other@example.com'/>",
        ]
        .concat();
        remote.write_all(input.as_bytes()).await.unwrap();

        assert!(matches!(conn.read_frame().await.unwrap(), Frame::Open(_)));

        let message = expect_element(&mut conn).await;
        let message = Message::read_xml_string(&message.xml).unwrap();
        assert_eq!(message.from, Some(Jid::new("client", "example.com")));

        let presence = expect_element(&mut conn).await;
        let presence = Presence::read_xml_string(&presence.xml).unwrap();
        assert_eq!(presence.from, Some(Jid::new("other", "example.com")));
    }

    #[tokio::test]
    async fn mismatched_end_tag_spoils_only_its_stanza() {
        let (mut conn, mut remote) = pipe();
        let input = [
            HEADER,
            "<message from='a@b'><body>x</bdy></message>",
            "<message from='a@b'><body>next</body></message>",
        ]
        .concat();
        remote.write_all(input.as_bytes()).await.unwrap();

        assert!(matches!(conn.read_frame().await.unwrap(), Frame::Open(_)));

        let broken = expect_element(&mut conn).await;
        assert_eq!(broken.xml, "<message from='a@b'><body>x</bdy></message>");
        assert!(matches!(
            Message::read_xml_string(&broken.xml),
            Err(DecodeError::Xml(_))
        ));

        let next = expect_element(&mut conn).await;
        assert_eq!(Message::read_xml_string(&next.xml).unwrap().body, "next");
    }

    #[tokio::test]
    async fn second_stream_header_is_a_restart() {
        let (mut conn, mut remote) = pipe();
        let input = [HEADER, "<presence/>", HEADER].concat();
        remote.write_all(input.as_bytes()).await.unwrap();

        assert!(matches!(conn.read_frame().await.unwrap(), Frame::Open(_)));
        assert_eq!(expect_element(&mut conn).await.name, "presence");
        match conn.read_frame().await.unwrap() {
            Frame::Open(header) => assert_eq!(header.to.as_deref(), Some("example.com")),
            frame => panic!("expected header, got {frame:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_utf8_fails() {
        let (mut conn, mut remote) = pipe();
        remote.write_all(HEADER.as_bytes()).await.unwrap();
        remote
            .write_all(b"<message from='a@b'><body>\xff\xfe</body></message>")
            .await
            .unwrap();

        assert!(matches!(conn.read_frame().await.unwrap(), Frame::Open(_)));
        assert!(matches!(
            conn.read_frame().await,
            Err(SessionError::Xml(_))
        ));
    }

    #[tokio::test]
    async fn send_and_shutdown() {
        let (mut conn, mut remote) = pipe();
        conn.send("<presence/>").await.unwrap();
        conn.shutdown().await.unwrap();

        let mut received = String::new();
        remote.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "<presence/>");
    }
}
