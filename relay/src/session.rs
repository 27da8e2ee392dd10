use async_trait::async_trait;
use parsers::{
    from_xml::WriteXmlString,
    jid::Jid,
    stanza::{RawElement, Stanza},
    stream::StreamHeader,
    DecodeError,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;
use uuid::Uuid;

use crate::{
    conn::{Connection, Frame},
    error::SessionError,
};

/// An established, ordered channel of stanzas with one peer
#[async_trait]
pub trait Session: Send {
    /// Waits for the next top-level element, `None` once the peer closed
    /// the stream
    async fn next_element(&mut self) -> Result<Option<RawElement>, SessionError>;

    /// Writes a stanza to the peer
    async fn send(&mut self, stanza: Stanza) -> Result<(), SessionError>;

    /// Closes our side of the stream
    async fn close(&mut self) -> Result<(), SessionError>;
}

/// Session over an XML stream opened by exchanging stream headers
pub struct XmppSession<R = tokio::net::tcp::OwnedReadHalf, W = tokio::net::tcp::OwnedWriteHalf> {
    id: Option<String>,
    /// Our own address, put on outbound stanzas without `from`
    identity: Jid,
    /// The other end, when known
    peer: Option<Jid>,
    connection: Connection<R, W>,
    closed: bool,
}

impl<R, W> XmppSession<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Opens the stream towards a server and waits for its header
    pub async fn establish_client(
        local: Jid,
        mut connection: Connection<R, W>,
    ) -> Result<Self, SessionError> {
        let mut header = StreamHeader::client();
        header.from = Some(local.to_string());
        header.to = Some(local.domain_part().to_string());
        connection.send(&header.write_xml_string()?).await?;

        let response = expect_header(&mut connection).await?;
        let peer = response.from.and_then(|from| from.parse::<Jid>().ok());
        connection.set_stamp(peer.as_ref().map(Jid::to_string));
        debug!(id = ?response.id, "client stream opened");

        Ok(Self {
            id: response.id,
            identity: local,
            peer,
            connection,
            closed: false,
        })
    }

    /// Waits for a client's stream header and answers it with a fresh
    /// stream id
    pub async fn establish_server(
        server: Jid,
        expected_peer: Jid,
        mut connection: Connection<R, W>,
    ) -> Result<Self, SessionError> {
        let request = expect_header(&mut connection).await?;

        let peer = match request.from {
            Some(from) => {
                let found = from.parse::<Jid>().map_err(DecodeError::from)?;
                if found.bare() != expected_peer.bare() {
                    return Err(SessionError::UnexpectedPeer {
                        expected: expected_peer,
                        found,
                    });
                }
                found
            }
            None => expected_peer,
        };

        let id = Uuid::new_v4().to_string();
        let mut header = StreamHeader::client();
        header.id = Some(id.clone());
        header.from = Some(server.to_string());
        header.to = Some(peer.to_string());
        connection.send(&header.write_xml_string()?).await?;

        connection.set_stamp(Some(peer.to_string()));
        debug!(%id, %peer, "server stream opened");

        Ok(Self {
            id: Some(id),
            identity: server,
            peer: Some(peer),
            connection,
            closed: false,
        })
    }
}

impl<R, W> XmppSession<R, W> {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn identity(&self) -> &Jid {
        &self.identity
    }

    pub fn peer(&self) -> Option<&Jid> {
        self.peer.as_ref()
    }
}

async fn expect_header<R, W>(connection: &mut Connection<R, W>) -> Result<StreamHeader, SessionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match connection.read_frame().await? {
        Frame::Open(header) => Ok(header),
        Frame::Element(element) => Err(SessionError::MissingHeader(element.name)),
        Frame::Close => Err(SessionError::MissingHeader("end of stream".to_string())),
    }
}

#[async_trait]
impl<R, W> Session for XmppSession<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn next_element(&mut self) -> Result<Option<RawElement>, SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        match self.connection.read_frame().await? {
            Frame::Element(element) => Ok(Some(element)),
            Frame::Close => Ok(None),
            Frame::Open(_) => Err(SessionError::UnexpectedRestart),
        }
    }

    async fn send(&mut self, mut stanza: Stanza) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        if let Stanza::Message(message) = &stanza {
            if message.to.is_none() {
                return Err(SessionError::MissingRecipient);
            }
        }
        stanza
            .from_mut()
            .get_or_insert_with(|| self.identity.clone());

        self.connection.send(&stanza.write_xml_string()?).await
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.connection.send("</stream:stream>").await?;
        self.connection.shutdown().await
    }
}
