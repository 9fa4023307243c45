//! Websocket connection management.
//!
//! Wraps a `tokio-tungstenite` stream with NOODLES-specific framing: every
//! outbound batch of [`ServerMessage`]s is encoded as a single CBOR array
//! frame and sent as one binary websocket message; every inbound binary
//! message is decoded into zero or more [`ClientMessage`]s.
//!
//! A connection is split into independent [`Reader`]/[`Writer`] halves so a
//! session can run its inbound and outbound sides on separate tasks
//! without a lock between them.

use futures_util::stream::{SplitSink, SplitStream, StreamExt};
use futures_util::SinkExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::WebSocketStream;

use noodles_wire::{decode_client_frame, encode_frame, ClientMessage, ServerMessage};

use crate::error::NetError;

/// A single client connection, framed for the NOODLES message protocol.
pub struct Connection<S> {
    stream: WebSocketStream<S>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    #[must_use]
    pub fn new(stream: WebSocketStream<S>) -> Self {
        Self { stream }
    }

    /// Split into independent read and write halves.
    #[must_use]
    pub fn split(self) -> (Reader<S>, Writer<S>) {
        let (sink, stream) = self.stream.split();
        (Reader { stream }, Writer { sink })
    }
}

/// The inbound half of a split [`Connection`].
pub struct Reader<S> {
    stream: SplitStream<WebSocketStream<S>>,
}

impl<S> Reader<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Receive the next binary frame and decode it into client messages.
    ///
    /// Returns `Ok(None)` when the peer has closed the connection cleanly.
    /// Text, ping, and pong frames are transparently skipped, since
    /// `tokio-tungstenite` answers pings itself and a NOODLES client has no
    /// business sending text. A raw, unclassified frame is rejected with
    /// [`NetError::UnexpectedFrameKind`] — it should never reach this layer
    /// over a normal websocket handshake.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if the socket read fails, the frame doesn't
    /// decode as a valid NOODLES message batch, or a raw frame arrives.
    pub async fn recv_frame(&mut self) -> Result<Option<Vec<ClientMessage>>, NetError> {
        loop {
            match self.stream.next().await {
                None => return Ok(None),
                Some(Err(err)) => return Err(err.into()),
                Some(Ok(WsMessage::Binary(bytes))) => {
                    return Ok(Some(decode_client_frame(&bytes)?));
                }
                Some(Ok(WsMessage::Close(_))) => return Ok(None),
                Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Text(_))) => {
                    continue;
                }
                Some(Ok(WsMessage::Frame(_))) => return Err(NetError::UnexpectedFrameKind),
            }
        }
    }
}

/// The outbound half of a split [`Connection`].
pub struct Writer<S> {
    sink: SplitSink<WebSocketStream<S>, WsMessage>,
}

impl<S> Writer<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Encode `messages` as one CBOR frame and send it as a single binary
    /// websocket message. A no-op for an empty batch.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if encoding fails or the socket write fails.
    pub async fn send_frame(&mut self, messages: &[ServerMessage]) -> Result<(), NetError> {
        if messages.is_empty() {
            return Ok(());
        }
        let bytes = encode_frame(messages)?;
        self.sink.send(WsMessage::Binary(bytes.into())).await?;
        Ok(())
    }

    /// Close the underlying websocket connection.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if sending the close frame fails.
    pub async fn close(&mut self) -> Result<(), NetError> {
        self.sink.close().await?;
        Ok(())
    }
}
