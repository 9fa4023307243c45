//! Transport-layer error types.

/// Errors that can occur while driving a websocket connection.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("wire framing error: {0}")]
    Wire(#[from] noodles_wire::WireError),

    #[error("peer sent a non-binary frame where a message frame was expected")]
    UnexpectedFrameKind,

    #[error("connection closed")]
    Closed,
}
