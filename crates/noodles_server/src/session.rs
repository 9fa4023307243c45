//! Per-connection client session state.
//!
//! A session moves through a fixed sequence: `Accepted` right after the
//! websocket handshake, `Introduced` once the client's intro message has
//! arrived, `Active` once the initial document snapshot has been sent and
//! `InitDone` issued, and `Closed` once the connection is gone. Messages
//! that don't fit the current state (an `InvokeMethod` before `Introduced`,
//! for instance) are rejected rather than silently accepted.

use tokio::sync::mpsc;
use uuid::Uuid;

use noodles_wire::ServerMessage;

pub type SessionId = Uuid;

/// Outbound queue depth before a session is considered unresponsive and
/// torn down rather than left to buffer without bound.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Accepted,
    Introduced,
    Active,
    Closed,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session is in state {current:?}, which cannot transition to {attempted:?}")]
    InvalidTransition {
        current: SessionState,
        attempted: SessionState,
    },
}

/// A live client connection's state plus the channel its outbound frames
/// are queued on. The queue is a bounded FIFO: delivery order within a
/// session always matches send order, and a client slow enough to fill it
/// gets torn down instead of letting the server buffer unboundedly.
pub struct ClientSession {
    pub id: SessionId,
    pub client_name: Option<String>,
    state: SessionState,
    outbound: mpsc::Sender<Vec<ServerMessage>>,
}

impl ClientSession {
    #[must_use]
    pub fn new(id: SessionId, outbound: mpsc::Sender<Vec<ServerMessage>>) -> Self {
        Self {
            id,
            client_name: None,
            state: SessionState::Accepted,
            outbound,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// # Errors
    /// Returns [`SessionError::InvalidTransition`] unless the session is
    /// currently [`SessionState::Accepted`].
    pub fn mark_introduced(&mut self, client_name: String) -> Result<(), SessionError> {
        if self.state != SessionState::Accepted {
            return Err(SessionError::InvalidTransition {
                current: self.state,
                attempted: SessionState::Introduced,
            });
        }
        self.client_name = Some(client_name);
        self.state = SessionState::Introduced;
        Ok(())
    }

    /// # Errors
    /// Returns [`SessionError::InvalidTransition`] unless the session is
    /// currently [`SessionState::Introduced`].
    pub fn mark_active(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Introduced {
            return Err(SessionError::InvalidTransition {
                current: self.state,
                attempted: SessionState::Active,
            });
        }
        self.state = SessionState::Active;
        Ok(())
    }

    pub fn mark_closed(&mut self) {
        self.state = SessionState::Closed;
    }

    /// Queue a batch of messages for delivery. Returns `false` if the
    /// queue is full or the receiver (the session's writer task) is gone,
    /// either of which means this session should be torn down.
    pub fn enqueue(&self, messages: Vec<ServerMessage>) -> bool {
        self.outbound.try_send(messages).is_ok()
    }

    /// How many batches are currently queued for this session.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        OUTBOUND_QUEUE_CAPACITY - self.outbound.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> (ClientSession, mpsc::Receiver<Vec<ServerMessage>>) {
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        (ClientSession::new(Uuid::nil(), tx), rx)
    }

    #[test]
    fn cannot_go_active_before_introduced() {
        let (mut s, _rx) = session();
        assert_eq!(
            s.mark_active(),
            Err(SessionError::InvalidTransition {
                current: SessionState::Accepted,
                attempted: SessionState::Active,
            })
        );
    }

    #[test]
    fn normal_lifecycle_succeeds_in_order() {
        let (mut s, _rx) = session();
        s.mark_introduced("probe".into()).unwrap();
        assert_eq!(s.state(), SessionState::Introduced);
        s.mark_active().unwrap();
        assert_eq!(s.state(), SessionState::Active);
        s.mark_closed();
        assert_eq!(s.state(), SessionState::Closed);
    }

    #[test]
    fn enqueue_after_receiver_drop_does_not_panic_and_reports_failure() {
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        let session = ClientSession::new(Uuid::nil(), tx);
        drop(rx);
        assert!(!session.enqueue(vec![ServerMessage::InitDone]));
    }

    #[test]
    fn enqueue_past_capacity_reports_failure_instead_of_blocking() {
        let (tx, _rx) = mpsc::channel(1);
        let session = ClientSession::new(Uuid::nil(), tx);
        assert!(session.enqueue(vec![ServerMessage::InitDone]));
        assert!(!session.enqueue(vec![ServerMessage::InitDone]));
    }
}
