//! Fan-out and targeted delivery of outbound message batches.
//!
//! The session map is a [`DashMap`]: cheap, lock-striped concurrent access.
//! In practice only the core loop ever mutates it — this just means a
//! session lookup never contends with a concurrent insert/remove from the
//! same thread doing something else.

use dashmap::DashMap;

use noodles_wire::ServerMessage;

use crate::session::{ClientSession, SessionId};

/// Holds every connected session and fans broadcasts out to them in
/// insertion-independent, causally-ordered delivery: each session's queue
/// is FIFO, so two messages broadcast in sequence always arrive at every
/// session in that same relative order.
#[derive(Default)]
pub struct BroadcastEngine {
    sessions: DashMap<SessionId, ClientSession>,
}

impl BroadcastEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: ClientSession) {
        self.sessions.insert(session.id, session);
    }

    pub fn remove(&self, id: SessionId) -> Option<ClientSession> {
        self.sessions.remove(&id).map(|(_, session)| session)
    }

    #[must_use]
    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn with_session<R>(&self, id: SessionId, f: impl FnOnce(&mut ClientSession) -> R) -> Option<R> {
        self.sessions.get_mut(&id).map(|mut entry| f(&mut entry))
    }

    /// Deliver `messages` to every currently connected session. A session
    /// whose queue is full or whose writer task has gone away is removed:
    /// a slow or dead client never blocks delivery to everyone else.
    pub fn broadcast(&self, messages: Vec<ServerMessage>) {
        if messages.is_empty() {
            return;
        }
        let mut dead = Vec::new();
        for entry in &self.sessions {
            if !entry.value().enqueue(messages.clone()) {
                dead.push(*entry.key());
            }
        }
        for id in dead {
            self.sessions.remove(&id);
        }
    }

    /// Deliver `messages` to a single session, if it's still connected.
    /// Torn down the same way as [`broadcast`](Self::broadcast) on failure.
    pub fn send_to(&self, id: SessionId, messages: Vec<ServerMessage>) {
        let failed = self
            .sessions
            .get(&id)
            .map(|entry| !entry.enqueue(messages))
            .unwrap_or(false);
        if failed {
            self.sessions.remove(&id);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Whether every session's outbound queue has been fully delivered.
    #[must_use]
    pub fn all_queues_drained(&self) -> bool {
        self.sessions.iter().all(|entry| entry.value().queue_len() == 0)
    }

    /// Disconnect every session. Dropping a session's outbound sender ends
    /// its writer task's receive loop, which closes the websocket itself.
    pub fn close_all(&self) {
        let ids: Vec<SessionId> = self.sessions.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            self.sessions.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    use crate::session::OUTBOUND_QUEUE_CAPACITY;

    fn channel() -> (mpsc::Sender<Vec<ServerMessage>>, mpsc::Receiver<Vec<ServerMessage>>) {
        mpsc::channel(OUTBOUND_QUEUE_CAPACITY)
    }

    #[test]
    fn broadcast_reaches_every_connected_session() {
        let engine = BroadcastEngine::new();
        let (tx_a, mut rx_a) = channel();
        let (tx_b, mut rx_b) = channel();
        engine.insert(ClientSession::new(Uuid::new_v4(), tx_a));
        engine.insert(ClientSession::new(Uuid::new_v4(), tx_b));

        engine.broadcast(vec![ServerMessage::InitDone]);

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn send_to_reaches_only_the_named_session() {
        let engine = BroadcastEngine::new();
        let (tx_a, mut rx_a) = channel();
        let (tx_b, mut rx_b) = channel();
        let id_a = Uuid::new_v4();
        engine.insert(ClientSession::new(id_a, tx_a));
        engine.insert(ClientSession::new(Uuid::new_v4(), tx_b));

        engine.send_to(id_a, vec![ServerMessage::InitDone]);

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn removed_session_no_longer_receives_broadcasts() {
        let engine = BroadcastEngine::new();
        let (tx, mut rx) = channel();
        let id = Uuid::new_v4();
        engine.insert(ClientSession::new(id, tx));
        engine.remove(id);

        engine.broadcast(vec![ServerMessage::InitDone]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn a_session_whose_queue_is_full_is_dropped_on_broadcast() {
        let engine = BroadcastEngine::new();
        let (tx, _rx) = mpsc::channel(1);
        let id = Uuid::new_v4();
        engine.insert(ClientSession::new(id, tx));

        engine.broadcast(vec![ServerMessage::InitDone]);
        assert!(engine.contains(id));
        engine.broadcast(vec![ServerMessage::InitDone]);
        assert!(!engine.contains(id));
    }
}
