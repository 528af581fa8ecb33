//! RelayHub: peer membership and broadcast fan-out.
//!
//! Every connected peer is registered under a random [`PeerId`] together with
//! the sending half of a bounded per-peer queue.  The peer's writer task
//! (infrastructure layer) drains the other half onto the socket.
//!
//! # Locking
//!
//! The membership map sits behind a `tokio::sync::RwLock`.  The lock is held
//! only to read or mutate the map and is always released before any frame is
//! handed to a peer.  Handing off a frame is a non-blocking `try_send`, so a
//! stalled peer can never delay delivery to the others or block a join.
//!
//! # Failure isolation
//!
//! Delivery problems are reported per peer as [`DeliveryError`]:
//!
//! - `QueueFull`: the peer is too slow; this one frame is dropped for that
//!   peer only and the peer stays connected.
//! - `Disconnected`: the peer's writer has gone away; the peer is removed.
//!
//! Neither affects the sender or the remaining peers.

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    RwLock,
};
use tracing::debug;
use uuid::Uuid;

use crate::domain::RelayFrame;

/// Identity of one connected peer.  Used only for set membership.
pub type PeerId = Uuid;

/// Why a frame did not reach one particular peer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("peer {0} is not keeping up; frame dropped")]
    QueueFull(PeerId),
    #[error("peer {0} has disconnected")]
    Disconnected(PeerId),
}

impl DeliveryError {
    /// The peer the failure concerns.
    pub fn peer(&self) -> PeerId {
        match self {
            DeliveryError::QueueFull(id) | DeliveryError::Disconnected(id) => *id,
        }
    }
}

/// Outcome of one broadcast.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FanOutReport {
    /// Peers the frame was queued for.
    pub delivered: usize,
    /// Peers the frame did not reach, and why.
    pub failures: Vec<DeliveryError>,
}

/// The receiving side handed to a newly joined peer.
#[derive(Debug)]
pub struct PeerMailbox {
    id: PeerId,
    outbound: mpsc::Receiver<RelayFrame>,
}

impl PeerMailbox {
    pub fn id(&self) -> PeerId {
        self.id
    }

    /// Waits for the next frame addressed to this peer.  Returns `None` once
    /// the peer has been removed from the hub.
    pub async fn recv(&mut self) -> Option<RelayFrame> {
        self.outbound.recv().await
    }

    /// Non-blocking variant of [`PeerMailbox::recv`].
    pub fn try_recv(&mut self) -> Option<RelayFrame> {
        self.outbound.try_recv().ok()
    }
}

/// The set of connected peers and the broadcast operation over it.
///
/// Share it between connection tasks with an `Arc`.
#[derive(Debug)]
pub struct RelayHub {
    peers: RwLock<HashMap<PeerId, mpsc::Sender<RelayFrame>>>,
    queue_depth: usize,
}

impl RelayHub {
    /// Creates an empty hub.  `queue_depth` is clamped to at least 1.
    pub fn new(queue_depth: usize) -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
            queue_depth: queue_depth.max(1),
        }
    }

    /// Registers a new peer.  It immediately becomes a broadcast target.
    pub async fn join(&self) -> PeerMailbox {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.queue_depth);
        self.peers.write().await.insert(id, tx);
        debug!("peer {id} joined");
        PeerMailbox { id, outbound: rx }
    }

    /// Removes a peer.  Returns `false` if it was not registered, which makes
    /// repeated calls harmless.
    pub async fn leave(&self, peer: PeerId) -> bool {
        let removed = self.peers.write().await.remove(&peer).is_some();
        if removed {
            debug!("peer {peer} left");
        }
        removed
    }

    /// Forwards `frame` to every registered peer except `sender`.
    ///
    /// The sender does not have to be registered itself.  Peers whose writer
    /// has already gone away are removed before this returns.
    pub async fn broadcast(&self, sender: PeerId, frame: RelayFrame) -> FanOutReport {
        // Snapshot the targets, then release the lock before touching any
        // peer queue.
        let targets: Vec<(PeerId, mpsc::Sender<RelayFrame>)> = {
            let peers = self.peers.read().await;
            peers
                .iter()
                .filter(|(id, _)| **id != sender)
                .map(|(id, tx)| (*id, tx.clone()))
                .collect()
        };

        let mut report = FanOutReport::default();
        for (id, tx) in targets {
            match tx.try_send(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => report.failures.push(DeliveryError::QueueFull(id)),
                Err(TrySendError::Closed(_)) => {
                    report.failures.push(DeliveryError::Disconnected(id))
                }
            }
        }

        let gone: Vec<PeerId> = report
            .failures
            .iter()
            .filter(|f| matches!(f, DeliveryError::Disconnected(_)))
            .map(DeliveryError::peer)
            .collect();
        if !gone.is_empty() {
            let mut peers = self.peers.write().await;
            for id in gone {
                peers.remove(&id);
            }
        }

        report
    }

    /// Number of currently registered peers.
    pub async fn peer_count(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Ids of the currently registered peers, in no particular order.
    pub async fn peer_ids(&self) -> Vec<PeerId> {
        self.peers.read().await.keys().copied().collect()
    }

    pub async fn contains(&self, peer: PeerId) -> bool {
        self.peers.read().await.contains_key(&peer)
    }
}

impl Default for RelayHub {
    fn default() -> Self {
        Self::new(64)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RelayFrame {
        RelayFrame::Text(s.to_string())
    }

    #[tokio::test]
    async fn test_join_registers_peer() {
        let hub = RelayHub::new(8);

        let mailbox = hub.join().await;

        assert_eq!(hub.peer_count().await, 1);
        assert!(hub.contains(mailbox.id()).await);
    }

    #[tokio::test]
    async fn test_join_assigns_distinct_ids() {
        let hub = RelayHub::new(8);
        let a = hub.join().await;
        let b = hub.join().await;
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_other_peer_but_not_sender() {
        // Arrange
        let hub = RelayHub::new(8);
        let mut a = hub.join().await;
        let mut b = hub.join().await;
        let mut c = hub.join().await;

        // Act
        let report = hub.broadcast(a.id(), text("hello")).await;

        // Assert
        assert_eq!(report.delivered, 2);
        assert!(report.failures.is_empty());
        assert_eq!(b.try_recv(), Some(text("hello")));
        assert_eq!(c.try_recv(), Some(text("hello")));
        assert_eq!(a.try_recv(), None, "sender must not receive its own frame");
    }

    #[tokio::test]
    async fn test_broadcast_forwards_binary_verbatim() {
        let hub = RelayHub::new(8);
        let a = hub.join().await;
        let mut b = hub.join().await;

        hub.broadcast(a.id(), RelayFrame::Binary(vec![0, 159, 255])).await;

        assert_eq!(b.recv().await, Some(RelayFrame::Binary(vec![0, 159, 255])));
    }

    #[tokio::test]
    async fn test_sender_mailbox_stays_pending_after_broadcast() {
        let hub = RelayHub::new(8);
        let mut a = hub.join().await;
        let _b = hub.join().await;
        let a_id = a.id();

        hub.broadcast(a_id, text("ping")).await;

        let mut recv = tokio_test::task::spawn(a.recv());
        tokio_test::assert_pending!(recv.poll());
    }

    #[tokio::test]
    async fn test_broadcast_with_single_peer_delivers_nothing() {
        let hub = RelayHub::new(8);
        let mut a = hub.join().await;

        let report = hub.broadcast(a.id(), text("alone")).await;

        assert_eq!(report.delivered, 0);
        assert_eq!(a.try_recv(), None);
    }

    #[tokio::test]
    async fn test_broadcast_from_unregistered_sender_reaches_everyone() {
        let hub = RelayHub::new(8);
        let mut a = hub.join().await;
        let mut b = hub.join().await;

        let report = hub.broadcast(Uuid::new_v4(), text("x")).await;

        assert_eq!(report.delivered, 2);
        assert!(a.try_recv().is_some());
        assert!(b.try_recv().is_some());
    }

    #[tokio::test]
    async fn test_disconnected_peer_does_not_affect_others() {
        // Arrange: c's receiving side is gone.
        let hub = RelayHub::new(8);
        let a = hub.join().await;
        let mut b = hub.join().await;
        let c = hub.join().await;
        let c_id = c.id();
        drop(c);

        // Act
        let report = hub.broadcast(a.id(), text("frame")).await;

        // Assert
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failures, vec![DeliveryError::Disconnected(c_id)]);
        assert_eq!(b.try_recv(), Some(text("frame")));
        assert!(hub.contains(a.id()).await, "sender stays connected");
        assert!(!hub.contains(c_id).await, "dead peer is removed");
        assert_eq!(hub.peer_count().await, 2);
    }

    #[tokio::test]
    async fn test_full_queue_drops_frame_for_slow_peer_only() {
        // Arrange: queue depth 1, b never drains.
        let hub = RelayHub::new(1);
        let a = hub.join().await;
        let mut b = hub.join().await;
        let mut c = hub.join().await;
        hub.broadcast(a.id(), text("first")).await;
        assert_eq!(c.try_recv(), Some(text("first")));

        // Act
        let report = hub.broadcast(a.id(), text("second")).await;

        // Assert
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failures, vec![DeliveryError::QueueFull(b.id())]);
        assert_eq!(c.try_recv(), Some(text("second")));
        assert!(hub.contains(b.id()).await, "slow peer stays connected");
        assert_eq!(b.try_recv(), Some(text("first")));
        assert_eq!(b.try_recv(), None);
    }

    #[tokio::test]
    async fn test_leave_removes_peer_and_closes_mailbox() {
        let hub = RelayHub::new(8);
        let mut a = hub.join().await;

        assert!(hub.leave(a.id()).await);

        assert_eq!(hub.peer_count().await, 0);
        assert_eq!(a.recv().await, None);
    }

    #[tokio::test]
    async fn test_leave_twice_is_noop() {
        let hub = RelayHub::new(8);
        let a = hub.join().await;
        let b = hub.join().await;

        assert!(hub.leave(a.id()).await);
        assert!(!hub.leave(a.id()).await);

        assert_eq!(hub.peer_count().await, 1);
        assert!(hub.contains(b.id()).await);
    }

    #[test]
    fn test_leave_unknown_peer_is_noop() {
        tokio_test::block_on(async {
            let hub = RelayHub::new(8);
            let _a = hub.join().await;

            assert!(!hub.leave(Uuid::new_v4()).await);

            assert_eq!(hub.peer_count().await, 1);
        });
    }

    #[tokio::test]
    async fn test_left_peer_no_longer_receives() {
        let hub = RelayHub::new(8);
        let a = hub.join().await;
        let b = hub.join().await;
        let b_id = b.id();
        hub.leave(b_id).await;

        let report = hub.broadcast(a.id(), text("after")).await;

        assert_eq!(report.delivered, 0);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_peer_ids_lists_registered_peers() {
        let hub = RelayHub::new(8);
        let a = hub.join().await;
        let b = hub.join().await;

        let mut ids = hub.peer_ids().await;
        ids.sort();
        let mut expected = vec![a.id(), b.id()];
        expected.sort();

        assert_eq!(ids, expected);
    }

    #[test]
    fn test_zero_queue_depth_is_clamped() {
        let hub = RelayHub::new(0);
        assert_eq!(hub.queue_depth, 1);
    }
}
