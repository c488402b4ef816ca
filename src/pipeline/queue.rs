//! Bounded FIFO queues with a shutdown sentinel.
//!
//! Both producer/consumer boundaries of the pipeline (audio chunker →
//! transcription worker, transcription worker → render loop) use the same
//! queue type, built on `crossbeam_channel::bounded`.
//!
//! # Overflow policy
//!
//! [`QueueSender::send`] never blocks: when the queue is full the item is
//! rejected with [`QueueSendError::Full`] and the **caller drops it**
//! (drop-newest).  This keeps the real-time producers from stalling while
//! ruling out silent unbounded growth.
//!
//! # Shutdown
//!
//! [`QueueSender::send_shutdown`] enqueues the reserved [`QueueItem::Shutdown`]
//! sentinel with a *blocking* send so delivery is guaranteed even when the
//! queue is full.  The sentinel is the sole stop mechanism for a consumer;
//! producers must be gated off before it is sent so nothing is enqueued
//! behind it.

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};
use thiserror::Error;

// ---------------------------------------------------------------------------
// QueueItem
// ---------------------------------------------------------------------------

/// A queue slot: either a payload or the reserved shutdown sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueItem<T> {
    /// A normal payload item.
    Item(T),
    /// Reserved sentinel — the consumer must stop after observing this.
    Shutdown,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Non-blocking send failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueSendError {
    /// The queue is at capacity; the item was dropped (drop-newest policy).
    #[error("queue full — item dropped")]
    Full,
    /// The consumer end has been dropped.
    #[error("queue receiver disconnected")]
    Disconnected,
}

/// Receive failure for [`QueueReceiver::recv_timeout`] and
/// [`QueueReceiver::try_recv`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueRecvError {
    /// No item arrived within the timeout (or the queue was empty for
    /// `try_recv`).
    #[error("queue empty")]
    Empty,
    /// All producer ends have been dropped.
    #[error("queue sender disconnected")]
    Disconnected,
}

// ---------------------------------------------------------------------------
// Constructor
// ---------------------------------------------------------------------------

/// Create a bounded FIFO queue with the given capacity.
///
/// # Panics
///
/// Panics if `capacity == 0` — a zero-capacity rendezvous channel would make
/// the non-blocking [`QueueSender::send`] reject every item.
pub fn bounded_queue<T>(capacity: usize) -> (QueueSender<T>, QueueReceiver<T>) {
    assert!(capacity > 0, "queue capacity must be > 0");
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    (QueueSender { tx }, QueueReceiver { rx })
}

// ---------------------------------------------------------------------------
// QueueSender
// ---------------------------------------------------------------------------

/// Producer handle.  Cheap to clone.
#[derive(Debug, Clone)]
pub struct QueueSender<T> {
    tx: Sender<QueueItem<T>>,
}

impl<T> QueueSender<T> {
    /// Enqueue `item` without blocking.
    ///
    /// Returns [`QueueSendError::Full`] when the queue is at capacity; the
    /// item is dropped and the caller is expected to log the drop.
    pub fn send(&self, item: T) -> Result<(), QueueSendError> {
        match self.tx.try_send(QueueItem::Item(item)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(QueueSendError::Full),
            Err(TrySendError::Disconnected(_)) => Err(QueueSendError::Disconnected),
        }
    }

    /// Enqueue the shutdown sentinel, blocking until there is room.
    ///
    /// Blocking is intentional: the consumer keeps draining, so the sentinel
    /// is guaranteed to be delivered behind any in-flight items.  Returns
    /// [`QueueSendError::Disconnected`] when the consumer is already gone,
    /// which callers may treat as "already shut down".
    pub fn send_shutdown(&self) -> Result<(), QueueSendError> {
        self.tx
            .send(QueueItem::Shutdown)
            .map_err(|_| QueueSendError::Disconnected)
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    /// Returns `true` when the queue holds no items.
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    /// The fixed capacity this queue was created with.
    pub fn capacity(&self) -> usize {
        // bounded_queue always passes Some(capacity).
        self.tx.capacity().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// QueueReceiver
// ---------------------------------------------------------------------------

/// Consumer handle.
#[derive(Debug)]
pub struct QueueReceiver<T> {
    rx: Receiver<QueueItem<T>>,
}

impl<T> QueueReceiver<T> {
    /// Block up to `timeout` for the next item.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<QueueItem<T>, QueueRecvError> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            crossbeam_channel::RecvTimeoutError::Timeout => QueueRecvError::Empty,
            crossbeam_channel::RecvTimeoutError::Disconnected => QueueRecvError::Disconnected,
        })
    }

    /// Non-blocking receive — returns immediately when the queue is empty.
    ///
    /// The render loop uses this exclusively so a frame never waits on the
    /// transcription worker.
    pub fn try_recv(&self) -> Result<QueueItem<T>, QueueRecvError> {
        self.rx.try_recv().map_err(|e| match e {
            TryRecvError::Empty => QueueRecvError::Empty,
            TryRecvError::Disconnected => QueueRecvError::Disconnected,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- FIFO ordering -----------------------------------------------------

    #[test]
    fn items_are_received_in_send_order() {
        let (tx, rx) = bounded_queue(8);
        tx.send(1).unwrap();
        tx.send(2).unwrap();
        tx.send(3).unwrap();

        assert_eq!(rx.try_recv(), Ok(QueueItem::Item(1)));
        assert_eq!(rx.try_recv(), Ok(QueueItem::Item(2)));
        assert_eq!(rx.try_recv(), Ok(QueueItem::Item(3)));
    }

    #[test]
    fn sentinel_is_delivered_after_earlier_items() {
        let (tx, rx) = bounded_queue(8);
        tx.send("a").unwrap();
        tx.send_shutdown().unwrap();

        assert_eq!(rx.try_recv(), Ok(QueueItem::Item("a")));
        assert_eq!(rx.try_recv(), Ok(QueueItem::Shutdown));
    }

    // ---- Overflow (drop-newest) --------------------------------------------

    #[test]
    fn send_to_full_queue_returns_full() {
        let (tx, rx) = bounded_queue(2);
        tx.send(1).unwrap();
        tx.send(2).unwrap();
        assert_eq!(tx.send(3), Err(QueueSendError::Full));

        // The first two items survive unchanged.
        assert_eq!(rx.try_recv(), Ok(QueueItem::Item(1)));
        assert_eq!(rx.try_recv(), Ok(QueueItem::Item(2)));
        assert_eq!(rx.try_recv(), Err(QueueRecvError::Empty));
    }

    #[test]
    fn send_after_drain_succeeds_again() {
        let (tx, rx) = bounded_queue(1);
        tx.send(1).unwrap();
        assert_eq!(tx.send(2), Err(QueueSendError::Full));

        assert_eq!(rx.try_recv(), Ok(QueueItem::Item(1)));
        tx.send(3).unwrap();
        assert_eq!(rx.try_recv(), Ok(QueueItem::Item(3)));
    }

    // ---- Receive semantics -------------------------------------------------

    #[test]
    fn try_recv_on_empty_returns_empty() {
        let (_tx, rx) = bounded_queue::<u8>(4);
        assert_eq!(rx.try_recv(), Err(QueueRecvError::Empty));
    }

    #[test]
    fn recv_timeout_expires_on_empty_queue() {
        let (_tx, rx) = bounded_queue::<u8>(4);
        let result = rx.recv_timeout(Duration::from_millis(10));
        assert_eq!(result, Err(QueueRecvError::Empty));
    }

    #[test]
    fn recv_reports_disconnect_when_all_senders_dropped() {
        let (tx, rx) = bounded_queue::<u8>(4);
        drop(tx);
        assert_eq!(rx.try_recv(), Err(QueueRecvError::Disconnected));
    }

    #[test]
    fn send_reports_disconnect_when_receiver_dropped() {
        let (tx, rx) = bounded_queue(4);
        drop(rx);
        assert_eq!(tx.send(1), Err(QueueSendError::Disconnected));
        assert_eq!(tx.send_shutdown(), Err(QueueSendError::Disconnected));
    }

    // ---- Introspection -----------------------------------------------------

    #[test]
    fn len_and_capacity_track_queue_state() {
        let (tx, rx) = bounded_queue(4);
        assert!(tx.is_empty());
        assert_eq!(tx.capacity(), 4);

        tx.send(1).unwrap();
        tx.send(2).unwrap();
        assert_eq!(tx.len(), 2);

        let _ = rx.try_recv();
        assert_eq!(tx.len(), 1);
    }

    #[test]
    #[should_panic(expected = "queue capacity must be > 0")]
    fn zero_capacity_panics() {
        let _ = bounded_queue::<u8>(0);
    }

    // ---- Cross-thread use --------------------------------------------------

    #[test]
    fn queue_endpoints_are_send() {
        fn assert_send<T: Send>() {}
        assert_send::<QueueSender<Vec<f32>>>();
        assert_send::<QueueReceiver<Vec<f32>>>();
    }

    #[test]
    fn consumer_thread_observes_items_then_sentinel() {
        let (tx, rx) = bounded_queue(4);
        let consumer = std::thread::spawn(move || {
            let mut seen = Vec::new();
            loop {
                match rx.recv_timeout(Duration::from_secs(5)) {
                    Ok(QueueItem::Item(v)) => seen.push(v),
                    Ok(QueueItem::Shutdown) => break,
                    Err(e) => panic!("unexpected recv error: {e}"),
                }
            }
            seen
        });

        tx.send(10).unwrap();
        tx.send(20).unwrap();
        tx.send_shutdown().unwrap();

        assert_eq!(consumer.join().unwrap(), vec![10, 20]);
    }
}
