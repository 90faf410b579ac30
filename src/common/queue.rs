//! Message queue for session change notifications.

use std::sync::Arc;

use crate::{FormflowError, Result};

/// Bounded MPMC (multi-producer, multi-consumer) queue.
///
/// Sending never blocks: a full queue rejects the message instead, so a slow
/// subscriber cannot stall request processing.
/// Backed by flume for high-performance message passing.
#[derive(Clone)]
pub struct Queue<T> {
    receiver: Arc<flume::Receiver<T>>,
    sender: Arc<flume::Sender<T>>,
}

impl<T> Queue<T> {
    /// create a new queue
    pub fn new(cap: usize) -> Arc<Self> {
        let (tx, rx) = flume::bounded(cap);

        Arc::new(Self {
            receiver: Arc::new(rx),
            sender: Arc::new(tx),
        })
    }

    /// receive a message without waiting
    pub fn try_next(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// drain every queued message
    pub fn drain(&self) -> Vec<T> {
        self.receiver.drain().collect()
    }

    /// send a message to the queue
    pub fn send(
        &self,
        msg: T,
    ) -> Result<()> {
        self.sender.try_send(msg).map_err(|e| FormflowError::Queue(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::Queue;

    #[test]
    fn test_queue_rejects_when_full() {
        let queue = Queue::new(2);
        queue.send(1).unwrap();
        queue.send(2).unwrap();
        assert!(queue.send(3).is_err());

        assert_eq!(queue.try_next(), Some(1));
        assert_eq!(queue.drain(), vec![2]);
        assert_eq!(queue.try_next(), None);
    }
}
