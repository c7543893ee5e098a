use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

struct MailboxInner<T> {
    queue: Mutex<VecDeque<T>>,
    notify: Notify,
    alive: CancellationToken,
}

/// Unbounded FIFO queue feeding a single actor loop.
///
/// Any number of producers may [`push`](Mailbox::push); exactly one consumer
/// (the owning actor) receives. Besides plain FIFO [`recv`](Mailbox::recv)
/// the consumer can wait for the first message matching a predicate with
/// [`recv_matching`](Mailbox::recv_matching), leaving everything else queued
/// in its original order.
///
/// The mailbox also carries the actor's liveness flag. Once closed it stays
/// closed: pushes are rejected and the queued messages are handed back to
/// whoever closed it.
pub struct Mailbox<T> {
    inner: Arc<MailboxInner<T>>,
}

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MailboxInner {
                queue: Mutex::new(VecDeque::new()),
                notify: Notify::new(),
                alive: CancellationToken::new(),
            }),
        }
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.inner
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue a message. A closed mailbox rejects it and hands it back.
    pub fn push(&self, msg: T) -> Result<(), T> {
        let mut queue = self.queue();
        if self.inner.alive.is_cancelled() {
            return Err(msg);
        }
        queue.push_back(msg);
        drop(queue);
        self.inner.notify.notify_one();
        Ok(())
    }

    /// Wait for the next message in FIFO order.
    ///
    /// Returns `None` once the mailbox is closed.
    pub async fn recv(&self) -> Option<T> {
        self.recv_matching(|_| true).await
    }

    /// Wait for the first queued message accepted by `pred`.
    ///
    /// Messages rejected by the predicate are neither consumed nor reordered.
    /// Returns `None` once the mailbox is closed.
    pub async fn recv_matching<F>(&self, mut pred: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        loop {
            if let Some(msg) = self.take_matching(&mut pred) {
                return Some(msg);
            }
            if !self.is_alive() {
                return None;
            }
            // A push between the check above and this await leaves a permit
            // in `notify`, so the wakeup is not lost.
            tokio::select! {
                _ = self.inner.notify.notified() => {}
                _ = self.inner.alive.cancelled() => {}
            }
        }
    }

    fn take_matching<F>(&self, pred: &mut F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut queue = self.queue();
        let pos = queue.iter().position(|msg| pred(msg))?;
        queue.remove(pos)
    }

    /// Mark the mailbox dead and return whatever was still queued.
    pub fn close(&self) -> Vec<T> {
        let mut queue = self.queue();
        self.inner.alive.cancel();
        queue.drain(..).collect()
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.inner.alive.is_cancelled()
    }

    /// Resolves once the mailbox has been closed.
    pub async fn closed(&self) {
        self.inner.alive.cancelled().await
    }

    pub fn len(&self) -> usize {
        self.queue().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_fifo_order() {
        let mailbox = Mailbox::new();
        for i in 0..3 {
            mailbox.push(i).unwrap();
        }
        assert_eq!(mailbox.recv().await, Some(0));
        assert_eq!(mailbox.recv().await, Some(1));
        assert_eq!(mailbox.recv().await, Some(2));
        assert!(mailbox.is_empty());
    }

    #[tokio::test]
    async fn test_recv_matching_leaves_others_in_place() {
        let mailbox = Mailbox::new();
        for i in [1, 3, 4, 5, 6] {
            mailbox.push(i).unwrap();
        }
        assert_eq!(mailbox.recv_matching(|n| n % 2 == 0).await, Some(4));
        assert_eq!(mailbox.len(), 4);
        assert_eq!(mailbox.recv().await, Some(1));
        assert_eq!(mailbox.recv().await, Some(3));
        assert_eq!(mailbox.recv().await, Some(5));
    }

    #[tokio::test]
    async fn test_recv_matching_waits_for_a_match() {
        let mailbox = Mailbox::new();
        let producer = mailbox.clone();
        let handle = tokio::spawn(async move {
            producer.push("noise").unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
            producer.push("signal").unwrap();
        });

        let got = timeout(Duration::from_secs(1), mailbox.recv_matching(|m| *m == "signal"))
            .await
            .unwrap();
        assert_eq!(got, Some("signal"));
        assert_eq!(mailbox.recv().await, Some("noise"));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_close_rejects_and_drains() {
        let mailbox = Mailbox::new();
        mailbox.push(1).unwrap();
        mailbox.push(2).unwrap();
        assert_eq!(mailbox.close(), vec![1, 2]);
        assert!(!mailbox.is_alive());
        assert_eq!(mailbox.push(3), Err(3));
        assert_eq!(mailbox.recv().await, None);
    }

    #[tokio::test]
    async fn test_close_wakes_waiting_receiver() {
        let mailbox = Mailbox::<u8>::new();
        let closer = mailbox.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            closer.close();
        });
        let got = timeout(Duration::from_secs(1), mailbox.recv()).await.unwrap();
        assert_eq!(got, None);
    }
}
