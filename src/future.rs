use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use serde_json::Value;
use tokio::sync::oneshot;

use crate::Result;

/// Result of a call that the caller chose not to wait for yet.
///
/// Returned by [`ActorProxy::invoke_future`](crate::ActorProxy::invoke_future)
/// and [`WorkerPool::execute_future`](crate::WorkerPool::execute_future). The
/// call is already queued; awaiting the future only collects the reply.
/// Resolves to [`Error::DeadActor`](crate::Error::DeadActor) if the actor
/// terminated without answering.
#[must_use = "the reply is lost unless the future is awaited"]
pub struct ActorFuture {
    rx: oneshot::Receiver<Result<Value>>,
}

impl ActorFuture {
    pub(crate) fn new(rx: oneshot::Receiver<Result<Value>>) -> Self {
        Self { rx }
    }

    /// Wait for the reply.
    pub async fn value(self) -> Result<Value> {
        self.await
    }
}

impl Future for ActorFuture {
    type Output = Result<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|res| match res {
            Ok(reply) => reply,
            Err(closed) => Err(closed.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolves_to_reply() {
        let (tx, rx) = oneshot::channel();
        let future = ActorFuture::new(rx);
        tx.send(Ok(Value::from(42))).unwrap();
        assert_eq!(future.value().await.unwrap(), Value::from(42));
    }

    #[tokio::test]
    async fn test_dropped_sender_is_dead_actor() {
        let (tx, rx) = oneshot::channel();
        drop(tx);
        let err = ActorFuture::new(rx).await.unwrap_err();
        assert!(err.is_dead_actor());
    }
}
