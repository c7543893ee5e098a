use serde_json::Value;
use tokio::sync::oneshot;

use crate::{Call, Result};

pub(crate) type Reply = oneshot::Sender<Result<Value>>;

/// A call waiting in an actor's mailbox.
///
/// Calls made with [`invoke_async`](crate::ActorProxy::invoke_async) carry
/// no reply channel.
pub struct Request {
    pub(crate) call: Call,
    pub(crate) reply: Option<Reply>,
}

impl Request {
    pub(crate) fn new(call: Call, reply: Option<Reply>) -> Self {
        Self { call, reply }
    }
}

/// Events handled by the runtime rather than by the wrapped object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEvent {
    /// Exit cleanly once this event is reached in the mailbox.
    Terminate,
}

/// Everything an actor's mailbox can hold.
pub enum Message {
    Request(Request),
    System(SystemEvent),
}
