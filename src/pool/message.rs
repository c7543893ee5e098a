use serde_json::Value;
use tokio::sync::oneshot;

use super::PoolStatus;
use crate::{ActorProxy, Call, Error, ExitSignal, Result, message::Reply};

/// Messages that can put a worker back into the idle queue.
pub(crate) enum Availability {
    /// A forwarded call finished; the worker may or may not have survived it.
    Completed {
        worker: ActorProxy,
        result: Result<Value>,
        reply: Option<Reply>,
    },
    /// A linked worker terminated.
    Exit(ExitSignal),
}

pub(crate) enum PoolMessage {
    Execute { call: Call, reply: Option<Reply> },
    Available(Availability),
    Status(oneshot::Sender<PoolStatus>),
    Terminate,
}

impl PoolMessage {
    /// Messages accepted while the manager waits for a free worker.
    pub(crate) fn is_availability(&self) -> bool {
        matches!(self, PoolMessage::Available(_))
    }

    /// Settle a message the manager will never process.
    pub(crate) fn reject(self) {
        match self {
            PoolMessage::Execute {
                reply: Some(reply), ..
            } => {
                let _ = reply.send(Err(Error::dead("worker pool terminated")));
            }
            PoolMessage::Available(Availability::Completed {
                worker,
                result,
                reply,
            }) => {
                let _ = worker.request_termination();
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
            _ => {}
        }
    }
}
