use std::{any::Any, future::Future, panic::AssertUnwindSafe, sync::Arc};

use futures_util::FutureExt;
use serde_json::Value;

use crate::{
    Actor, Call, Context, Error, ExitSignal, Link, Mailbox, Message, Request, Result, SystemEvent,
    actor::builtin,
};

pub(crate) struct ActorHandler<A: Actor> {
    pub(crate) actor: A,
    pub(crate) mailbox: Mailbox<Message>,
    pub(crate) ctx: Context,
    pub(crate) links: Vec<Arc<dyn Link>>,
    pub(crate) yield_every: usize,
}

impl<A: Actor> ActorHandler<A> {
    pub async fn run(mut self) {
        let mut reason = self.process().await.err();
        // Pending callers get DeadActor once their reply senders drop.
        drop(self.mailbox.close());

        if reason.is_none() {
            reason = guarded(self.actor.on_shutdown()).await.err();
        }

        match &reason {
            None => tracing::debug!(actor = %self.ctx.id, "actor exited"),
            Some(err) => tracing::warn!(actor = %self.ctx.id, reason = %err, "actor crashed"),
        }

        let signal = ExitSignal {
            actor: self.ctx.id.clone(),
            reason,
        };
        for link in &self.links {
            link.notify(signal.clone());
        }
    }

    /// Runs until a clean exit (`Ok`) or a crash (`Err` with the reason).
    async fn process(&mut self) -> Result<()> {
        guarded(self.actor.on_start(&self.ctx)).await?;

        let mut cnt = 0;
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                Message::System(SystemEvent::Terminate) => break,
                Message::Request(request) => self.handle_request(request).await?,
            }
            if self.ctx.stop_requested() {
                break;
            }
            cnt += 1;
            if cnt == self.yield_every {
                cnt = 0;
                tokio::task::yield_now().await;
            }
        }
        Ok(())
    }

    async fn handle_request(&mut self, request: Request) -> Result<()> {
        let Request { call, reply } = request;

        // Built-ins never crash the actor: their only failures are bad arguments.
        let (result, crash) = match self.builtin(&call) {
            Some(result) => (result, None),
            None => {
                let result = guarded(self.actor.handle_call(&call, &self.ctx)).await;
                let crash = match &result {
                    Ok(_) => None,
                    Err(err @ Error::Panicked(_)) => Some(err.clone()),
                    Err(err) if err.is_caller_error() => None,
                    Err(err) => self.actor.on_error(err.clone()).err(),
                };
                (result, crash)
            }
        };

        // The caller must observe the actor as dead by the time it has the
        // reply, so a supervisor checking liveness won't reuse it.
        if crash.is_some() || self.ctx.stop_requested() {
            drop(self.mailbox.close());
        }
        if let Some(reply) = reply {
            let _ = reply.send(result);
        }

        match crash {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// Answers reflective calls from the wrapped object's trait impl.
    fn builtin(&self, call: &Call) -> Option<Result<Value>> {
        let actor = &self.actor;
        let result = match call.method() {
            builtin::CLASS => Ok(Value::from(actor.class_name().as_ref())),
            builtin::NAME => Ok(Value::from(self.ctx.name())),
            builtin::IS_A => call
                .arg::<String>(0)
                .map(|class| Value::Bool(class == actor.class_name())),
            builtin::RESPOND_TO => call.arg::<String>(0).map(|method| {
                let known = builtin::ALL.iter().chain(actor.methods()).any(|m| *m == method);
                Value::Bool(known)
            }),
            builtin::METHODS => Ok(Value::from(
                actor
                    .methods()
                    .iter()
                    .chain(builtin::ALL)
                    .map(|m| Value::from(*m))
                    .collect::<Vec<_>>(),
            )),
            builtin::INSPECT => Ok(Value::from(actor.inspect())),
            builtin::TO_S => Ok(Value::from(actor.to_s())),
            _ => return None,
        };
        Some(result)
    }
}

/// Runs `fut`, turning a panic into [`Error::Panicked`].
async fn guarded<T>(fut: impl Future<Output = Result<T>>) -> Result<T> {
    AssertUnwindSafe(fut)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(Error::Panicked(panic_message(payload))))
}

fn panic_message(payload: Box<dyn Any + Send>) -> Arc<str> {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        Arc::from(*msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        Arc::from(msg.as_str())
    } else {
        Arc::from("unknown panic payload")
    }
}
