use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::{
    ActorFuture, ActorId, ActorRef, Call, Dispatch, Error, Mailbox, Message, Request, Result,
    SuffixCache, SystemEvent, actor::builtin,
};

/// Caller-side handle to a running actor.
///
/// Every method call on the proxy becomes a message in the actor's mailbox.
/// Three dispatch modes are available:
///
/// - [`invoke`](ActorProxy::invoke): send and wait for the reply
/// - [`invoke_async`](ActorProxy::invoke_async): send and return immediately
/// - [`invoke_future`](ActorProxy::invoke_future): send and collect the reply later
///
/// [`forward`](ActorProxy::forward) picks the mode from the method name:
/// names ending in `!` are sent without waiting, everything else waits.
///
/// Proxies are cheap to clone and safe to share between tasks. The proxy
/// never owns the actor; dropping every proxy does not stop it.
///
/// ```rust,ignore
/// let proxy = ActorBuilder::new(Doubler).spawn();
/// let ten = proxy.invoke(Call::new("process").with_arg(5)).await?;
/// proxy.forward(Call::new("process!").with_arg(7)).await?; // returns at once
/// proxy.terminate_and_wait().await?;
/// ```
#[derive(Clone)]
pub struct ActorProxy {
    id: ActorId,
    mailbox: Mailbox<Message>,
    task: tokio::task::Id,
    class_label: Arc<str>,
    suffixes: Arc<SuffixCache>,
}

impl ActorProxy {
    pub fn new(actor: ActorRef) -> Self {
        Self {
            id: actor.id,
            mailbox: actor.mailbox,
            task: actor.task,
            class_label: actor.class_label,
            suffixes: Arc::new(SuffixCache::new()),
        }
    }

    fn send(&self, call: Call, reply: Option<oneshot::Sender<Result<Value>>>) -> Result<()> {
        let method = call.method().to_owned();
        self.mailbox
            .push(Message::Request(Request::new(call, reply)))
            .map_err(|_| {
                Error::dead(format!(
                    "attempted to call '{method}' on a dead actor ({})",
                    self.class_label
                ))
            })
    }

    /// Call a method and wait for its result.
    ///
    /// Fails with [`Error::DeadActor`] if the actor is dead when the call is
    /// sent or terminates before answering. Errors raised by the method
    /// itself are returned unchanged.
    pub async fn invoke(&self, call: impl Into<Call>) -> Result<Value> {
        let (tx, rx) = oneshot::channel();
        self.send(call.into(), Some(tx))?;
        rx.await?
    }

    /// Call a method without waiting for it to run.
    pub fn invoke_async(&self, call: impl Into<Call>) -> Result<()> {
        self.send(call.into(), None)
    }

    /// Call a method and return a handle resolving to its result.
    pub fn invoke_future(&self, call: impl Into<Call>) -> Result<ActorFuture> {
        let (tx, rx) = oneshot::channel();
        self.send(call.into(), Some(tx))?;
        Ok(ActorFuture::new(rx))
    }

    /// Dispatch `call` according to its method name.
    ///
    /// A name ending in `!` is stripped of the suffix and sent with
    /// [`invoke_async`](ActorProxy::invoke_async); the call then resolves to
    /// `Value::Null` without waiting. Any other name goes through
    /// [`invoke`](ActorProxy::invoke). Whether the actor supports the method
    /// is decided by the actor, not here.
    pub async fn forward(&self, call: impl Into<Call>) -> Result<Value> {
        let call = call.into();
        match self.suffixes.dispatch(call.method()) {
            Dispatch::Async(plain) => {
                self.invoke_async(call.renamed(plain))?;
                Ok(Value::Null)
            }
            Dispatch::Sync => self.invoke(call).await,
        }
    }

    async fn invoke_as<T: DeserializeOwned>(&self, call: Call) -> Result<T> {
        let value = self.invoke(call).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Class name reported by the wrapped object.
    pub async fn class_name(&self) -> Result<String> {
        self.invoke_as(Call::new(builtin::CLASS)).await
    }

    /// Name the actor was spawned with.
    pub async fn name(&self) -> Result<String> {
        self.invoke_as(Call::new(builtin::NAME)).await
    }

    pub async fn is_a(&self, class: &str) -> Result<bool> {
        self.invoke_as(Call::new(builtin::IS_A).with_arg(class)).await
    }

    /// Whether the wrapped object answers `method`.
    pub async fn responds_to(&self, method: &str) -> Result<bool> {
        self.invoke_as(Call::new(builtin::RESPOND_TO).with_arg(method))
            .await
    }

    /// All methods the wrapped object answers, built-ins included.
    pub async fn methods(&self) -> Result<Vec<String>> {
        self.invoke_as(Call::new(builtin::METHODS)).await
    }

    pub async fn to_s(&self) -> Result<String> {
        self.invoke_as(Call::new(builtin::TO_S)).await
    }

    /// Detailed description of the wrapped object.
    ///
    /// Unlike the other calls this never fails with [`Error::DeadActor`]:
    /// a dead actor is described as `#<Actor(ClassName) dead>`, using the
    /// class name captured when the proxy was created.
    pub async fn describe(&self) -> Result<String> {
        match self.invoke_as(Call::new(builtin::INSPECT)).await {
            Err(Error::DeadActor(_)) => Ok(format!("#<Actor({}) dead>", self.class_label)),
            other => other,
        }
    }

    /// Whether the actor is still running. Reads the mailbox flag, no
    /// message is sent.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.mailbox.is_alive()
    }

    /// Ask the actor to exit once it reaches this request. Does not wait.
    pub fn request_termination(&self) -> Result<()> {
        if !self.is_alive() {
            return Err(Error::dead("actor already terminated"));
        }
        self.mailbox
            .push(Message::System(SystemEvent::Terminate))
            .map_err(|_| Error::dead("actor already terminated"))
    }

    /// Ask the actor to exit and yield until it has.
    pub async fn terminate_and_wait(&self) -> Result<()> {
        self.request_termination()?;
        while self.is_alive() {
            tokio::task::yield_now().await;
        }
        Ok(())
    }

    #[inline]
    pub fn id(&self) -> &ActorId {
        &self.id
    }

    /// Id of the Tokio task running the actor. For diagnostics only.
    #[inline]
    pub fn task_id(&self) -> tokio::task::Id {
        self.task
    }

    /// Class name captured when the proxy was created.
    #[inline]
    pub fn class_label(&self) -> &str {
        &self.class_label
    }
}

impl PartialEq for ActorProxy {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl std::fmt::Debug for ActorProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorProxy")
            .field("id", &self.id)
            .field("class", &self.class_label)
            .field("alive", &self.is_alive())
            .finish()
    }
}
