//! Fixed-size pools of supervised worker actors.
//!
//! A [`WorkerPool`] is a handle to a manager actor that owns a set of
//! workers built from an [`ActorClass`]. Each [`execute`](WorkerPool::execute)
//! borrows one idle worker, forwards the call to it and returns the worker to
//! the idle queue afterwards.
//!
//! # Saturation
//!
//! When every worker is busy the manager stops taking new requests and only
//! waits for a worker to come back. New requests queue up in the manager's
//! mailbox, so saturation shows up as latency, never as an error.
//!
//! # Supervision
//!
//! Workers are linked to the manager. A worker that crashes is replaced by a
//! fresh one built with the same spawn arguments. A worker that exits
//! cleanly is not replaced and the pool shrinks by one.
//!
//! # Example
//!
//! ```rust,ignore
//! let class = ActorClass::new("Doubler", &["process"], |_| Ok(Doubler));
//! let pool = WorkerPool::new(class, PoolConfig::default().with_size(2))?;
//!
//! let (a, b) = tokio::join!(
//!     pool.execute(Call::new("process").with_arg(5)),
//!     pool.execute(Call::new("process").with_arg(7)),
//! );
//! assert_eq!((a?, b?), (json!(10), json!(14)));
//! ```

mod config;
mod manager;
mod message;

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::oneshot;

pub use config::{MIN_POOL_SIZE, PoolConfig};

use crate::{
    Actor, ActorClass, ActorFuture, ActorId, Call, Dispatch, Error, Mailbox, Result, SuffixCache,
    builtin,
};
use manager::PoolManager;
use message::PoolMessage;

/// Point-in-time view of a pool, as seen by its manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Nominal number of workers.
    pub size: usize,
    /// Workers waiting for work.
    pub idle: usize,
    /// Workers that haven't exited, busy or idle.
    pub live: usize,
}

/// Handle to a running worker pool.
///
/// Cheap to clone; all clones talk to the same manager.
#[derive(Clone)]
pub struct WorkerPool {
    id: ActorId,
    mailbox: Mailbox<PoolMessage>,
    class: Arc<str>,
    methods: &'static [&'static str],
    size: usize,
    suffixes: Arc<SuffixCache>,
}

impl WorkerPool {
    /// Spawn the manager and its workers.
    ///
    /// The size is validated before anything is spawned. Fails with
    /// [`Error::Configuration`] for a size below [`MIN_POOL_SIZE`], or with
    /// the factory's error if a worker can't be constructed.
    ///
    /// Requires a running Tokio runtime.
    pub fn new<A: Actor>(class: ActorClass<A>, config: PoolConfig) -> Result<Self> {
        let size = config.resolved_size()?;
        let id = ActorId::new(format!("{}-pool", class.name()).into());
        let mailbox = Mailbox::new();
        let class_name = class.shared_name();
        let methods = class.instance_methods();

        let manager = PoolManager::new(
            id.clone(),
            class,
            size,
            config.args,
            config.actor,
            mailbox.clone(),
        )?;
        tokio::spawn(manager.run());

        Ok(Self {
            id,
            mailbox,
            class: class_name,
            methods,
            size,
            suffixes: Arc::new(SuffixCache::new()),
        })
    }

    fn send(&self, call: Call, reply: Option<oneshot::Sender<Result<Value>>>) -> Result<()> {
        self.mailbox
            .push(PoolMessage::Execute { call, reply })
            .map_err(|_| Error::dead(format!("worker pool {} terminated", self.id)))
    }

    /// Run `call` on an idle worker and wait for its result.
    ///
    /// Waits for a worker to free up if all of them are busy. The worker's
    /// result, or error, is returned unchanged.
    pub async fn execute(&self, call: impl Into<Call>) -> Result<Value> {
        let (tx, rx) = oneshot::channel();
        self.send(call.into(), Some(tx))?;
        rx.await?
    }

    /// Queue `call` for execution without waiting for it.
    pub fn execute_async(&self, call: impl Into<Call>) -> Result<()> {
        self.send(call.into(), None)
    }

    /// Queue `call` and return a handle resolving to its result.
    pub fn execute_future(&self, call: impl Into<Call>) -> Result<ActorFuture> {
        let (tx, rx) = oneshot::channel();
        self.send(call.into(), Some(tx))?;
        Ok(ActorFuture::new(rx))
    }

    /// Whether workers answer `method`: declared by the worker class, or one
    /// of the [`builtin`] calls every actor answers.
    pub fn responds_to(&self, method: &str) -> bool {
        self.methods.iter().chain(builtin::ALL).any(|m| *m == method)
    }

    /// Dispatch `call` to the workers by name.
    ///
    /// Methods the workers answer, see [`responds_to`](WorkerPool::responds_to),
    /// run through [`execute`](WorkerPool::execute); their `!`-suffixed form through
    /// [`execute_async`](WorkerPool::execute_async), resolving to
    /// `Value::Null` at once. Anything else fails with
    /// [`Error::UnsupportedOperation`] without reaching a worker.
    pub async fn forward(&self, call: impl Into<Call>) -> Result<Value> {
        let call = call.into();
        match self.suffixes.dispatch(call.method()) {
            Dispatch::Async(plain) if self.responds_to(&plain) => {
                self.execute_async(call.renamed(plain))?;
                Ok(Value::Null)
            }
            Dispatch::Sync if self.responds_to(call.method()) => self.execute(call).await,
            _ => Err(Error::UnsupportedOperation {
                class: self.class.clone(),
                method: call.method().into(),
            }),
        }
    }

    /// Ask the manager for its current state.
    ///
    /// Answered in mailbox order, so it waits behind requests queued earlier.
    pub async fn status(&self) -> Result<PoolStatus> {
        let (tx, rx) = oneshot::channel();
        self.mailbox
            .push(PoolMessage::Status(tx))
            .map_err(|_| Error::dead(format!("worker pool {} terminated", self.id)))?;
        Ok(rx.await?)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.mailbox.is_alive()
    }

    /// Ask the manager to stop. Requests queued behind this one fail with
    /// [`Error::DeadActor`]; idle workers are terminated, busy ones once
    /// they finish.
    pub fn request_termination(&self) -> Result<()> {
        self.mailbox
            .push(PoolMessage::Terminate)
            .map_err(|_| Error::dead("worker pool already terminated"))
    }

    pub async fn terminate_and_wait(&self) -> Result<()> {
        self.request_termination()?;
        self.mailbox.closed().await;
        Ok(())
    }

    #[inline]
    pub fn id(&self) -> &ActorId {
        &self.id
    }

    /// Name of the worker class.
    #[inline]
    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// Nominal number of workers.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("id", &self.id)
            .field("class", &self.class)
            .field("size", &self.size)
            .field("alive", &self.is_alive())
            .finish()
    }
}
