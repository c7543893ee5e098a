//! Troupe - actor proxies and supervised worker pools for Tokio
//!
//! Every actor runs on its own Tokio task and owns its state. Callers talk
//! to it through an [`ActorProxy`], which turns method calls into mailbox
//! messages: wait for the reply ([`ActorProxy::invoke`]), fire and forget
//! ([`ActorProxy::invoke_async`]) or collect the reply later
//! ([`ActorProxy::invoke_future`]).
//!
//! A [`WorkerPool`] spreads calls over a fixed set of such actors and
//! replaces the ones that crash.
//!
//! See `demos/doubler_pool.rs`.

mod actor;
mod actor_builder;
mod actor_class;
mod actor_id;
mod actor_ref;
mod call;
mod config;
mod context;
mod dispatch;
mod error;
mod future;
mod link;
mod mailbox;
mod message;
mod proxy;

mod internal;

pub mod pool;

pub use actor::{Actor, builtin};
pub use actor_builder::ActorBuilder;
pub use actor_class::ActorClass;
pub use actor_id::ActorId;
pub use actor_ref::ActorRef;
pub use call::{Block, Call};
pub use config::Config;
pub use context::Context;
pub use dispatch::{ASYNC_SUFFIX, Dispatch, SuffixCache};
pub use error::Error;
pub use future::ActorFuture;
pub use link::{ExitSignal, Link};
pub use mailbox::Mailbox;
pub use message::{Message, Request, SystemEvent};
pub use pool::{PoolConfig, PoolStatus, WorkerPool};
pub use proxy::ActorProxy;

pub use serde_json::Value;

pub type Result<T = ()> = std::result::Result<T, Error>;
