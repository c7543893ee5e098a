use std::sync::Arc;

use crate::{
    Actor, ActorId, ActorProxy, ActorRef, Config, Context, Link, Mailbox, internal::ActorHandler,
};

/// Spawns an actor on its own Tokio task.
///
/// ```rust,ignore
/// let proxy = ActorBuilder::new(Doubler::default())
///     .name("doubler")
///     .config(Config::default().with_max_messages_per_tick(32))
///     .link(|signal: ExitSignal| println!("{} exited: {:?}", signal.actor, signal.reason))
///     .spawn();
/// ```
///
/// Spawning requires a running Tokio runtime.
pub struct ActorBuilder<A: Actor> {
    actor: A,
    name: Option<Arc<str>>,
    config: Config,
    links: Vec<Arc<dyn Link>>,
}

impl<A: Actor> ActorBuilder<A> {
    pub fn new(actor: A) -> Self {
        Self {
            actor,
            name: None,
            config: Config::default(),
            links: Vec::new(),
        }
    }

    /// Name reported by the `name` call and used in logs.
    /// Defaults to the actor's class name.
    pub fn name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Notify `link` when the actor terminates, cleanly or not.
    pub fn link(mut self, link: impl Link) -> Self {
        self.links.push(Arc::new(link));
        self
    }

    /// Spawn the actor and return the runtime-side reference.
    pub fn spawn_ref(self) -> ActorRef {
        let class_label: Arc<str> = Arc::from(self.actor.class_name());
        let id = ActorId::new(self.name.unwrap_or_else(|| class_label.clone()));
        let mailbox = Mailbox::new();

        let handler = ActorHandler {
            actor: self.actor,
            mailbox: mailbox.clone(),
            ctx: Context::new(id.clone(), mailbox.clone()),
            links: self.links,
            yield_every: self.config.yield_every(),
        };
        let task = tokio::spawn(handler.run()).id();
        tracing::debug!(actor = %id, class = %class_label, "actor spawned");

        ActorRef {
            id,
            mailbox,
            task,
            class_label,
        }
    }

    /// Spawn the actor and return a proxy to it.
    pub fn spawn(self) -> ActorProxy {
        ActorProxy::new(self.spawn_ref())
    }
}
