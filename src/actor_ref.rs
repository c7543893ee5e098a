use std::sync::Arc;

use crate::{ActorId, Mailbox, Message};

/// Runtime-side reference to a spawned actor.
///
/// Returned by [`ActorBuilder::spawn_ref`](crate::ActorBuilder::spawn_ref)
/// and turned into a caller-facing handle with
/// [`ActorProxy::new`](crate::ActorProxy::new).
#[derive(Clone)]
pub struct ActorRef {
    pub(crate) id: ActorId,
    pub(crate) mailbox: Mailbox<Message>,
    pub(crate) task: tokio::task::Id,
    pub(crate) class_label: Arc<str>,
}

impl ActorRef {
    #[inline]
    pub fn id(&self) -> &ActorId {
        &self.id
    }

    #[inline]
    pub fn mailbox(&self) -> &Mailbox<Message> {
        &self.mailbox
    }

    /// Id of the Tokio task running the actor. For diagnostics only.
    #[inline]
    pub fn task_id(&self) -> tokio::task::Id {
        self.task
    }

    /// Class name of the wrapped object, captured when it was spawned.
    #[inline]
    pub fn class_label(&self) -> &str {
        &self.class_label
    }
}

impl std::fmt::Debug for ActorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorRef")
            .field("id", &self.id)
            .field("task", &self.task)
            .field("class", &self.class_label)
            .field("alive", &self.mailbox.is_alive())
            .finish()
    }
}
