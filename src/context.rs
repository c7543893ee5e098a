use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{ActorId, Mailbox, Message};

/// Runtime-provided context handed to an actor with every call.
///
/// Use it to:
/// - `id()` / `name()`: retrieve the actor's identity for logging
/// - `stop()`: exit cleanly once the current call has been answered
/// - `is_alive()`: check whether the actor is still accepting messages
#[derive(Clone)]
pub struct Context {
    pub(crate) id: ActorId,
    pub(crate) mailbox: Mailbox<Message>,
    pub(crate) stopping: Arc<AtomicBool>,
}

impl Context {
    pub(crate) fn new(id: ActorId, mailbox: Mailbox<Message>) -> Self {
        Self {
            id,
            mailbox,
            stopping: Arc::new(AtomicBool::new(false)),
        }
    }

    #[inline]
    pub fn id(&self) -> &ActorId {
        &self.id
    }

    /// The name the actor was spawned with.
    #[inline]
    pub fn name(&self) -> &str {
        self.id.name()
    }

    /// Request a clean exit. Linked supervisors see no exit reason, so the
    /// actor is not restarted.
    #[inline]
    pub fn stop(&self) {
        self.stopping.store(true, Ordering::Release);
    }

    #[inline]
    pub(crate) fn stop_requested(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }

    /// Whether the actor still accepts messages and hasn't been asked to stop.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.mailbox.is_alive() && !self.stop_requested()
    }
}
