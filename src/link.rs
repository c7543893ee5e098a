use crate::{ActorId, Error};

/// Notification delivered to linked parties when an actor terminates.
///
/// `reason` is `None` for a clean exit (termination request, `Context::stop`,
/// mailbox closed) and carries the crash error otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitSignal {
    pub actor: ActorId,
    pub reason: Option<Error>,
}

impl ExitSignal {
    #[inline]
    pub fn is_crash(&self) -> bool {
        self.reason.is_some()
    }
}

/// Receiver of [`ExitSignal`]s from linked actors.
///
/// Implemented for any `Fn(ExitSignal)` closure. Notifications are delivered
/// from the terminating actor's task, so implementations should only hand
/// the signal over (e.g. push it into a mailbox) and return.
pub trait Link: Send + Sync + 'static {
    fn notify(&self, signal: ExitSignal);
}

impl<F> Link for F
where
    F: Fn(ExitSignal) + Send + Sync + 'static,
{
    fn notify(&self, signal: ExitSignal) {
        self(signal)
    }
}
