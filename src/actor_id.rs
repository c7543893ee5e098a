use std::{hash::Hash, sync::Arc};

use uuid::Uuid;

/// Identity of a spawned actor.
///
/// Carries a unique id and the human-readable name the actor was spawned
/// with. Two ids are equal only if they refer to the same spawned actor,
/// regardless of the name.
///
/// Ids are cheap to clone and are what linked supervisors receive in
/// [`ExitSignal`](crate::ExitSignal).
#[derive(Debug, Clone)]
pub struct ActorId {
    uuid: u128,
    name: Arc<str>,
}

impl ActorId {
    pub(crate) fn new(name: Arc<str>) -> Self {
        Self {
            uuid: Uuid::new_v4().as_u128(),
            name,
        }
    }

    /// Returns the name the actor was spawned with.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn uuid(&self) -> u128 {
        self.uuid
    }
}

impl PartialEq for ActorId {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl Eq for ActorId {}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Hash for ActorId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}
