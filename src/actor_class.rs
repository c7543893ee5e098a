use std::sync::Arc;

use serde_json::Value;

use crate::{Actor, Result};

type Factory<A> = dyn Fn(&[Value]) -> Result<A> + Send + Sync;

/// Constructor descriptor for a kind of actor.
///
/// Bundles what a [`WorkerPool`](crate::WorkerPool) needs to know about its
/// workers without holding an instance: the class name, the methods instances
/// declare, and a factory that builds a fresh instance from the pool's spawn
/// arguments.
///
/// ```rust
/// # use troupe::{Actor, ActorClass};
/// # struct Resizer { width: u32 }
/// # impl Actor for Resizer {}
/// let class = ActorClass::new("Resizer", &["resize"], |args| {
///     let width = args.first().and_then(|v| v.as_u64()).unwrap_or(640) as u32;
///     Ok(Resizer { width })
/// });
/// assert!(class.declares("resize"));
/// ```
pub struct ActorClass<A> {
    name: Arc<str>,
    methods: &'static [&'static str],
    factory: Arc<Factory<A>>,
}

impl<A> Clone for ActorClass<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            methods: self.methods,
            factory: self.factory.clone(),
        }
    }
}

impl<A: Actor> ActorClass<A> {
    pub fn new<N, F>(name: N, methods: &'static [&'static str], factory: F) -> Self
    where
        N: Into<Arc<str>>,
        F: Fn(&[Value]) -> Result<A> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            methods,
            factory: Arc::new(factory),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        self.name.clone()
    }

    #[inline]
    pub fn instance_methods(&self) -> &'static [&'static str] {
        self.methods
    }

    /// Whether instances declare `method`.
    pub fn declares(&self, method: &str) -> bool {
        self.methods.iter().any(|m| *m == method)
    }

    /// Build a new instance from `args`.
    pub fn construct(&self, args: &[Value]) -> Result<A> {
        (self.factory)(args)
    }
}

impl<A> std::fmt::Debug for ActorClass<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorClass")
            .field("name", &self.name)
            .field("methods", &self.methods)
            .finish()
    }
}
