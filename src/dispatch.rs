use std::{collections::HashMap, sync::Arc};

use arc_swap::ArcSwap;

/// Marker ending a method name that should be dispatched without waiting
/// for the reply, e.g. `"process!"`.
pub const ASYNC_SUFFIX: char = '!';

/// How a method name is dispatched by the generic `forward` entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Wait for the reply.
    Sync,
    /// Fire-and-forget call to the contained plain (unsuffixed) method.
    Async(Arc<str>),
}

type Names = HashMap<Arc<str>, Arc<str>>;

/// Maps async-suffixed method names to their plain form.
///
/// Readers never lock: the map is immutable and replaced wholesale on a
/// miss, so concurrent callers only ever see complete snapshots. Entries are
/// never changed once inserted.
pub struct SuffixCache {
    names: ArcSwap<Names>,
}

impl Default for SuffixCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SuffixCache {
    pub fn new() -> Self {
        Self {
            names: ArcSwap::from_pointee(Names::new()),
        }
    }

    /// Decide how `method` is dispatched.
    ///
    /// A bare `"!"` has no method name to strip down to and is sent as is,
    /// synchronously.
    pub fn dispatch(&self, method: &str) -> Dispatch {
        if method.len() > ASYNC_SUFFIX.len_utf8() && method.ends_with(ASYNC_SUFFIX) {
            Dispatch::Async(self.plain_name(method))
        } else {
            Dispatch::Sync
        }
    }

    fn plain_name(&self, method: &str) -> Arc<str> {
        if let Some(plain) = self.names.load().get(method) {
            return plain.clone();
        }

        let key: Arc<str> = Arc::from(method);
        let plain: Arc<str> = Arc::from(&method[..method.len() - ASYNC_SUFFIX.len_utf8()]);
        let snapshot = self.names.rcu(|current| {
            let mut next = Names::clone(current);
            next.entry(key.clone()).or_insert_with(|| plain.clone());
            next
        });
        // `rcu` returns the snapshot it replaced; a concurrent writer may
        // have inserted the key first.
        snapshot.get(method).cloned().unwrap_or(plain)
    }

    pub fn len(&self) -> usize {
        self.names.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
