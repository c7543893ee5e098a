use serde_json::Value;

use crate::{Config, Error, Result};

/// Smallest pool accepted by [`WorkerPool::new`](crate::WorkerPool::new).
pub const MIN_POOL_SIZE: usize = 2;

/// Worker pool configuration.
///
/// # Examples
///
/// ```rust
/// use troupe::PoolConfig;
///
/// let config = PoolConfig::default()
///     .with_size(4)                 // Defaults to the number of cores
///     .with_arg("thumbnails");      // Passed to every (re)spawned worker
/// assert_eq!(config.resolved_size().unwrap(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PoolConfig {
    /// Number of workers. `None` uses the number of CPU cores, but never
    /// less than [`MIN_POOL_SIZE`].
    pub size: Option<usize>,

    /// Arguments handed to the worker class factory on every spawn,
    /// including replacements of crashed workers.
    pub args: Vec<Value>,

    /// Runtime configuration applied to every worker.
    pub actor: Config,
}

impl PoolConfig {
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_actor_config(mut self, config: Config) -> Self {
        self.actor = config;
        self
    }

    /// Validated pool size.
    ///
    /// Fails with [`Error::Configuration`] for an explicit size below
    /// [`MIN_POOL_SIZE`].
    pub fn resolved_size(&self) -> Result<usize> {
        match self.size {
            Some(size) if size < MIN_POOL_SIZE => Err(Error::Configuration(format!(
                "minimum pool size is {MIN_POOL_SIZE}, got {size}"
            ))),
            Some(size) => Ok(size),
            None => Ok(num_cpus::get().max(MIN_POOL_SIZE)),
        }
    }
}
