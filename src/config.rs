/// Per-actor runtime configuration.
///
/// Use the builder pattern to customize, or use [`Default`] for sensible defaults.
///
/// # Examples
///
/// ```rust
/// use troupe::Config;
///
/// let config = Config::default()
///     .with_max_messages_per_tick(32);   // Fewer yields, more throughput
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of messages an actor processes in a row before
    /// yielding control back to the scheduler.
    /// Lower values improve fairness, higher values improve throughput.
    /// Default: 10
    pub max_messages_per_tick: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_messages_per_tick: 10,
        }
    }
}

impl Config {
    /// Set the maximum number of messages processed between yields.
    ///
    /// Values below 1 are treated as 1.
    pub fn with_max_messages_per_tick(mut self, limit: usize) -> Self {
        self.max_messages_per_tick = limit;
        self
    }

    pub(crate) fn yield_every(&self) -> usize {
        self.max_messages_per_tick.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yield_every_is_at_least_one() {
        assert_eq!(Config::default().yield_every(), 10);
        assert_eq!(Config::default().with_max_messages_per_tick(0).yield_every(), 1);
    }
}
