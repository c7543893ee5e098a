use std::{fmt, sync::Arc};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result};

/// Callback passed along with a [`Call`] and invoked by the actor, if at all,
/// on the actor's own task.
pub type Block = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// A method invocation addressed to an actor.
///
/// Arguments and results are dynamic JSON values, so a single mailbox can
/// carry calls to any method the wrapped object supports.
///
/// ```rust
/// use troupe::Call;
///
/// let call = Call::new("process").with_arg(5).with_arg("fast");
/// assert_eq!(call.method(), "process");
/// assert_eq!(call.arg::<i64>(0).unwrap(), 5);
/// ```
#[derive(Clone)]
pub struct Call {
    method: Arc<str>,
    args: Vec<Value>,
    block: Option<Block>,
}

impl Call {
    pub fn new(method: impl Into<Arc<str>>) -> Self {
        Self {
            method: method.into(),
            args: Vec::new(),
            block: None,
        }
    }

    /// Append one positional argument.
    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Replace the argument list.
    pub fn with_args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_block<F>(mut self, block: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.block = Some(Arc::new(block));
        self
    }

    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[inline]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    #[inline]
    pub fn block(&self) -> Option<&Block> {
        self.block.as_ref()
    }

    /// Decode the argument at `index` into `T`.
    pub fn arg<T: DeserializeOwned>(&self, index: usize) -> Result<T> {
        let value = self.args.get(index).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "{}: missing argument #{index} ({} given)",
                self.method,
                self.args.len()
            ))
        })?;
        Ok(T::deserialize(value)?)
    }

    /// Call the attached block with `value`. Returns `None` when the caller
    /// didn't pass a block.
    pub fn yield_block(&self, value: Value) -> Option<Value> {
        self.block.as_ref().map(|block| block(value))
    }

    /// Same call addressed to another method name.
    pub(crate) fn renamed(mut self, method: Arc<str>) -> Self {
        self.method = method;
        self
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("method", &self.method)
            .field("args", &self.args)
            .field("block", &self.block.is_some())
            .finish()
    }
}

impl From<&str> for Call {
    fn from(method: &str) -> Self {
        Call::new(method)
    }
}
