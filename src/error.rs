use std::sync::Arc;

/// Errors produced by proxies, actors and worker pools.
///
/// `Error` is cheap to clone: a crash reason is handed both to the caller
/// whose request failed and to every linked supervisor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Dead actor: {0}")]
    DeadActor(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Workers of class '{class}' don't support method '{method}'")]
    UnsupportedOperation { class: Arc<str>, method: Arc<str> },

    #[error("Undefined method '{method}' for {class}")]
    NoSuchMethod { class: Arc<str>, method: Arc<str> },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("The pool has no live workers left")]
    NoWorkers,

    #[error("Actor panicked: {0}")]
    Panicked(Arc<str>),

    #[error("{0}")]
    External(Arc<str>),
}

impl Error {
    /// Wraps any displayable error coming from user code.
    pub fn external<E: std::fmt::Display>(err: E) -> Self {
        Error::External(err.to_string().into())
    }

    pub(crate) fn dead(what: impl Into<String>) -> Self {
        Error::DeadActor(what.into())
    }

    #[inline]
    pub fn is_dead_actor(&self) -> bool {
        matches!(self, Error::DeadActor(_))
    }

    /// Whether the error blames the call rather than the actor: an unknown
    /// method or arguments that don't fit. Such errors are returned to the
    /// caller and never crash the actor.
    #[inline]
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Error::NoSuchMethod { .. } | Error::InvalidArgument(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::InvalidArgument(e.to_string())
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for Error {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Error::dead("actor terminated before replying")
    }
}
