use core::marker::Send;
use std::{borrow::Cow, future::Future};

use serde_json::Value;

use crate::{Call, Context, Error, Result};

/// Core trait implemented by objects that run inside an actor.
///
/// The runtime owns the object and drives it from a dedicated task. Callers
/// never touch it directly: they hold an [`ActorProxy`](crate::ActorProxy)
/// and every method invocation arrives here as a [`Call`].
///
/// Ergonomics:
/// - Although the trait methods return futures, you can implement them as `async fn`.
///   The compiler will produce the appropriate future type automatically.
/// - No `#[async_trait]` is required.
///
/// ```rust
/// use serde_json::Value;
/// use troupe::{Actor, Call, Context, Error, Result};
///
/// struct Doubler;
///
/// impl Actor for Doubler {
///     fn methods(&self) -> &'static [&'static str] {
///         &["process"]
///     }
///
///     async fn handle_call(&mut self, call: &Call, _ctx: &Context) -> Result<Value> {
///         match call.method() {
///             "process" => Ok(Value::from(call.arg::<i64>(0)? * 2)),
///             _ => Err(Error::NoSuchMethod {
///                 class: self.class_name().into(),
///                 method: call.method().into(),
///             }),
///         }
///     }
/// }
/// ```
pub trait Actor: Send + 'static {
    /// Handle a single call.
    ///
    /// Equivalent to:
    ///
    /// ```ignore
    /// async fn handle_call(&mut self, call: &Call, ctx: &Context) -> Result<Value>;
    /// ```
    ///
    /// The returned value (or error) is delivered to the caller, if it waits
    /// for one. Errors are then passed to [`on_error`](Actor::on_error),
    /// except [`Error::NoSuchMethod`] and [`Error::InvalidArgument`], which
    /// only go back to the caller.
    ///
    /// The default implementation answers every call with
    /// [`Error::NoSuchMethod`].
    fn handle_call(
        &mut self,
        call: &Call,
        ctx: &Context,
    ) -> impl Future<Output = Result<Value>> + Send {
        let _ctx = ctx;
        let err = Error::NoSuchMethod {
            class: self.class_name().into(),
            method: call.method().into(),
        };
        async move { Err(err) }
    }

    /// Name reported for the `class` call and used in diagnostics.
    ///
    /// Defaults to the bare type name, without module path.
    fn class_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(short_type_name(std::any::type_name::<Self>()))
    }

    /// Methods understood by [`handle_call`](Actor::handle_call), reported by
    /// `methods` and `respond_to` calls.
    fn methods(&self) -> &'static [&'static str] {
        &[]
    }

    /// Short textual form, answered for `to_s`.
    fn to_s(&self) -> String {
        format!("#<{}>", self.class_name())
    }

    /// Detailed textual form, answered for `inspect`.
    fn inspect(&self) -> String {
        self.to_s()
    }

    /// Lifecycle hook called once before the first message is processed.
    ///
    /// An error here crashes the actor before it handles anything.
    fn on_start(&mut self, ctx: &Context) -> impl Future<Output = Result<()>> + Send {
        let _ctx = ctx;
        async { Ok(()) }
    }

    /// Lifecycle hook called once after a clean exit.
    ///
    /// Not called when the actor crashed.
    fn on_shutdown(&mut self) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }

    /// Called when a call returns an error, after the caller got it.
    /// Not called for errors blaming the call itself, see
    /// [`Error::is_caller_error`].
    ///
    /// Return `Ok(())` to keep the actor running, or `Err(reason)` to crash
    /// it. Linked supervisors then receive `reason` in the
    /// [`ExitSignal`](crate::ExitSignal).
    ///
    /// # Default Behavior
    ///
    /// By default every error crashes the actor.
    ///
    /// ```rust
    /// use troupe::{Actor, Error, Result};
    /// # struct Resilient;
    /// # impl Actor for Resilient {
    /// fn on_error(&self, error: Error) -> Result<()> {
    ///     eprintln!("call failed: {error}");
    ///     Ok(())
    /// }
    /// # }
    /// ```
    fn on_error(&self, error: Error) -> Result<()> {
        Err(error)
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Method names answered by the runtime itself, on the actor's task, from
/// the wrapped object's [`Actor`] implementation.
pub mod builtin {
    pub const CLASS: &str = "class";
    pub const NAME: &str = "name";
    pub const IS_A: &str = "is_a";
    pub const RESPOND_TO: &str = "respond_to";
    pub const METHODS: &str = "methods";
    pub const INSPECT: &str = "inspect";
    pub const TO_S: &str = "to_s";

    pub const ALL: &[&str] = &[CLASS, NAME, IS_A, RESPOND_TO, METHODS, INSPECT, TO_S];
}
