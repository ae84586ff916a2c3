//! Interceptor chain.
//!
//! Interceptors run, in registration order, before a handler action. Each one
//! receives the mutable [`Invocation`] and a [`Next`] callback; calling
//! `next.run(inv)` continues the chain, returning early short-circuits it.
//!
//! # Example
//!
//! ```
//! use bodybind_core::{HandlerResult, Interceptor, Invocation, Next};
//!
//! struct Audit;
//!
//! impl Interceptor for Audit {
//!     fn name(&self) -> &'static str {
//!         "audit"
//!     }
//!
//!     fn intercept(&self, inv: &mut Invocation, next: Next<'_>) -> HandlerResult {
//!         tracing::debug!(method = %inv.signature(), "invoking");
//!         next.run(inv)
//!     }
//! }
//! ```

use crate::{BindResult, HandlerClass, HandlerError, Invocation, MethodDescriptor};
use std::fmt;
use std::sync::Arc;

/// Result of running a handler action.
pub type HandlerResult = Result<serde_json::Value, HandlerError>;

/// Terminal action at the end of a chain.
pub type ActionRef<'a> = &'a (dyn Fn(&Invocation) -> HandlerResult + Send + Sync);

/// An interceptor around handler actions.
///
/// # Invariants
///
/// - Interceptors MUST call `next.run()` exactly once unless short-circuiting
/// - Interceptors MUST NOT swallow errors returned by `next.run()`
pub trait Interceptor: Send + Sync + 'static {
    /// Returns the unique name of this interceptor.
    fn name(&self) -> &'static str;

    /// Processes the invocation and continues with `next`.
    fn intercept(&self, inv: &mut Invocation, next: Next<'_>) -> HandlerResult;
}

/// Callback to invoke the rest of the chain.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        interceptor: &'a dyn Interceptor,
        next: Box<Next<'a>>,
    },
    Action(ActionRef<'a>),
}

impl<'a> Next<'a> {
    fn chain(interceptor: &'a dyn Interceptor, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                interceptor,
                next: Box::new(next),
            },
        }
    }

    fn action(action: ActionRef<'a>) -> Self {
        Self {
            inner: NextInner::Action(action),
        }
    }

    /// Invokes the next interceptor or the terminal action.
    ///
    /// This consumes `self` so it can only be called once.
    pub fn run(self, inv: &mut Invocation) -> HandlerResult {
        match self.inner {
            NextInner::Chain { interceptor, next } => interceptor.intercept(inv, *next),
            NextInner::Action(action) => action(inv),
        }
    }
}

/// Ordered interceptors attached to one handler method.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an interceptor.
    pub fn add(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    /// Appends an interceptor unless one with the same name is present.
    ///
    /// Returns `true` if the interceptor was added.
    pub fn add_if_not_exist(&mut self, interceptor: Arc<dyn Interceptor>) -> bool {
        if self.contains(interceptor.name()) {
            return false;
        }
        self.interceptors.push(interceptor);
        true
    }

    /// Returns `true` if an interceptor with `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.interceptors.iter().any(|i| i.name() == name)
    }

    /// Returns interceptor names in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.interceptors.iter().map(|i| i.name())
    }

    /// Returns the number of interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Returns `true` if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Runs every interceptor and then `action`.
    pub fn invoke(&self, inv: &mut Invocation, action: ActionRef<'_>) -> HandlerResult {
        let next = self
            .interceptors
            .iter()
            .rev()
            .fold(Next::action(action), |next, interceptor| {
                Next::chain(interceptor.as_ref(), next)
            });
        next.run(inv)
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Attaches interceptors to handler methods at registration time.
///
/// Builders are consulted once per (class, method) pair. Returning an error
/// rejects the method and fails registration.
pub trait InterceptorBuilder: Send + Sync {
    /// Inspects `method` of `class` and adds interceptors to `chain`.
    fn build(
        &self,
        class: &HandlerClass,
        method: &MethodDescriptor,
        chain: &mut InterceptorChain,
    ) -> BindResult<()>;
}
