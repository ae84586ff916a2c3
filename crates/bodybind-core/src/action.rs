//! Handler discovery and dispatch.
//!
//! The [`ActionRegistry`] is populated once at startup. Registering a handler
//! class runs every [`InterceptorBuilder`] against each of its methods, so
//! builders can validate the method shape and attach interceptors. After
//! startup the registry is read-only and can be shared across threads.
//!
//! # Example
//!
//! ```
//! use bodybind_core::{ActionRegistry, HandlerClass, MethodDescriptor};
//!
//! let mut registry = ActionRegistry::new();
//! registry
//!     .register(
//!         HandlerClass::new("HealthController"),
//!         vec![MethodDescriptor::new("ping").action(|_| Ok(serde_json::json!("pong")))],
//!     )
//!     .unwrap();
//!
//! let result = registry.handle("HealthController.ping", "").unwrap();
//! assert_eq!(result, serde_json::json!("pong"));
//! ```

use crate::interceptor::HandlerResult;
use crate::{
    BindResult, HandlerClass, HandlerError, InterceptorBuilder, InterceptorChain, Invocation,
    MethodDescriptor,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A registered handler method with its interceptor chain.
#[derive(Debug, Clone)]
pub struct Action {
    class: Arc<HandlerClass>,
    method: Arc<MethodDescriptor>,
    chain: InterceptorChain,
}

impl Action {
    /// Returns the handler class.
    #[must_use]
    pub fn class(&self) -> &Arc<HandlerClass> {
        &self.class
    }

    /// Returns the handler method.
    #[must_use]
    pub fn method(&self) -> &Arc<MethodDescriptor> {
        &self.method
    }

    /// Returns the interceptor chain.
    #[must_use]
    pub const fn chain(&self) -> &InterceptorChain {
        &self.chain
    }

    /// Creates a fresh invocation for `raw_body`.
    #[must_use]
    pub fn invocation(&self, raw_body: impl Into<String>) -> Invocation {
        Invocation::new(self.class.clone(), self.method.clone(), raw_body)
    }

    /// Runs the chain and the method action against `inv`.
    ///
    /// Methods without an action return `null` once the chain completes.
    pub fn invoke(&self, inv: &mut Invocation) -> HandlerResult {
        match self.method.action_fn() {
            Some(action) => self.chain.invoke(inv, action.as_ref()),
            None => self
                .chain
                .invoke(inv, &|_: &Invocation| -> HandlerResult { Ok(serde_json::Value::Null) }),
        }
    }
}

/// Registry of handler actions keyed by `Class.method`.
#[derive(Default)]
pub struct ActionRegistry {
    builders: Vec<Arc<dyn InterceptorBuilder>>,
    actions: HashMap<String, Action>,
}

impl ActionRegistry {
    /// Creates an empty registry without builders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an interceptor builder consulted for every subsequently registered method.
    #[must_use]
    pub fn with_builder(mut self, builder: Arc<dyn InterceptorBuilder>) -> Self {
        self.builders.push(builder);
        self
    }

    /// Registers all `methods` of `class`.
    ///
    /// Nothing is registered if any builder rejects any method.
    pub fn register(&mut self, class: HandlerClass, methods: Vec<MethodDescriptor>) -> BindResult<()> {
        let class = Arc::new(class);
        let mut built = Vec::with_capacity(methods.len());

        for method in methods {
            let mut chain = InterceptorChain::new();
            for builder in &self.builders {
                builder.build(&class, &method, &mut chain)?;
            }
            built.push(Action {
                class: class.clone(),
                method: Arc::new(method),
                chain,
            });
        }

        for action in built {
            let key = format!("{}.{}", action.class.name(), action.method.name());
            tracing::debug!(action = %key, interceptors = ?action.chain, "registered action");
            self.actions.insert(key, action);
        }
        Ok(())
    }

    /// Returns the action registered under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Action> {
        self.actions.get(key)
    }

    /// Checks if an action is registered under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.actions.contains_key(key)
    }

    /// Returns the number of registered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if no actions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns an iterator over registered keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    /// Dispatches `raw_body` to the action registered under `key`.
    pub fn handle(&self, key: &str, raw_body: impl Into<String>) -> HandlerResult {
        let action = self
            .actions
            .get(key)
            .ok_or_else(|| HandlerError::NotFound(key.to_string()))?;
        let mut inv = action.invocation(raw_body);
        action.invoke(&mut inv)
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("builders", &self.builders.len())
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}
