//! Action registry.
//!
//! Actions are callbacks run for their side effects. Every callback under a
//! name receives the same args; return values are not threaded through.
//!
//! Asynchronous callbacks run strictly one after another. Awaiting a
//! [`Dispatch`] surfaces the first failure and stops the sequence, while
//! [`Dispatch::detach`] runs it in the background and only logs failures.

use std::collections::HashMap;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::sync::{Arc, PoisonError, RwLock};

use futures::FutureExt;
use futures::future::{BoxFuture, Either, Ready, ready};
use serde_json::Value;

use crate::error::HookError;
use crate::name::HookName;

type SyncActionFn = dyn Fn(&Value) + Send + Sync;
type AsyncActionFn = dyn Fn(Value) -> BoxFuture<'static, Result<(), HookError>> + Send + Sync;

#[derive(Clone)]
enum Callback {
    Sync(Arc<SyncActionFn>),
    Async(Arc<AsyncActionFn>),
}

/// Handle to an action callback.
#[derive(Clone)]
pub struct Action(Callback);

impl Action {
    /// Wrap a synchronous callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        Self(Callback::Sync(Arc::new(callback)))
    }

    /// Wrap an asynchronous callback.
    pub fn future<F, Fut>(callback: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        Self(Callback::Async(Arc::new(move |args| callback(args).boxed())))
    }

    /// Whether the callback returns a future.
    #[must_use]
    pub fn is_async(&self) -> bool {
        matches!(self.0, Callback::Async(_))
    }

    /// Whether both handles point at the same callback.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Callback::Sync(a), Callback::Sync(b)) => Arc::ptr_eq(a, b),
            (Callback::Async(a), Callback::Async(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_async() { "async" } else { "sync" };
        f.debug_tuple("Action").field(&kind).finish()
    }
}

/// Result of [`Actions::do_actions_async`].
///
/// `Done` means nothing was registered. `Pending` holds the sequential runner;
/// await it to observe failures, or [`detach`](Self::detach) it.
#[must_use = "pending actions do nothing until awaited or detached"]
pub enum Dispatch {
    /// No callbacks were registered.
    Done,
    /// Callbacks still to run, in registration order.
    Pending(BoxFuture<'static, Result<(), HookError>>),
}

impl Dispatch {
    /// Whether the dispatch needs awaiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Run pending callbacks without waiting for them.
    ///
    /// On a Tokio runtime the runner is spawned; failures are logged and
    /// dropped. Outside a runtime there is nothing to hand the runner to, so
    /// it is driven to completion on the current thread.
    pub fn detach(self) {
        let Self::Pending(runner) = self else {
            return;
        };

        let runner = async move {
            if let Err(e) = runner.await {
                tracing::warn!(error = %e, "Detached action failed");
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(runner);
            }
            Err(_) => {
                tracing::debug!("No async runtime; running detached actions inline");
                futures::executor::block_on(runner);
            }
        }
    }
}

impl IntoFuture for Dispatch {
    type Output = Result<(), HookError>;
    type IntoFuture =
        Either<Ready<Result<(), HookError>>, BoxFuture<'static, Result<(), HookError>>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Self::Done => Either::Left(ready(Ok(()))),
            Self::Pending(runner) => Either::Right(runner),
        }
    }
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => f.write_str("Done"),
            Self::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// Registry of action callbacks keyed by [`HookName`].
pub struct Actions {
    entries: RwLock<HashMap<HookName, Vec<Action>>>,
}

impl Default for Actions {
    fn default() -> Self {
        Self {
            entries: RwLock::new(initial_entries()),
        }
    }
}

impl fmt::Debug for Actions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_map()
            .entries(entries.iter().map(|(name, list)| (name.as_str(), list.len())))
            .finish()
    }
}

fn initial_entries() -> HashMap<HookName, Vec<Action>> {
    HookName::BUILT_IN
        .into_iter()
        .map(|name| (name, Vec::new()))
        .collect()
}

impl Actions {
    /// Create a registry holding the built-in extension points, all empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback under `name`.
    ///
    /// Returns `false` for an empty custom name.
    pub fn add_action(&self, name: impl Into<HookName>, action: Action) -> bool {
        let name = name.into();
        if !name.is_valid() {
            return false;
        }

        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name)
            .or_default()
            .push(action);
        true
    }

    /// Remove one registration of `action` from `name`.
    pub fn remove_action(&self, name: &HookName, action: &Action) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let Some(list) = entries.get_mut(name) else {
            return false;
        };
        let Some(pos) = list.iter().position(|a| a.ptr_eq(action)) else {
            return false;
        };
        list.remove(pos);
        true
    }

    /// Whether any callback is registered under `name`.
    #[must_use]
    pub fn has_actions(&self, name: &HookName) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .is_some_and(|list| !list.is_empty())
    }

    /// Number of names in the registry, empty ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the registry holds no names at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the synchronous callbacks registered under `name`.
    ///
    /// Asynchronous callbacks are skipped with a warning; use
    /// [`do_actions_async`](Self::do_actions_async) for those.
    pub fn do_actions(&self, name: &HookName, args: &Value) {
        for action in self.callbacks(name) {
            match action.0 {
                Callback::Sync(callback) => callback(args),
                Callback::Async(_) => {
                    tracing::warn!(
                        hook = %name,
                        "Skipping async action during synchronous dispatch"
                    );
                }
            }
        }
    }

    /// Run every callback registered under `name`, one after another.
    ///
    /// Returns [`Dispatch::Done`] when nothing is registered. The pending
    /// runner stops at the first failing callback and yields its error.
    pub fn do_actions_async(&self, name: &HookName, args: Value) -> Dispatch {
        let callbacks = self.callbacks(name);
        if callbacks.is_empty() {
            return Dispatch::Done;
        }

        let hook = name.clone();
        Dispatch::Pending(
            async move {
                for action in callbacks {
                    match action.0 {
                        Callback::Sync(callback) => callback(&args),
                        Callback::Async(callback) => {
                            if let Err(e) = callback(args.clone()).await {
                                tracing::debug!(hook = %hook, error = %e, "Action failed");
                                return Err(e);
                            }
                        }
                    }
                }
                Ok(())
            }
            .boxed(),
        )
    }

    /// Restore the built-in extension points, all empty.
    pub fn reset_actions(&self) {
        *self.entries.write().unwrap_or_else(PoisonError::into_inner) = initial_entries();
    }

    /// Replace every registration with the given map.
    ///
    /// Returns `false` for an empty map, leaving the registry untouched.
    pub fn set_actions<I>(&self, map: I) -> bool
    where
        I: IntoIterator<Item = (HookName, Option<Action>)>,
    {
        let map: Vec<(HookName, Option<Action>)> = map.into_iter().collect();
        if map.is_empty() {
            return false;
        }

        self.reset_actions();
        for (name, action) in map {
            if let Some(action) = action {
                self.add_action(name, action);
            }
        }
        true
    }

    fn callbacks(&self, name: &HookName) -> Vec<Action> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .unwrap_or_default()
    }
}
