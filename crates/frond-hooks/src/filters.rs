//! Filter registry.
//!
//! A filter threads a value through every callback registered under a
//! [`HookName`], in registration order. Callbacks may be synchronous
//! ([`Filter::new`]) or return a future ([`Filter::future`]).
//!
//! [`Filters::apply_filters`] is the synchronous fast path: it runs the
//! synchronous callbacks and skips asynchronous ones with a warning, since a
//! future cannot complete without being polled. [`Filters::apply_filters_async`]
//! runs every callback, awaiting each before the next starts.

use std::collections::HashMap;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::sync::{Arc, PoisonError, RwLock};

use futures::FutureExt;
use futures::future::{BoxFuture, Either, Ready, ready};
use serde_json::Value;

use crate::name::HookName;

type SyncFilterFn = dyn Fn(Value, &Value) -> Value + Send + Sync;
type AsyncFilterFn = dyn Fn(Value, Value) -> BoxFuture<'static, Value> + Send + Sync;

#[derive(Clone)]
enum Callback {
    Sync(Arc<SyncFilterFn>),
    Async(Arc<AsyncFilterFn>),
}

/// Handle to a filter callback.
///
/// Cloning is cheap and clones compare equal under [`Filter::ptr_eq`], which
/// is how [`Filters::remove_filter`] finds the callback to remove.
#[derive(Clone)]
pub struct Filter(Callback);

impl Filter {
    /// Wrap a synchronous callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(Value, &Value) -> Value + Send + Sync + 'static,
    {
        Self(Callback::Sync(Arc::new(callback)))
    }

    /// Wrap an asynchronous callback.
    ///
    /// The callback receives its own copy of the args so the returned future
    /// can outlive the call.
    pub fn future<F, Fut>(callback: F) -> Self
    where
        F: Fn(Value, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        Self(Callback::Async(Arc::new(move |value, args| {
            callback(value, args).boxed()
        })))
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

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_async() { "async" } else { "sync" };
        f.debug_tuple("Filter").field(&kind).finish()
    }
}

/// Result of [`Filters::apply_filters_async`].
///
/// `Ready` means no callback was registered and the value came back untouched
/// without any future being created. `Pending` must be awaited to obtain the
/// filtered value. Both variants can be awaited directly.
#[must_use = "a pending filter result does nothing until awaited"]
pub enum Applied {
    /// No callbacks ran; the original value.
    Ready(Value),
    /// Callbacks still to run.
    Pending(BoxFuture<'static, Value>),
}

impl Applied {
    /// Whether the result needs awaiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Value of a ready result, `None` if pending.
    #[must_use]
    pub fn into_ready(self) -> Option<Value> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending(_) => None,
        }
    }
}

impl IntoFuture for Applied {
    type Output = Value;
    type IntoFuture = Either<Ready<Value>, BoxFuture<'static, Value>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Self::Ready(value) => Either::Left(ready(value)),
            Self::Pending(future) => Either::Right(future),
        }
    }
}

impl fmt::Debug for Applied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// Registry of filter callbacks keyed by [`HookName`].
///
/// Methods take `&self`; the map sits behind an `RwLock` so callbacks can be
/// registered on a context that is already shared. Callbacks are cloned out
/// of the lock before they run, so a callback may itself touch the registry.
pub struct Filters {
    entries: RwLock<HashMap<HookName, Vec<Filter>>>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            entries: RwLock::new(initial_entries()),
        }
    }
}

impl fmt::Debug for Filters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_map()
            .entries(entries.iter().map(|(name, list)| (name.as_str(), list.len())))
            .finish()
    }
}

fn initial_entries() -> HashMap<HookName, Vec<Filter>> {
    HookName::BUILT_IN
        .into_iter()
        .map(|name| (name, Vec::new()))
        .collect()
}

impl Filters {
    /// Create a registry holding the built-in extension points, all empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback under `name`.
    ///
    /// Returns `false` (and registers nothing) for an empty custom name.
    /// Names outside the built-in set are accepted but never dispatched by
    /// the pipeline.
    pub fn add_filter(&self, name: impl Into<HookName>, filter: Filter) -> bool {
        let name = name.into();
        if !name.is_valid() {
            return false;
        }

        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name)
            .or_default()
            .push(filter);
        true
    }

    /// Remove one registration of `filter` from `name`.
    ///
    /// Returns `false` if the name has no entry or the callback is not
    /// registered under it.
    pub fn remove_filter(&self, name: &HookName, filter: &Filter) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let Some(list) = entries.get_mut(name) else {
            return false;
        };
        let Some(pos) = list.iter().position(|f| f.ptr_eq(filter)) else {
            return false;
        };
        list.remove(pos);
        true
    }

    /// Whether any callback is registered under `name`.
    #[must_use]
    pub fn has_filters(&self, name: &HookName) -> bool {
        self.filter_count(name) > 0
    }

    /// Number of callbacks registered under `name`.
    #[must_use]
    pub fn filter_count(&self, name: &HookName) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map_or(0, Vec::len)
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

    /// Names currently in the registry, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<HookName> {
        let mut names: Vec<HookName> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Apply the callbacks registered under `name` synchronously.
    ///
    /// Each synchronous callback receives the previous callback's output.
    /// Asynchronous callbacks are skipped with a warning. With no callbacks
    /// the value is returned as-is.
    pub fn apply_filters(&self, name: &HookName, value: Value, args: &Value) -> Value {
        let mut value = value;
        for filter in self.callbacks(name) {
            match filter.0 {
                Callback::Sync(callback) => value = callback(value, args),
                Callback::Async(_) => {
                    tracing::warn!(
                        hook = %name,
                        "Skipping async filter during synchronous application"
                    );
                }
            }
        }
        value
    }

    /// Apply the callbacks registered under `name`, awaiting each in turn.
    ///
    /// Returns [`Applied::Ready`] with the untouched value when nothing is
    /// registered, otherwise [`Applied::Pending`].
    pub fn apply_filters_async(&self, name: &HookName, value: Value, args: Value) -> Applied {
        let callbacks = self.callbacks(name);
        if callbacks.is_empty() {
            return Applied::Ready(value);
        }

        Applied::Pending(
            async move {
                let mut value = value;
                for filter in callbacks {
                    value = match filter.0 {
                        Callback::Sync(callback) => callback(value, &args),
                        Callback::Async(callback) => callback(value, args.clone()).await,
                    };
                }
                value
            }
            .boxed(),
        )
    }

    /// Restore the built-in extension points, all empty.
    ///
    /// Custom names are dropped.
    pub fn reset_filters(&self) {
        *self.entries.write().unwrap_or_else(PoisonError::into_inner) = initial_entries();
    }

    /// Replace every registration with the given map.
    ///
    /// The registry is reset first, then each `Some` entry is registered as
    /// the only callback under its name. Returns `false` for an empty map,
    /// in which case the registry is left untouched.
    pub fn set_filters<I>(&self, map: I) -> bool
    where
        I: IntoIterator<Item = (HookName, Option<Filter>)>,
    {
        let map: Vec<(HookName, Option<Filter>)> = map.into_iter().collect();
        if map.is_empty() {
            return false;
        }

        self.reset_filters();
        for (name, filter) in map {
            if let Some(filter) = filter {
                self.add_filter(name, filter);
            }
        }
        true
    }

    fn callbacks(&self, name: &HookName) -> Vec<Filter> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    static_assertions::assert_impl_all!(super::Filters: Send, Sync);
    static_assertions::assert_impl_all!(super::Applied: Send);

    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn append(suffix: &'static str) -> Filter {
        Filter::new(move |value: Value, _: &Value| {
            json!(format!("{}{suffix}", value.as_str().unwrap_or_default()))
        })
    }

    fn append_later(suffix: &'static str, delay_ms: u64) -> Filter {
        Filter::future(move |value: Value, _: Value| async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            json!(format!("{}{suffix}", value.as_str().unwrap_or_default()))
        })
    }

    #[test]
    fn test_new_registry_has_built_in_names() {
        let filters = Filters::new();
        assert_eq!(filters.len(), 23);
        for name in HookName::BUILT_IN {
            assert!(!filters.has_filters(&name));
        }
    }

    #[test]
    fn test_add_filter_rejects_empty_name() {
        let filters = Filters::new();
        assert!(!filters.add_filter("", append("a")));
        assert_eq!(filters.len(), 23);
    }

    #[test]
    fn test_add_filter_accepts_custom_name() {
        let filters = Filters::new();
        assert!(filters.add_filter("myHook", append("a")));
        assert_eq!(filters.len(), 24);
        assert_eq!(filters.filter_count(&HookName::from("myHook")), 1);
    }

    #[test]
    fn test_apply_composes_in_registration_order() {
        let filters = Filters::new();
        filters.add_filter(HookName::Slug, append("-f1"));
        filters.add_filter(HookName::Slug, append("-f2"));

        let result = filters.apply_filters(&HookName::Slug, json!("v"), &Value::Null);

        assert_eq!(result, json!("v-f1-f2"));
    }

    #[test]
    fn test_apply_passes_args_to_every_callback() {
        let filters = Filters::new();
        let read_arg = Filter::new(|value: Value, args: &Value| {
            let n = value.as_i64().unwrap_or_default();
            json!(n + args["step"].as_i64().unwrap_or_default())
        });
        filters.add_filter(HookName::ColumnProps, read_arg.clone());
        filters.add_filter(HookName::ColumnProps, read_arg);

        let result = filters.apply_filters(&HookName::ColumnProps, json!(1), &json!({"step": 5}));

        assert_eq!(result, json!(11));
    }

    #[test]
    fn test_apply_without_callbacks_returns_same_allocation() {
        let filters = Filters::new();
        let value = json!(["a", "b", "c"]);
        let before = value.as_array().map(|a| a.as_ptr());

        let result = filters.apply_filters(&HookName::from("unregisteredName"), value, &Value::Null);

        assert_eq!(result.as_array().map(|a| a.as_ptr()), before);
    }

    #[test]
    fn test_apply_skips_async_callbacks() {
        let filters = Filters::new();
        filters.add_filter(HookName::Slug, append("-sync"));
        filters.add_filter(HookName::Slug, append_later("-async", 0));

        let result = filters.apply_filters(&HookName::Slug, json!("v"), &Value::Null);

        assert_eq!(result, json!("v-sync"));
    }

    #[test]
    fn test_apply_async_without_callbacks_is_ready() {
        let filters = Filters::new();
        let value = json!({"a": 1});

        let applied = filters.apply_filters_async(&HookName::AllData, value.clone(), Value::Null);

        assert!(!applied.is_pending());
        assert_eq!(applied.into_ready(), Some(value));
    }

    #[tokio::test]
    async fn test_apply_async_awaits_in_order() {
        let filters = Filters::new();
        // The slower callback is registered first and must still run first.
        filters.add_filter(HookName::RenderContent, append_later("-f1", 20));
        filters.add_filter(HookName::RenderContent, append_later("-f2", 0));

        let applied = filters.apply_filters_async(&HookName::RenderContent, json!("v"), Value::Null);
        assert!(applied.is_pending());

        assert_eq!(applied.await, json!("v-f1-f2"));
    }

    #[tokio::test]
    async fn test_apply_async_matches_sync_composition() {
        let sync = Filters::new();
        sync.add_filter(HookName::Slug, append("-f1"));
        sync.add_filter(HookName::Slug, append("-f2"));

        let async_only = Filters::new();
        async_only.add_filter(HookName::Slug, append_later("-f1", 1));
        async_only.add_filter(HookName::Slug, append_later("-f2", 1));

        let expected = sync.apply_filters(&HookName::Slug, json!("v"), &Value::Null);
        let actual = async_only
            .apply_filters_async(&HookName::Slug, json!("v"), Value::Null)
            .await;

        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_apply_async_mixes_sync_and_async_callbacks() {
        let filters = Filters::new();
        filters.add_filter(HookName::Slug, append("-a"));
        filters.add_filter(HookName::Slug, append_later("-b", 5));
        filters.add_filter(HookName::Slug, append("-c"));

        let result = filters
            .apply_filters_async(&HookName::Slug, json!("v"), Value::Null)
            .await;

        assert_eq!(result, json!("v-a-b-c"));
    }

    #[test]
    fn test_remove_filter_by_identity() {
        let filters = Filters::new();
        let first = append("-1");
        let second = append("-2");
        filters.add_filter(HookName::Slug, first.clone());
        filters.add_filter(HookName::Slug, second);

        assert!(filters.remove_filter(&HookName::Slug, &first));

        let result = filters.apply_filters(&HookName::Slug, json!("v"), &Value::Null);
        assert_eq!(result, json!("v-2"));
    }

    #[test]
    fn test_remove_filter_unknown_callback() {
        let filters = Filters::new();
        filters.add_filter(HookName::Slug, append("-1"));

        assert!(!filters.remove_filter(&HookName::Slug, &append("-1")));
        assert!(!filters.remove_filter(&HookName::from("missing"), &append("-1")));
    }

    #[test]
    fn test_remove_filter_removes_one_registration() {
        let filters = Filters::new();
        let twice = append("-x");
        filters.add_filter(HookName::Slug, twice.clone());
        filters.add_filter(HookName::Slug, twice.clone());

        assert!(filters.remove_filter(&HookName::Slug, &twice));
        assert_eq!(filters.filter_count(&HookName::Slug), 1);
    }

    #[test]
    fn test_reset_restores_fixed_shape() {
        let filters = Filters::new();
        let before = filters.len();
        filters.add_filter(HookName::RichTextOutput, append("-x"));
        filters.add_filter("customName", append("-x"));

        filters.reset_filters();

        assert_eq!(filters.len(), before);
        assert_eq!(filters.names().len(), 23);
        assert!(filters.names().iter().all(HookName::is_built_in));
        assert!(!filters.has_filters(&HookName::RichTextOutput));
    }

    #[test]
    fn test_set_filters_replaces_registrations() {
        let filters = Filters::new();
        filters.add_filter(HookName::Slug, append("-old"));

        let ok = filters.set_filters([
            (HookName::Slug, Some(append("-new"))),
            (HookName::SlugParts, None),
        ]);

        assert!(ok);
        assert_eq!(filters.filter_count(&HookName::Slug), 1);
        assert!(!filters.has_filters(&HookName::SlugParts));
        let result = filters.apply_filters(&HookName::Slug, json!("v"), &Value::Null);
        assert_eq!(result, json!("v-new"));
    }

    #[test]
    fn test_set_filters_empty_map_is_rejected() {
        let filters = Filters::new();
        filters.add_filter(HookName::Slug, append("-keep"));

        assert!(!filters.set_filters(Vec::new()));
        assert!(filters.has_filters(&HookName::Slug));
    }

    #[test]
    fn test_callback_may_register_during_application() {
        let filters = Arc::new(Filters::new());
        let inner = Arc::clone(&filters);
        filters.add_filter(
            HookName::Slug,
            Filter::new(move |value: Value, _: &Value| {
                inner.add_filter(HookName::SlugParts, Filter::new(|v: Value, _: &Value| v));
                value
            }),
        );

        let result = filters.apply_filters(&HookName::Slug, json!("v"), &Value::Null);

        assert_eq!(result, json!("v"));
        assert!(filters.has_filters(&HookName::SlugParts));
    }
}
