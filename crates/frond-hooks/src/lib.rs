//! Ordered filter and action registries.
//!
//! Every extension point of the render pipeline is a [`HookName`]. Plugins
//! register callbacks under a name and the pipeline dispatches to them at
//! well-known points without knowing what they do.
//!
//! # Filters and actions
//!
//! - [`Filters`]: each callback receives the current value plus shared args
//!   and returns the next value. Callbacks compose in registration order.
//! - [`Actions`]: each callback receives the same args and runs for its side
//!   effects only.
//!
//! Both registries have a synchronous entry point for the hot path and an
//! asynchronous one that awaits callbacks one after another. When nothing is
//! registered under a name the asynchronous entry point answers immediately
//! with [`Applied::Ready`] / [`Dispatch::Done`], so callers can tell whether
//! anything needs awaiting.
//!
//! # Example
//!
//! ```
//! use frond_hooks::{Filter, Filters, HookName};
//! use serde_json::{Value, json};
//!
//! let filters = Filters::new();
//! filters.add_filter(
//!     HookName::Slug,
//!     Filter::new(|value: Value, _args: &Value| {
//!         json!(format!("{}/", value.as_str().unwrap_or_default()))
//!     }),
//! );
//!
//! let slug = filters.apply_filters(&HookName::Slug, json!("blog/hello"), &Value::Null);
//! assert_eq!(slug, json!("blog/hello/"));
//! ```

mod actions;
mod error;
mod filters;
mod name;

pub use actions::{Action, Actions, Dispatch};
pub use error::HookError;
pub use filters::{Applied, Filter, Filters};
pub use name::HookName;

/// Filter and action registries bundled together.
///
/// A render context owns one of these; tests build a fresh one per case
/// instead of resetting shared state.
#[derive(Debug, Default)]
pub struct Hooks {
    /// Value-transforming callbacks.
    pub filters: Filters,
    /// Side-effect callbacks.
    pub actions: Actions,
}

impl Hooks {
    /// Create registries holding the built-in extension points, all empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset both registries to their initial shape.
    pub fn reset(&self) {
        self.filters.reset_filters();
        self.actions.reset_actions();
    }
}
