//! Explicit render context.

use std::sync::{Arc, PoisonError, RwLock};

use frond_hooks::{Actions, Filters, Hooks};

use crate::functions::RenderFunctions;

/// Hook registries plus the render-function table.
///
/// One context is built per build or per long-lived worker and passed by
/// reference into every render call. Configure it before rendering starts;
/// concurrent renders only read from it.
#[derive(Debug, Default)]
pub struct RenderContext {
    hooks: Arc<Hooks>,
    functions: RwLock<Option<Arc<RenderFunctions>>>,
}

impl RenderContext {
    /// Create a context with fresh hook registries and no render functions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context sharing existing hook registries.
    #[must_use]
    pub fn with_hooks(hooks: Arc<Hooks>) -> Self {
        Self {
            hooks,
            functions: RwLock::new(None),
        }
    }

    /// Shared hook registries.
    #[must_use]
    pub fn hooks(&self) -> &Arc<Hooks> {
        &self.hooks
    }

    #[must_use]
    pub fn filters(&self) -> &Filters {
        &self.hooks.filters
    }

    #[must_use]
    pub fn actions(&self) -> &Actions {
        &self.hooks.actions
    }

    /// Install the render-function table.
    ///
    /// Renders already in flight keep the table they started with.
    pub fn set_render_functions(&self, functions: RenderFunctions) {
        let mut slot = self.functions.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(functions));
    }

    /// Current render-function table, if one was installed.
    #[must_use]
    pub fn render_functions(&self) -> Option<Arc<RenderFunctions>> {
        self.functions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clear the render-function table and reset both hook registries.
    pub fn reset(&self) {
        *self.functions.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.hooks.reset();
    }
}
