//! Per-page render state.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use frond_store::RenderItem;
use serde::Serialize;

use crate::assets::Assets;
use crate::util::anchor_id;

/// Heading registered by a render function, for tables of contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Heading level (1-6).
    pub level: u8,
    pub title: String,
    /// Anchor id, unique within the page.
    pub id: String,
}

/// Current position in a paginated listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// 1-based current page.
    pub current: u32,
    /// Total number of pages.
    pub total: u32,
}

impl Pagination {
    /// Pagination clamped to `1..=total`.
    #[must_use]
    pub fn new(current: u32, total: u32) -> Self {
        let total = total.max(1);
        Self {
            current: current.clamp(1, total),
            total,
        }
    }

    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current < self.total
    }
}

/// Rendered navigation menus keyed by location.
pub type RenderedNavigations = BTreeMap<String, String>;

/// State shared by every render function while one page is rendered.
///
/// Read-only fields describe the page; headings and assets are collected
/// during the walk and read back by the layout afterwards.
#[derive(Debug, Default)]
pub struct PageContext {
    /// The page item being rendered, if any.
    pub page_data: Option<RenderItem>,
    /// Render types used anywhere in the page tree.
    pub page_contains: BTreeSet<String>,
    /// Navigation menus rendered for this page.
    pub navigations: RenderedNavigations,
    /// Query parameters of the request.
    pub query: BTreeMap<String, String>,
    pub pagination: Option<Pagination>,
    headings: Mutex<Vec<Heading>>,
    assets: Mutex<Assets>,
}

impl PageContext {
    /// Empty context used for inline fragments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for rendering `page`.
    #[must_use]
    pub fn for_page(page: RenderItem) -> Self {
        Self {
            page_contains: page.render_types(),
            page_data: Some(page),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_navigations(mut self, navigations: RenderedNavigations) -> Self {
        self.navigations = navigations;
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: BTreeMap<String, String>) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Whether any item in the page uses `render_type`.
    #[must_use]
    pub fn contains(&self, render_type: &str) -> bool {
        self.page_contains.contains(render_type)
    }

    /// Register a heading and return its unique anchor id.
    pub fn add_heading(&self, level: u8, title: impl Into<String>) -> String {
        let title = title.into();
        let base = match anchor_id(&title) {
            id if id.is_empty() => "section".to_owned(),
            id => id,
        };

        let mut headings = lock(&self.headings);
        let mut id = base.clone();
        let mut n = 1;
        while headings.iter().any(|h| h.id == id) {
            id = format!("{base}-{n}");
            n += 1;
        }
        headings.push(Heading {
            level: level.clamp(1, 6),
            title,
            id: id.clone(),
        });
        id
    }

    /// Headings registered so far, in render order.
    #[must_use]
    pub fn headings(&self) -> Vec<Heading> {
        lock(&self.headings).clone()
    }

    /// Register a script dependency.
    pub fn add_script(&self, handle: impl Into<String>, src: impl Into<String>) -> bool {
        lock(&self.assets).add_script(handle, src)
    }

    /// Register a stylesheet dependency.
    pub fn add_style(&self, handle: impl Into<String>, src: impl Into<String>) -> bool {
        lock(&self.assets).add_style(handle, src)
    }

    /// Snapshot of the registered assets.
    #[must_use]
    pub fn assets(&self) -> Assets {
        lock(&self.assets).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
