//! Render-function table.
//!
//! The engine stays agnostic of what it renders: every `renderType` maps to a
//! [`RenderFunction`], and page-level output goes through the layout,
//! navigation and HTTP-error functions. Closures are adapted with
//! [`render_fn`], [`render_sync`], [`layout_fn`], [`navigation_fn`] and
//! [`http_error_fn`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;

use crate::args::RenderArgs;
use crate::assets::Assets;
use crate::page::{PageContext, RenderedNavigations};

/// Renders one item to HTML.
///
/// Implementations may await anything, including nested rendering through
/// [`RenderArgs::render_children`].
pub trait RenderFunction: Send + Sync {
    fn render<'a>(&'a self, args: RenderArgs<'a>) -> BoxFuture<'a, String>;
}

/// Wraps the rendered page body into a full document.
pub trait LayoutFunction: Send + Sync {
    fn layout(&self, args: &LayoutArgs<'_>) -> String;
}

/// Renders navigation menus for a page, keyed by location.
pub trait NavigationFunction: Send + Sync {
    fn navigation(&self, args: &NavigationArgs<'_>) -> RenderedNavigations;
}

/// Renders an error page.
pub trait HttpErrorFunction: Send + Sync {
    fn http_error(&self, args: &HttpErrorArgs<'_>) -> String;
}

/// Page-level metadata passed to the layout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub id: String,
    pub content_type: String,
    pub title: String,
    pub slug: String,
    pub permalink: String,
    pub locale: Option<String>,
    /// HTTP status the page is served with.
    pub status: u16,
}

/// Arguments of a layout call.
#[derive(Clone, Copy, Debug)]
pub struct LayoutArgs<'a> {
    /// Rendered page body.
    pub content: &'a str,
    pub meta: &'a PageMeta,
    pub page: &'a PageContext,
    /// Scripts and styles registered during the walk.
    pub assets: &'a Assets,
}

/// Navigation menu with links already resolved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NavMenu {
    pub id: String,
    pub title: String,
    pub location: String,
    pub items: Vec<NavLink>,
}

/// Resolved navigation entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub id: String,
    pub title: String,
    pub link: String,
    /// Whether the link leaves the site.
    pub external: bool,
    /// Whether the link points at the page being rendered.
    pub current: bool,
    pub children: Vec<NavLink>,
}

/// Arguments of a navigation call.
#[derive(Clone, Copy, Debug)]
pub struct NavigationArgs<'a> {
    pub menus: &'a [NavMenu],
    /// Permalink of the page being rendered.
    pub current_link: &'a str,
}

/// Arguments of an error page call.
#[derive(Clone, Copy, Debug)]
pub struct HttpErrorArgs<'a> {
    pub status: u16,
    pub meta: &'a PageMeta,
}

/// Mapping from render type to render function, plus page-level functions.
///
/// Installed with [`crate::RenderContext::set_render_functions`] and read on
/// every render call. Partial tables are fine: an unknown render type
/// renders to an empty string.
#[derive(Clone, Default)]
pub struct RenderFunctions {
    functions: HashMap<String, Arc<dyn RenderFunction>>,
    layout: Option<Arc<dyn LayoutFunction>>,
    navigation: Option<Arc<dyn NavigationFunction>>,
    http_error: Option<Arc<dyn HttpErrorFunction>>,
}

impl RenderFunctions {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the render function for `render_type`, replacing any previous one.
    #[must_use]
    pub fn with_function<R: RenderFunction + 'static>(
        mut self,
        render_type: impl Into<String>,
        function: R,
    ) -> Self {
        self.functions.insert(render_type.into(), Arc::new(function));
        self
    }

    #[must_use]
    pub fn with_layout<L: LayoutFunction + 'static>(mut self, layout: L) -> Self {
        self.layout = Some(Arc::new(layout));
        self
    }

    #[must_use]
    pub fn with_navigation<N: NavigationFunction + 'static>(mut self, navigation: N) -> Self {
        self.navigation = Some(Arc::new(navigation));
        self
    }

    #[must_use]
    pub fn with_http_error<H: HttpErrorFunction + 'static>(mut self, http_error: H) -> Self {
        self.http_error = Some(Arc::new(http_error));
        self
    }

    /// Render function for `render_type`.
    #[must_use]
    pub fn get(&self, render_type: &str) -> Option<&Arc<dyn RenderFunction>> {
        self.functions.get(render_type)
    }

    #[must_use]
    pub fn contains(&self, render_type: &str) -> bool {
        self.functions.contains_key(render_type)
    }

    /// Registered render types, sorted.
    #[must_use]
    pub fn render_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    #[must_use]
    pub fn layout(&self) -> Option<&Arc<dyn LayoutFunction>> {
        self.layout.as_ref()
    }

    #[must_use]
    pub fn navigation(&self) -> Option<&Arc<dyn NavigationFunction>> {
        self.navigation.as_ref()
    }

    #[must_use]
    pub fn http_error(&self) -> Option<&Arc<dyn HttpErrorFunction>> {
        self.http_error.as_ref()
    }
}

impl fmt::Debug for RenderFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderFunctions")
            .field("functions", &self.render_types())
            .field("layout", &self.layout.is_some())
            .field("navigation", &self.navigation.is_some())
            .field("http_error", &self.http_error.is_some())
            .finish()
    }
}

/// Render function backed by an async closure.
pub struct FnRender<F>(F);

impl<F> RenderFunction for FnRender<F>
where
    F: for<'a> Fn(RenderArgs<'a>) -> BoxFuture<'a, String> + Send + Sync,
{
    fn render<'a>(&'a self, args: RenderArgs<'a>) -> BoxFuture<'a, String> {
        (self.0)(args)
    }
}

/// Render function backed by a synchronous closure.
pub struct SyncRender<F>(F);

impl<F> RenderFunction for SyncRender<F>
where
    F: Fn(&RenderArgs<'_>) -> String + Send + Sync,
{
    fn render<'a>(&'a self, args: RenderArgs<'a>) -> BoxFuture<'a, String> {
        futures::future::ready((self.0)(&args)).boxed()
    }
}

/// Adapt an async closure into a [`RenderFunction`].
///
/// ```
/// use frond_renderer::{RenderFunctions, render_fn};
/// use futures::FutureExt;
///
/// let functions = RenderFunctions::new().with_function(
///     "container",
///     render_fn(|args| {
///         async move { format!("<div>{}</div>", args.render_children().await) }.boxed()
///     }),
/// );
/// assert!(functions.contains("container"));
/// ```
pub fn render_fn<F>(f: F) -> FnRender<F>
where
    F: for<'a> Fn(RenderArgs<'a>) -> BoxFuture<'a, String> + Send + Sync,
{
    FnRender(f)
}

/// Adapt a synchronous closure into a [`RenderFunction`].
pub fn render_sync<F>(f: F) -> SyncRender<F>
where
    F: Fn(&RenderArgs<'_>) -> String + Send + Sync,
{
    SyncRender(f)
}

/// Layout backed by a closure.
pub struct FnLayout<F>(F);

impl<F> LayoutFunction for FnLayout<F>
where
    F: Fn(&LayoutArgs<'_>) -> String + Send + Sync,
{
    fn layout(&self, args: &LayoutArgs<'_>) -> String {
        (self.0)(args)
    }
}

pub fn layout_fn<F>(f: F) -> FnLayout<F>
where
    F: Fn(&LayoutArgs<'_>) -> String + Send + Sync,
{
    FnLayout(f)
}

/// Navigation function backed by a closure.
pub struct FnNavigation<F>(F);

impl<F> NavigationFunction for FnNavigation<F>
where
    F: Fn(&NavigationArgs<'_>) -> RenderedNavigations + Send + Sync,
{
    fn navigation(&self, args: &NavigationArgs<'_>) -> RenderedNavigations {
        (self.0)(args)
    }
}

pub fn navigation_fn<F>(f: F) -> FnNavigation<F>
where
    F: Fn(&NavigationArgs<'_>) -> RenderedNavigations + Send + Sync,
{
    FnNavigation(f)
}

/// Error page function backed by a closure.
pub struct FnHttpError<F>(F);

impl<F> HttpErrorFunction for FnHttpError<F>
where
    F: Fn(&HttpErrorArgs<'_>) -> String + Send + Sync,
{
    fn http_error(&self, args: &HttpErrorArgs<'_>) -> String {
        (self.0)(args)
    }
}

pub fn http_error_fn<F>(f: F) -> FnHttpError<F>
where
    F: Fn(&HttpErrorArgs<'_>) -> String + Send + Sync,
{
    FnHttpError(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lookup() {
        let functions = RenderFunctions::new()
            .with_function("text", render_sync(|args| args.item.text().unwrap_or_default().to_owned()))
            .with_function("richText", render_sync(|_| String::new()));

        assert!(functions.get("text").is_some());
        assert!(functions.get("missing").is_none());
        assert_eq!(functions.render_types(), vec!["richText", "text"]);
        assert!(functions.layout().is_none());
    }

    #[test]
    fn test_later_registration_replaces() {
        let functions = RenderFunctions::new()
            .with_function("text", render_sync(|_| "a".to_owned()))
            .with_function("text", render_sync(|_| "b".to_owned()));

        assert_eq!(functions.render_types(), vec!["text"]);
    }

    #[test]
    fn test_page_level_functions() {
        let functions = RenderFunctions::new()
            .with_layout(layout_fn(|args| format!("<main>{}</main>", args.content)))
            .with_http_error(http_error_fn(|args| format!("Error {}", args.status)));

        let meta = PageMeta::default();
        let page = PageContext::new();
        let assets = Assets::default();
        let layout = functions.layout().unwrap();
        let html = layout.layout(&LayoutArgs {
            content: "body",
            meta: &meta,
            page: &page,
            assets: &assets,
        });
        assert_eq!(html, "<main>body</main>");

        let error = functions.http_error().unwrap();
        assert_eq!(
            error.http_error(&HttpErrorArgs {
                status: 404,
                meta: &meta
            }),
            "Error 404"
        );
    }

    #[test]
    fn test_debug_lists_render_types() {
        let functions = RenderFunctions::new().with_function("text", render_sync(|_| String::new()));
        let debug = format!("{functions:?}");
        assert!(debug.contains("\"text\""));
        assert!(debug.contains("layout: false"));
    }
}
