//! Recursive content-to-HTML render engine.
//!
//! Turns normalized [`frond_store::RenderItem`] trees into HTML strings. The
//! engine knows nothing about concrete components: each item is dispatched by
//! its `renderType` to a [`RenderFunction`] installed in the
//! [`RenderContext`].
//!
//! # Architecture
//!
//! - [`RenderContext`]: hook registries plus the swappable [`RenderFunctions`] table
//! - [`RenderContext::render_content`] / [`RenderContext::render_item`]: the tree walk
//! - [`RenderArgs`]: what a render function sees (item, root-first parents,
//!   page state, context for recursion)
//! - [`PageContext`]: per-page state (page data, headings, assets, query,
//!   pagination, rendered navigations)
//!
//! Hooks fire at the `renderItemData`, `renderItem` and `renderContent`
//! extension points.
//!
//! # Example
//!
//! ```
//! use frond_renderer::{RenderContext, RenderFunctions, render_fn, render_sync};
//! use frond_store::RenderItem;
//! use futures::FutureExt;
//!
//! let ctx = RenderContext::new();
//! ctx.set_render_functions(
//!     RenderFunctions::new()
//!         .with_function(
//!             "container",
//!             render_fn(|args| {
//!                 async move { format!("<div>{}</div>", args.render_children().await) }.boxed()
//!             }),
//!         )
//!         .with_function(
//!             "text",
//!             render_sync(|args| args.item.text().unwrap_or_default().to_owned()),
//!         ),
//! );
//!
//! let item = RenderItem::new("1", "block")
//!     .with_render_type("container")
//!     .with_content(vec![RenderItem::new("2", "block").with_render_type("text").with_content("Hi")]);
//!
//! let html = futures::executor::block_on(ctx.render_inline_item(&item));
//! assert_eq!(html, "<div>Hi</div>");
//! ```

mod args;
mod assets;
mod context;
mod engine;
mod functions;
mod inline;
mod page;
mod util;

pub use args::RenderArgs;
pub use assets::{Asset, Assets};
pub use context::RenderContext;
pub use engine::RenderedItem;
pub use functions::{
    FnHttpError, FnLayout, FnNavigation, FnRender, HttpErrorArgs, HttpErrorFunction, LayoutArgs,
    LayoutFunction, NavLink, NavMenu, NavigationArgs, NavigationFunction, PageMeta,
    RenderFunction, RenderFunctions, SyncRender, http_error_fn, layout_fn, navigation_fn,
    render_fn, render_sync,
};
pub use page::{Heading, PageContext, Pagination, RenderedNavigations};
pub use util::{anchor_id, escape_html};
