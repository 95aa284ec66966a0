//! Rendering fragments outside a page.
//!
//! Used for excerpts and preview snippets. The walk is the same as for a full
//! page, only the page context is empty.

use frond_store::{Content, RenderItem};
use futures::future::BoxFuture;

use crate::context::RenderContext;
use crate::page::PageContext;

impl RenderContext {
    /// Render content with an empty page context and no parents.
    pub fn render_inline_content<'a>(&'a self, content: Option<&'a Content>) -> BoxFuture<'a, String> {
        Box::pin(async move {
            let page = PageContext::new();
            self.render_content(content, &[], &page).await
        })
    }

    /// Render a single item with an empty page context and no parents.
    pub fn render_inline_item<'a>(&'a self, item: &'a RenderItem) -> BoxFuture<'a, String> {
        Box::pin(async move {
            let page = PageContext::new();
            self.render_item(item, &[], &page).await.output
        })
    }
}
