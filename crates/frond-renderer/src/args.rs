//! Arguments handed to render functions.

use std::fmt;

use frond_store::{Content, RenderItem};
use futures::future::BoxFuture;

use crate::context::RenderContext;
use crate::page::PageContext;

/// Arguments of a single render function call.
///
/// `parents` lists the ancestors of `item`, root first; its length equals
/// the depth of `item` in the rendered tree. Each nested call receives a new
/// list, so siblings always see the same chain.
#[derive(Clone, Copy)]
pub struct RenderArgs<'a> {
    /// Item being rendered.
    pub item: &'a RenderItem,
    /// Ancestors, root first.
    pub parents: &'a [&'a RenderItem],
    /// State of the page being rendered.
    pub page: &'a PageContext,
    /// Render context, for recursion and hooks.
    pub context: &'a RenderContext,
}

impl<'a> RenderArgs<'a> {
    /// Immediate parent of the item.
    #[must_use]
    pub fn parent(&self) -> Option<&'a RenderItem> {
        self.parents.last().copied()
    }

    /// Nearest ancestor with the given render type.
    #[must_use]
    pub fn ancestor(&self, render_type: &str) -> Option<&'a RenderItem> {
        self.parents
            .iter()
            .rev()
            .copied()
            .find(|p| p.render_type.as_deref() == Some(render_type))
    }

    /// Render the item's own content with the item appended to the parents.
    #[must_use]
    pub fn render_children(self) -> BoxFuture<'a, String> {
        self.render_nested(self.item.content.as_ref())
    }

    /// Render arbitrary content as if it were nested in the item.
    #[must_use]
    pub fn render_nested(self, content: Option<&'a Content>) -> BoxFuture<'a, String> {
        Box::pin(async move {
            let mut parents = Vec::with_capacity(self.parents.len() + 1);
            parents.extend_from_slice(self.parents);
            parents.push(self.item);
            self.context
                .render_content(content, &parents, self.page)
                .await
        })
    }
}

impl fmt::Debug for RenderArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderArgs")
            .field("item", &self.item.id)
            .field(
                "parents",
                &self.parents.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
