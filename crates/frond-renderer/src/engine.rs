//! Recursive tree walk.
//!
//! [`RenderContext::render_content`] iterates a list of items and
//! [`RenderContext::render_item`] dispatches a single item to the render
//! function registered for its `renderType`. Render functions recurse through
//! [`crate::RenderArgs::render_children`].
//!
//! Items render strictly one after another so output order and side effects
//! (headings, assets) follow source order. Nothing on this path fails: a
//! missing table, an unknown render type or an unusable filter result all
//! degrade to empty or unfiltered output.

use frond_hooks::HookName;
use frond_store::{Content, RenderItem};
use futures::future::BoxFuture;
use serde_json::{Value, json};

use crate::args::RenderArgs;
use crate::context::RenderContext;
use crate::page::PageContext;

/// Output of [`RenderContext::render_item`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedItem {
    pub output: String,
    /// Whether a render function handled the item.
    pub found: bool,
}

impl RenderContext {
    /// Render a content list in source order.
    ///
    /// Text is returned verbatim; a single item is treated as a one-element
    /// list. The joined output of a list passes through the `renderContent`
    /// filter. Absent content and empty lists render to `""`.
    pub fn render_content<'a>(
        &'a self,
        content: Option<&'a Content>,
        parents: &'a [&'a RenderItem],
        page: &'a PageContext,
    ) -> BoxFuture<'a, String> {
        Box::pin(async move {
            let items = match content {
                None => return String::new(),
                Some(Content::Text(text)) => return text.clone(),
                Some(content) => content.items(),
            };
            if items.is_empty() {
                return String::new();
            }

            let mut output = String::new();
            for item in items {
                output.push_str(&self.render_item(item, parents, page).await.output);
            }

            self.filter_content(output, items, parents).await
        })
    }

    /// Render a single item with the function registered for its render type.
    ///
    /// The item first passes through the `renderItemData` filter, and the
    /// output through the `renderItem` filter. An item without a render type
    /// renders its literal text content, if any; an unknown render type
    /// renders to `""`.
    pub fn render_item<'a>(
        &'a self,
        item: &'a RenderItem,
        parents: &'a [&'a RenderItem],
        page: &'a PageContext,
    ) -> BoxFuture<'a, RenderedItem> {
        Box::pin(async move {
            let Some(functions) = self.render_functions() else {
                tracing::warn!(id = %item.id, "Render functions not set, rendering nothing");
                return RenderedItem::default();
            };

            let filtered = self.filter_item_data(item, parents).await;
            let item = filtered.as_ref().unwrap_or(item);

            let Some(render_type) = item.render_type.as_deref() else {
                return RenderedItem {
                    output: item.text().unwrap_or_default().to_owned(),
                    found: false,
                };
            };
            let Some(function) = functions.get(render_type) else {
                tracing::debug!(id = %item.id, render_type, "No render function");
                return RenderedItem::default();
            };

            let args = RenderArgs {
                item,
                parents,
                page,
                context: self,
            };
            let output = function.render(args).await;

            RenderedItem {
                output: self.filter_item_output(output, item, parents).await,
                found: true,
            }
        })
    }

    async fn filter_content(
        &self,
        output: String,
        items: &[RenderItem],
        parents: &[&RenderItem],
    ) -> String {
        if !self.filters().has_filters(&HookName::RenderContent) {
            return output;
        }
        let args = json!({
            "content": items.iter().map(describe).collect::<Vec<_>>(),
            "parents": parents.iter().copied().map(describe).collect::<Vec<_>>(),
        });
        let value = self
            .filters()
            .apply_filters_async(&HookName::RenderContent, Value::String(output.clone()), args)
            .await;
        into_output(value, &HookName::RenderContent).unwrap_or(output)
    }

    async fn filter_item_data(
        &self,
        item: &RenderItem,
        parents: &[&RenderItem],
    ) -> Option<RenderItem> {
        if !self.filters().has_filters(&HookName::RenderItemData) {
            return None;
        }
        let args = json!({
            "parents": parents.iter().copied().map(describe).collect::<Vec<_>>(),
        });
        let value = self
            .filters()
            .apply_filters_async(&HookName::RenderItemData, item.to_value(), args)
            .await;
        match RenderItem::from_value(value) {
            Ok(filtered) => Some(filtered),
            Err(e) => {
                tracing::warn!(id = %item.id, error = %e, "Ignoring invalid renderItemData result");
                None
            }
        }
    }

    async fn filter_item_output(
        &self,
        output: String,
        item: &RenderItem,
        parents: &[&RenderItem],
    ) -> String {
        if !self.filters().has_filters(&HookName::RenderItem) {
            return output;
        }
        let args = json!({
            "item": item.to_value(),
            "parents": parents.iter().copied().map(describe).collect::<Vec<_>>(),
        });
        let value = self
            .filters()
            .apply_filters_async(&HookName::RenderItem, Value::String(output.clone()), args)
            .await;
        into_output(value, &HookName::RenderItem).unwrap_or(output)
    }
}

/// Identity of an item as seen by hook callbacks.
fn describe(item: &RenderItem) -> Value {
    json!({
        "id": item.id,
        "contentType": item.content_type,
        "renderType": item.render_type,
    })
}

fn into_output(value: Value, hook: &HookName) -> Option<String> {
    match value {
        Value::String(output) => Some(output),
        other => {
            tracing::warn!(%hook, result = %other, "Filter returned a non-string output, ignoring");
            None
        }
    }
}
