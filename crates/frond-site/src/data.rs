//! Input of a top-level render.

use std::collections::BTreeMap;

use frond_store::RenderItem;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything a render pass may turn into pages.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllData {
    /// Content type → items, in source order.
    pub content: BTreeMap<String, Vec<RenderItem>>,
    pub redirects: Vec<Redirect>,
}

/// Permanent or temporary redirect honored in serverless mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    /// Path the redirect applies to.
    pub from: String,
    /// Target path or URL.
    pub to: String,
    #[serde(default = "default_redirect_status")]
    pub status: u16,
}

fn default_redirect_status() -> u16 {
    301
}

impl AllData {
    /// Add `item` under its content type.
    #[must_use]
    pub fn with_item(mut self, item: RenderItem) -> Self {
        self.content
            .entry(item.content_type.clone())
            .or_default()
            .push(item);
        self
    }

    #[must_use]
    pub fn with_redirect(mut self, from: impl Into<String>, to: impl Into<String>, status: u16) -> Self {
        self.redirects.push(Redirect {
            from: from.into(),
            to: to.into(),
            status,
        });
        self
    }

    /// All items, grouped by content type.
    pub fn items(&self) -> impl Iterator<Item = &RenderItem> {
        self.content.values().flatten()
    }

    /// Item with the given id and content type.
    #[must_use]
    pub fn find(&self, id: &str, content_type: &str) -> Option<&RenderItem> {
        self.content
            .get(content_type)?
            .iter()
            .find(|item| item.id == id)
    }

    /// JSON form passed to hooks.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Number of pages of a paginated item.
///
/// Read from the item's `pagination` field, either a bare count or an
/// object with a `total` key. Items without one have a single page.
#[must_use]
pub fn page_count(item: &RenderItem) -> u32 {
    let total = match item.field("pagination") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::Object(map)) => map.get("total").and_then(Value::as_u64),
        _ => None,
    };
    total
        .and_then(|t| u32::try_from(t).ok())
        .unwrap_or(1)
        .max(1)
}
