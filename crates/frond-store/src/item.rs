//! Normalized content tree.
//!
//! Every source (CMS export, local JSON) is normalized into [`RenderItem`]
//! nodes before rendering. The render pipeline reads these trees and never
//! mutates them; hook filters work on JSON copies.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A node in the content tree.
///
/// `content_type` describes what the data means; `render_type` selects the
/// render function. Fields without a dedicated slot (title, slug, locale,
/// taxonomy, internal links, file metadata) are kept in [`RenderItem::fields`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderItem {
    /// Stable identity.
    #[serde(default)]
    pub id: String,

    /// Data semantics tag (e.g. "page", "post", "term").
    #[serde(default)]
    pub content_type: String,

    /// Render function key. May differ from `content_type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_type: Option<String>,

    /// Literal text or nested items.
    #[serde(
        default,
        deserialize_with = "lenient_content",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<Content>,

    /// Source fields carried through unchanged.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Content of a [`RenderItem`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// Literal text, emitted verbatim.
    Text(String),
    /// Ordered child items.
    Items(Vec<RenderItem>),
    /// A single child item.
    Item(Box<RenderItem>),
}

impl Content {
    /// Convert arbitrary JSON into content.
    ///
    /// Values that are neither a string, an array of items nor an item
    /// object yield `None`. Array elements are parsed one at a time: an
    /// element that is not an item is dropped and its siblings are kept.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(Self::Text(text)),
            Value::Array(values) => {
                let items = values
                    .into_iter()
                    .enumerate()
                    .filter_map(|(index, value)| match serde_json::from_value(value) {
                        Ok(item) => Some(item),
                        Err(e) => {
                            tracing::warn!(index, error = %e, "Skipping malformed content item");
                            None
                        }
                    })
                    .collect();
                Some(Self::Items(items))
            }
            Value::Object(_) => match serde_json::from_value(value) {
                Ok(item) => Some(Self::Item(Box::new(item))),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed content item");
                    None
                }
            },
            other => {
                tracing::debug!(value = %other, "Ignoring content of unexpected shape");
                None
            }
        }
    }

    /// Child items in source order. Text content has none.
    #[must_use]
    pub fn items(&self) -> &[RenderItem] {
        match self {
            Self::Text(_) => &[],
            Self::Items(items) => items,
            Self::Item(item) => std::slice::from_ref(item.as_ref()),
        }
    }

    /// Literal text, if this is text content.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

fn lenient_content<'de, D>(deserializer: D) -> Result<Option<Content>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Content::from_value(value))
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<RenderItem>> for Content {
    fn from(items: Vec<RenderItem>) -> Self {
        Self::Items(items)
    }
}

impl From<RenderItem> for Content {
    fn from(item: RenderItem) -> Self {
        Self::Item(Box::new(item))
    }
}

impl RenderItem {
    /// Create an item with the given identity and content type.
    #[must_use]
    pub fn new(id: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content_type: content_type.into(),
            ..Self::default()
        }
    }

    /// Set the render function key.
    #[must_use]
    pub fn with_render_type(mut self, render_type: impl Into<String>) -> Self {
        self.render_type = Some(render_type.into());
        self
    }

    /// Set the content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<Content>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set an extra source field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Extra source field by key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Extra source field as a non-empty string.
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        self.str_field("slug")
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.str_field("title")
    }

    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.str_field("locale")
    }

    /// Literal text content, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.content.as_ref().and_then(Content::as_text)
    }

    /// Child items in source order.
    #[must_use]
    pub fn children(&self) -> &[RenderItem] {
        self.content.as_ref().map_or(&[], Content::items)
    }

    /// Distinct render types used anywhere in this tree, this item included.
    #[must_use]
    pub fn render_types(&self) -> BTreeSet<String> {
        let mut types = BTreeSet::new();
        self.collect_render_types(&mut types);
        types
    }

    fn collect_render_types(&self, types: &mut BTreeSet<String>) {
        if let Some(render_type) = &self.render_type {
            types.insert(render_type.clone());
        }
        for child in self.children() {
            child.collect_render_types(types);
        }
    }

    /// JSON form of the item, as handed to hook callbacks.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Parse an item back from a hook callback result.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an object.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
