//! Archive and taxonomy helpers.

use frond_store::{ArchiveMeta, RenderItem, Store};
use serde::Deserialize;
use serde_json::Value;

/// Taxonomy a `taxonomy` or `term` item belongs to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxonomyInfo {
    /// Taxonomy id (e.g. "category").
    pub id: String,
    pub slug: String,
    pub title: String,
    /// Content types the taxonomy classifies; the first is primary.
    pub content_types: Vec<String>,
    /// Whether slugs start with the primary content type's archive segment.
    #[serde(alias = "usePrimaryContentTypeSlug")]
    pub use_content_type_slug: bool,
    /// Whether terms render as standalone pages.
    pub is_page: bool,
}

impl TaxonomyInfo {
    /// Taxonomy of a `taxonomy` item (the item itself) or a `term` item
    /// (its `taxonomy` field, either an object or a bare id).
    #[must_use]
    pub fn from_item(item: &RenderItem) -> Option<Self> {
        match item.content_type.as_str() {
            "taxonomy" => parse(item.to_value()),
            "term" => match item.field("taxonomy")? {
                Value::String(id) if !id.is_empty() => Some(Self {
                    id: id.clone(),
                    ..Self::default()
                }),
                value @ Value::Object(_) => parse(value.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Primary content type, if any.
    #[must_use]
    pub fn primary_content_type(&self) -> Option<&str> {
        self.content_types
            .first()
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }
}

fn parse(value: Value) -> Option<TaxonomyInfo> {
    match serde_json::from_value::<TaxonomyInfo>(value) {
        Ok(info) if !info.id.is_empty() => Some(info),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring malformed taxonomy data");
            None
        }
    }
}

/// Singular and plural labels of an archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveLabels {
    pub singular: String,
    pub plural: String,
}

/// Archive metadata for `content_type`, with the locale override applied.
#[must_use]
pub fn archive_meta(store: &dyn Store, content_type: &str, locale: Option<&str>) -> Option<ArchiveMeta> {
    store
        .archive_meta(content_type)
        .map(|meta| meta.for_locale(locale).clone())
}

/// Archive labels for `content_type`.
///
/// Missing labels fall back to the other label, then to the content type.
#[must_use]
pub fn archive_labels(store: &dyn Store, content_type: &str, locale: Option<&str>) -> ArchiveLabels {
    let meta = archive_meta(store, content_type, locale).unwrap_or_default();
    let pick = |first: &str, second: &str| {
        [first, second, content_type]
            .into_iter()
            .find(|label| !label.is_empty())
            .unwrap_or_default()
            .to_owned()
    };
    ArchiveLabels {
        singular: pick(&meta.singular, &meta.plural),
        plural: pick(&meta.plural, &meta.singular),
    }
}
