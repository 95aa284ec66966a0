//! Store data model and lookup trait.
//!
//! The store is built once per build or request cycle and is read-only while
//! rendering. Link and archive helpers query it; the render engine never does.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::item::RenderItem;

/// Immediate ancestor of an item, stored as `[id, slug, title]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String, String)", into = "(String, String, String)")]
pub struct ParentEntry {
    pub id: String,
    pub slug: String,
    pub title: String,
}

impl ParentEntry {
    #[must_use]
    pub fn new(id: impl Into<String>, slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
            title: title.into(),
        }
    }
}

impl From<(String, String, String)> for ParentEntry {
    fn from((id, slug, title): (String, String, String)) -> Self {
        Self { id, slug, title }
    }
}

impl From<ParentEntry> for (String, String, String) {
    fn from(entry: ParentEntry) -> Self {
        (entry.id, entry.slug, entry.title)
    }
}

/// Listing metadata for a content type or taxonomy.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveMeta {
    /// Id of the archive page.
    pub id: String,
    /// Archive page slug, used as the type segment of member slugs.
    pub slug: String,
    pub title: String,
    /// Singular label (e.g. "Post").
    pub singular: String,
    /// Plural label (e.g. "Posts").
    pub plural: String,
    /// Per-locale replacements.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub locales: BTreeMap<String, ArchiveMeta>,
}

impl ArchiveMeta {
    /// Metadata for `locale`, falling back to the default entry.
    #[must_use]
    pub fn for_locale(&self, locale: Option<&str>) -> &Self {
        locale
            .and_then(|locale| self.locales.get(locale))
            .unwrap_or(self)
    }
}

/// Named navigation menu.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Navigation {
    pub id: String,
    pub title: String,
    /// Location key the layout uses to place the menu (e.g. "main").
    pub location: String,
    pub items: Vec<NavigationItem>,
}

/// Entry of a [`Navigation`] menu.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationItem {
    pub id: String,
    pub title: String,
    /// Target item for internal links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_link: Option<Box<RenderItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavigationItem>,
}

/// Everything a store holds.
///
/// `parents` maps content type → item id → immediate parent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreData {
    pub parents: BTreeMap<String, BTreeMap<String, ParentEntry>>,
    pub archive_meta: BTreeMap<String, ArchiveMeta>,
    pub navigations: Vec<Navigation>,
    pub form_meta: BTreeMap<String, Value>,
    pub image_meta: BTreeMap<String, Value>,
}

/// Read-only lookups over store data.
pub trait Store: Send + Sync {
    /// Immediate parent of item `id` of type `content_type`.
    fn parent(&self, content_type: &str, id: &str) -> Option<ParentEntry>;

    /// Archive metadata for a content type or taxonomy id.
    fn archive_meta(&self, content_type: &str) -> Option<ArchiveMeta>;

    /// All navigation menus.
    fn navigations(&self) -> Vec<Navigation>;

    /// Form metadata by form id.
    fn form_meta(&self, id: &str) -> Option<Value>;

    /// Image metadata by image id.
    fn image_meta(&self, id: &str) -> Option<Value>;

    /// Ancestors of item `id`, nearest first.
    ///
    /// Stops at the first missing link or when an id repeats.
    fn ancestors(&self, content_type: &str, id: &str) -> Vec<ParentEntry> {
        let mut chain: Vec<ParentEntry> = Vec::new();
        let mut current = id.to_owned();
        while let Some(parent) = self.parent(content_type, &current) {
            if parent.id == id || chain.iter().any(|p| p.id == parent.id) {
                tracing::warn!(content_type, id, parent = %parent.id, "Cycle in parents map");
                break;
            }
            current.clone_from(&parent.id);
            chain.push(parent);
        }
        chain
    }
}

/// Error loading store data.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Store file could not be read.
    #[error("Failed to read store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Store JSON is malformed.
    #[error("Invalid store data: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parent_entry_from_tuple() {
        let entry: ParentEntry = serde_json::from_value(json!(["7", "about", "About"])).unwrap();
        assert_eq!(entry, ParentEntry::new("7", "about", "About"));
        assert_eq!(serde_json::to_value(&entry).unwrap(), json!(["7", "about", "About"]));
    }

    #[test]
    fn test_archive_meta_locale_override() {
        let meta: ArchiveMeta = serde_json::from_value(json!({
            "id": "10",
            "slug": "blog",
            "title": "Blog",
            "singular": "Post",
            "plural": "Posts",
            "locales": {
                "es": { "id": "11", "slug": "noticias", "title": "Noticias" }
            }
        }))
        .unwrap();

        assert_eq!(meta.for_locale(None).slug, "blog");
        assert_eq!(meta.for_locale(Some("fr")).slug, "blog");
        assert_eq!(meta.for_locale(Some("es")).slug, "noticias");
    }

    #[test]
    fn test_store_data_camel_case_keys() {
        let data: StoreData = serde_json::from_value(json!({
            "parents": { "page": { "2": ["1", "about", "About"] } },
            "archiveMeta": { "post": { "slug": "blog" } },
            "navigations": [{ "id": "n1", "location": "main", "items": [] }],
            "formMeta": { "f1": { "action": "/contact" } }
        }))
        .unwrap();

        assert_eq!(data.parents["page"]["2"].slug, "about");
        assert_eq!(data.archive_meta["post"].slug, "blog");
        assert_eq!(data.navigations[0].location, "main");
        assert_eq!(data.form_meta["f1"]["action"], json!("/contact"));
        assert!(data.image_meta.is_empty());
    }
}
