//! In-memory store.

use std::path::Path;

use serde_json::Value;

use crate::item::RenderItem;
use crate::store::{ArchiveMeta, Navigation, ParentEntry, Store, StoreData, StoreError};

/// Store backed by an owned [`StoreData`].
///
/// Built either from a JSON document or with the builder methods.
///
/// # Example
///
/// ```
/// use frond_store::{ArchiveMeta, MemoryStore, ParentEntry, Store};
///
/// let store = MemoryStore::new()
///     .with_parent("page", "2", ParentEntry::new("1", "about", "About"))
///     .with_archive_meta("post", ArchiveMeta { slug: "blog".into(), ..ArchiveMeta::default() });
///
/// assert_eq!(store.parent("page", "2").map(|p| p.slug), Some("about".to_owned()));
/// assert_eq!(store.archive_meta("post").map(|m| m.slug), Some("blog".to_owned()));
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    data: StoreData,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing store data.
    #[must_use]
    pub fn from_data(data: StoreData) -> Self {
        Self { data }
    }

    /// Parse store data from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Parse`] if the JSON does not match [`StoreData`].
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(Self::from_data(serde_json::from_str(json)?))
    }

    /// Parse store data from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Parse`] if the value does not match [`StoreData`].
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        Ok(Self::from_data(serde_json::from_value(value)?))
    }

    /// Load store data from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be read and
    /// [`StoreError::Parse`] if it is malformed.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let json = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), "Loaded store data");
        Ok(store)
    }

    /// Underlying data.
    #[must_use]
    pub fn data(&self) -> &StoreData {
        &self.data
    }

    /// Record the immediate parent of an item.
    #[must_use]
    pub fn with_parent(
        mut self,
        content_type: impl Into<String>,
        id: impl Into<String>,
        parent: ParentEntry,
    ) -> Self {
        self.data
            .parents
            .entry(content_type.into())
            .or_default()
            .insert(id.into(), parent);
        self
    }

    /// Set archive metadata for a content type or taxonomy id.
    #[must_use]
    pub fn with_archive_meta(mut self, content_type: impl Into<String>, meta: ArchiveMeta) -> Self {
        self.data.archive_meta.insert(content_type.into(), meta);
        self
    }

    #[must_use]
    pub fn with_navigation(mut self, navigation: Navigation) -> Self {
        self.data.navigations.push(navigation);
        self
    }

    #[must_use]
    pub fn with_form_meta(mut self, id: impl Into<String>, meta: Value) -> Self {
        self.data.form_meta.insert(id.into(), meta);
        self
    }

    #[must_use]
    pub fn with_image_meta(mut self, id: impl Into<String>, meta: Value) -> Self {
        self.data.image_meta.insert(id.into(), meta);
        self
    }

    /// Derive the parents map from hierarchical items.
    ///
    /// Each item whose `parent` field names another item of the same content
    /// type gets a [`ParentEntry`] for that item.
    #[must_use]
    pub fn with_parents_from(mut self, items: &[RenderItem]) -> Self {
        for item in items {
            let Some(parent_id) = item.str_field("parent") else {
                continue;
            };
            let Some(parent) = items
                .iter()
                .find(|p| p.id == parent_id && p.content_type == item.content_type)
            else {
                tracing::debug!(id = %item.id, parent = parent_id, "Parent item not found");
                continue;
            };
            let entry = ParentEntry::new(
                parent.id.clone(),
                parent.slug().unwrap_or_default(),
                parent.title().unwrap_or_default(),
            );
            self.data
                .parents
                .entry(item.content_type.clone())
                .or_default()
                .insert(item.id.clone(), entry);
        }
        self
    }
}

impl Store for MemoryStore {
    fn parent(&self, content_type: &str, id: &str) -> Option<ParentEntry> {
        self.data.parents.get(content_type)?.get(id).cloned()
    }

    fn archive_meta(&self, content_type: &str) -> Option<ArchiveMeta> {
        self.data.archive_meta.get(content_type).cloned()
    }

    fn navigations(&self) -> Vec<Navigation> {
        self.data.navigations.clone()
    }

    fn form_meta(&self, id: &str) -> Option<Value> {
        self.data.form_meta.get(id).cloned()
    }

    fn image_meta(&self, id: &str) -> Option<Value> {
        self.data.image_meta.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    static_assertions::assert_impl_all!(MemoryStore: Send, Sync, Store);

    #[test]
    fn test_empty_store_finds_nothing() {
        let store = MemoryStore::new();
        assert_eq!(store.parent("page", "1"), None);
        assert_eq!(store.archive_meta("post"), None);
        assert!(store.navigations().is_empty());
        assert_eq!(store.form_meta("f"), None);
        assert_eq!(store.image_meta("i"), None);
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let store = MemoryStore::new()
            .with_parent("page", "3", ParentEntry::new("2", "team", "Team"))
            .with_parent("page", "2", ParentEntry::new("1", "about", "About"));

        let slugs: Vec<String> = store
            .ancestors("page", "3")
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["team", "about"]);
    }

    #[test]
    fn test_ancestors_stops_on_cycle() {
        let store = MemoryStore::new()
            .with_parent("page", "a", ParentEntry::new("b", "b", "B"))
            .with_parent("page", "b", ParentEntry::new("a", "a", "A"));

        let ancestors = store.ancestors("page", "a");
        assert_eq!(ancestors, vec![ParentEntry::new("b", "b", "B")]);
    }

    #[test]
    fn test_ancestors_scoped_by_content_type() {
        let store = MemoryStore::new().with_parent("page", "2", ParentEntry::new("1", "a", "A"));
        assert!(store.ancestors("post", "2").is_empty());
    }

    #[test]
    fn test_with_parents_from_items() {
        let items = vec![
            RenderItem::new("1", "page").with_field("slug", "about").with_field("title", "About"),
            RenderItem::new("2", "page").with_field("slug", "team").with_field("parent", "1"),
            RenderItem::new("3", "post").with_field("slug", "x").with_field("parent", "1"),
        ];

        let store = MemoryStore::new().with_parents_from(&items);

        assert_eq!(store.parent("page", "2"), Some(ParentEntry::new("1", "about", "About")));
        assert_eq!(store.parent("post", "3"), None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            json!({ "archiveMeta": { "post": { "slug": "blog", "plural": "Posts" } } })
        )
        .unwrap();

        let store = MemoryStore::load(file.path()).unwrap();
        assert_eq!(store.archive_meta("post").unwrap().plural, "Posts");
    }

    #[test]
    fn test_load_missing_file() {
        let err = MemoryStore::load(Path::new("/nonexistent/store.json")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = MemoryStore::from_json("{ not json").unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }
}
