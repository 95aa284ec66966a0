//! Loading a project: configuration, local data and store.

use std::path::Path;
use std::sync::Arc;

use frond_config::{CliSettings, Config};
use frond_hooks::HookName;
use frond_renderer::RenderContext;
use frond_site::{AllData, Redirect, Site};
use frond_store::{MemoryStore, RenderItem, StoreData};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::builtin;
use crate::error::CliError;

/// Shape of a local data file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LocalData {
    /// Content type → items.
    content: std::collections::BTreeMap<String, Vec<RenderItem>>,
    redirects: Vec<Redirect>,
    store: Value,
}

/// A loaded project, ready to render.
pub(crate) struct Project {
    pub(crate) config: Config,
    pub(crate) site: Site,
    pub(crate) data: AllData,
}

impl Project {
    /// Load configuration and the local data file, then build the store.
    ///
    /// The raw file passes through the `localData` filter and the store data
    /// through the `storeData` filter; `storeData` actions run once the store
    /// is final.
    pub(crate) async fn load(
        config_path: Option<&Path>,
        settings: &CliSettings,
    ) -> Result<Self, CliError> {
        let config = Config::load(config_path, Some(settings))?;
        let context = Arc::new(RenderContext::new());
        context.set_render_functions(builtin::render_functions());
        Self::load_with(config, context).await
    }

    async fn load_with(config: Config, context: Arc<RenderContext>) -> Result<Self, CliError> {
        let path = &config.source_resolved.data;
        let raw = std::fs::read_to_string(path).map_err(|source| CliError::DataRead {
            path: path.clone(),
            source,
        })?;
        let raw: Value = serde_json::from_str(&raw)?;

        let filters = context.filters();
        let local = filters
            .apply_filters_async(
                &HookName::LocalData,
                raw,
                json!({ "path": path.display().to_string() }),
            )
            .await;
        let local: LocalData = serde_json::from_value(local)?;

        let store = filters
            .apply_filters_async(&HookName::StoreData, local.store, Value::Null)
            .await;
        let store: StoreData = if store.is_null() {
            StoreData::default()
        } else {
            serde_json::from_value(store)?
        };
        context
            .actions()
            .do_actions_async(&HookName::StoreData, serde_json::to_value(&store)?)
            .await?;

        let items: Vec<RenderItem> = local.content.values().flatten().cloned().collect();
        let store = MemoryStore::from_data(store).with_parents_from(&items);
        tracing::info!(
            path = %path.display(),
            items = items.len(),
            "Loaded local data"
        );

        let site = Site::from_config(Arc::clone(&context), Arc::new(store), &config);
        let data = AllData {
            content: local.content,
            redirects: local.redirects,
        };
        Ok(Self { config, site, data })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use frond_hooks::{Action, Filter, HookError};
    use tempfile::TempDir;

    use super::*;

    const DATA: &str = r#"{
        "content": {
            "page": [{ "id": "1", "contentType": "page", "slug": "about" }],
            "post": [
                { "id": "2", "contentType": "post", "slug": "hello" },
                { "id": "3", "contentType": "post", "slug": "part-2", "parent": "2" }
            ]
        },
        "redirects": [{ "from": "/old", "to": "/about/" }],
        "store": {
            "archiveMeta": { "post": { "id": "9", "slug": "blog", "title": "Blog" } }
        }
    }"#;

    fn write_project(data: &str) -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("frond.toml"), "[source]\ndata = \"site.json\"\n").unwrap();
        std::fs::write(dir.path().join("site.json"), data).unwrap();
        let config = Config::load(Some(&dir.path().join("frond.toml")), None).unwrap();
        (dir, config)
    }

    fn context() -> Arc<RenderContext> {
        let context = Arc::new(RenderContext::new());
        context.set_render_functions(builtin::render_functions());
        context
    }

    #[tokio::test]
    async fn test_load_project() {
        let (_dir, config) = write_project(DATA);
        let project = Project::load_with(config, context()).await.unwrap();

        assert_eq!(project.data.items().count(), 3);
        assert_eq!(project.data.redirects.len(), 1);

        let links = project.site.links();
        let part = project.data.find("3", "post").unwrap();
        assert_eq!(links.item_slug(part), "blog/hello/part-2");
    }

    #[tokio::test]
    async fn test_data_hooks_run() {
        let (_dir, config) = write_project(DATA);
        let context = context();
        context.filters().add_filter(
            HookName::LocalData,
            Filter::new(|mut data: Value, _: &Value| {
                data["content"]["post"] = json!([]);
                data
            }),
        );
        context.filters().add_filter(
            HookName::StoreData,
            Filter::new(|mut store: Value, _: &Value| {
                store["archiveMeta"]["page"] = json!({ "slug": "pages" });
                store
            }),
        );
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        context.actions().add_action(
            HookName::StoreData,
            Action::new(move |store: &Value| {
                assert_eq!(store["archiveMeta"]["page"]["slug"], json!("pages"));
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let project = Project::load_with(config, context).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(project.data.items().count(), 1);
        let about = project.data.find("1", "page").unwrap();
        assert_eq!(project.site.links().item_slug(about), "pages/about");
    }

    #[tokio::test]
    async fn test_store_action_failure_propagates() {
        let (_dir, config) = write_project(DATA);
        let context = context();
        context.actions().add_action(
            HookName::StoreData,
            Action::future(|_: Value| async { Err(HookError::failed("store rejected")) }),
        );

        let err = Project::load_with(config, context).await.err().unwrap();
        assert!(matches!(err, CliError::Hook(_)));
    }

    #[tokio::test]
    async fn test_missing_data_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("frond.toml"), "").unwrap();
        let config = Config::load(Some(&dir.path().join("frond.toml")), None).unwrap();

        let err = Project::load_with(config, context()).await.err().unwrap();
        assert!(err.to_string().contains("data.json"));
    }
}
