//! Top-level page rendering.
//!
//! [`Site::render`] selects what to render from [`AllData`]:
//!
//! - [`RenderTarget::All`]: every page-bearing item, one page per pagination
//!   step (static builds)
//! - [`RenderTarget::Serverless`]: the single page matching a request path,
//!   after redirects
//! - [`RenderTarget::Preview`]: one item by id and content type
//!
//! Each page body comes from the render engine and is wrapped by the layout
//! function. A body that renders to nothing becomes a 404 page produced by the
//! HTTP-error function.

use std::collections::BTreeMap;
use std::sync::Arc;

use frond_config::Config;
use frond_hooks::HookName;
use frond_renderer::{
    HttpErrorArgs, LayoutArgs, NavigationArgs, PageContext, PageMeta, Pagination, RenderContext,
    RenderFunctions, RenderedNavigations,
};
use frond_store::{RenderItem, Store};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::archive::TaxonomyInfo;
use crate::data::{AllData, page_count};
use crate::link::{Links, SlugArgs};
use crate::nav::resolve_menus;

/// Status of a page that rendered.
const STATUS_OK: u16 = 200;
/// Status of a page that resolved no content.
const STATUS_NOT_FOUND: u16 = 404;

/// What a render pass produces.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RenderTarget {
    /// Every page of the site.
    #[default]
    All,
    /// The page answering one request.
    Serverless(ServerlessData),
    /// One item, usually a CMS draft.
    Preview(PreviewData),
}

/// Request a serverless render answers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ServerlessData {
    /// Request path, with or without surrounding slashes.
    pub path: String,
    pub query: BTreeMap<String, String>,
}

/// Item a preview render shows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewData {
    pub id: String,
    pub content_type: String,
}

/// One rendered page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPage {
    /// Slug the page is served at.
    pub slug: String,
    /// Full document, or an empty string for redirects.
    pub output: String,
    pub status: u16,
    /// Redirect target, when the request matched a redirect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl RenderedPage {
    /// Whether the page rendered normally.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Render context plus link resolver: everything needed to render pages.
#[derive(Debug)]
pub struct Site {
    context: Arc<RenderContext>,
    links: Links,
}

impl Site {
    #[must_use]
    pub fn new(context: Arc<RenderContext>, links: Links) -> Self {
        Self { context, links }
    }

    /// Build a site whose link resolver follows `config` and shares the
    /// context's hook registries.
    #[must_use]
    pub fn from_config(context: Arc<RenderContext>, store: Arc<dyn Store>, config: &Config) -> Self {
        let links = Links::new(store, config.slugs.clone(), Arc::clone(context.hooks()))
            .with_permalink_base(config.env.permalink_base());
        Self::new(context, links)
    }

    #[must_use]
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    #[must_use]
    pub fn links(&self) -> &Links {
        &self.links
    }

    /// Render the pages `target` selects.
    ///
    /// The data first passes through the `allData` filter. Serverless and
    /// preview renders always yield exactly one page.
    pub async fn render(&self, data: AllData, target: &RenderTarget) -> Vec<RenderedPage> {
        let data = self.filter_all_data(data, target).await;

        match target {
            RenderTarget::All => self.render_all(&data).await,
            RenderTarget::Serverless(request) => vec![self.render_serverless(&data, request).await],
            RenderTarget::Preview(preview) => {
                let page = match data.find(&preview.id, &preview.content_type) {
                    Some(item) => self.render_page(item, 1, BTreeMap::new()).await,
                    None => {
                        tracing::debug!(id = %preview.id, content_type = %preview.content_type, "Preview item not found");
                        self.not_found(String::new(), PageMeta::default())
                    }
                };
                vec![page]
            }
        }
    }

    async fn render_all(&self, data: &AllData) -> Vec<RenderedPage> {
        let mut pages = Vec::new();
        for item in data.items().filter(|item| is_page(item)) {
            for page in 1..=page_count(item) {
                pages.push(self.render_page(item, page, BTreeMap::new()).await);
            }
        }
        tracing::info!(pages = pages.len(), "Rendered site");
        pages
    }

    async fn render_serverless(&self, data: &AllData, request: &ServerlessData) -> RenderedPage {
        let path = normalize_path(&request.path);

        if let Some(redirect) = data
            .redirects
            .iter()
            .find(|r| normalize_path(&r.from) == path)
        {
            tracing::debug!(from = %redirect.from, to = %redirect.to, "Redirecting");
            return RenderedPage {
                slug: path.to_owned(),
                output: String::new(),
                status: redirect.status,
                redirect: Some(redirect.to.clone()),
            };
        }

        let page = match self.match_path(data, path, &request.query) {
            Some((item, number)) => self.render_page(item, number, request.query.clone()).await,
            None => {
                tracing::debug!(path, "No item matches request path");
                let meta = PageMeta {
                    slug: path.to_owned(),
                    permalink: self.links.get_permalink(path, true),
                    ..PageMeta::default()
                };
                self.not_found(path.to_owned(), meta)
            }
        };
        self.filter_serverless_result(page, request).await
    }

    /// Item and page number answering `path`.
    ///
    /// Page numbers come from a trailing `/N` segment or a `page` query
    /// parameter and must lie within the item's page count.
    fn match_path<'d>(
        &self,
        data: &'d AllData,
        path: &str,
        query: &BTreeMap<String, String>,
    ) -> Option<(&'d RenderItem, u32)> {
        let (base, suffix_page) = match path.rsplit_once('/') {
            Some((base, last)) => match last.parse::<u32>() {
                Ok(n) if n > 1 => (base, Some(n)),
                _ => (path, None),
            },
            None => match path.parse::<u32>() {
                Ok(n) if n > 1 => ("", Some(n)),
                _ => (path, None),
            },
        };
        let query_page = query.get("page").and_then(|p| p.parse::<u32>().ok());

        for item in data.items().filter(|item| is_page(item)) {
            let slug = self.links.item_slug(item);
            let total = page_count(item);
            if slug == path {
                let number = query_page.unwrap_or(1);
                if number <= total {
                    return Some((item, number.max(1)));
                }
            } else if let Some(number) = suffix_page
                && slug == base
                && number <= total
            {
                return Some((item, number));
            }
        }
        None
    }

    /// Render `item` as page `number` of its listing.
    async fn render_page(
        &self,
        item: &RenderItem,
        number: u32,
        query: BTreeMap<String, String>,
    ) -> RenderedPage {
        let functions = self.context.render_functions();
        let slug = self
            .links
            .get_slug(&SlugArgs::from_item(item).with_page(number));
        let permalink = self.links.get_permalink(&slug, true);

        let mut page = PageContext::for_page(item.clone())
            .with_navigations(self.render_navigations(functions.as_deref(), &permalink))
            .with_query(query);
        let total = page_count(item);
        if total > 1 {
            page = page.with_pagination(Pagination::new(number, total));
        }

        let body = self
            .context
            .render_content(item.content.as_ref(), &[], &page)
            .await;

        let meta = PageMeta {
            id: item.id.clone(),
            content_type: item.content_type.clone(),
            title: item.title().unwrap_or_default().to_owned(),
            slug: slug.clone(),
            permalink,
            locale: item.locale().map(str::to_owned),
            status: STATUS_OK,
        };

        if body.trim().is_empty() {
            tracing::debug!(id = %item.id, slug = %slug, "Page rendered no content");
            return self.not_found(slug, meta);
        }

        let assets = page.assets();
        let output = match functions.as_deref().and_then(RenderFunctions::layout) {
            Some(layout) => layout.layout(&LayoutArgs {
                content: &body,
                meta: &meta,
                page: &page,
                assets: &assets,
            }),
            None => body,
        };

        RenderedPage {
            slug,
            output,
            status: STATUS_OK,
            redirect: None,
        }
    }

    fn not_found(&self, slug: String, meta: PageMeta) -> RenderedPage {
        let meta = PageMeta {
            status: STATUS_NOT_FOUND,
            ..meta
        };
        let output = self
            .context
            .render_functions()
            .and_then(|functions| {
                functions.http_error().map(|http_error| {
                    http_error.http_error(&HttpErrorArgs {
                        status: STATUS_NOT_FOUND,
                        meta: &meta,
                    })
                })
            })
            .unwrap_or_default();

        RenderedPage {
            slug,
            output,
            status: STATUS_NOT_FOUND,
            redirect: None,
        }
    }

    fn render_navigations(
        &self,
        functions: Option<&RenderFunctions>,
        current_link: &str,
    ) -> RenderedNavigations {
        let Some(navigation) = functions.and_then(RenderFunctions::navigation) else {
            return RenderedNavigations::new();
        };
        let menus = resolve_menus(&self.links, &self.links.store().navigations(), current_link);
        navigation.navigation(&NavigationArgs {
            menus: &menus,
            current_link,
        })
    }

    async fn filter_all_data(&self, data: AllData, target: &RenderTarget) -> AllData {
        let filters = self.context.filters();
        if !filters.has_filters(&HookName::AllData) {
            return data;
        }
        let args = json!({ "target": target_kind(target) });
        let value = filters
            .apply_filters_async(&HookName::AllData, data.to_value(), args)
            .await;
        match serde_json::from_value(value) {
            Ok(filtered) => filtered,
            Err(e) => {
                tracing::warn!(error = %e, "allData filter returned invalid data, ignoring");
                data
            }
        }
    }

    async fn filter_serverless_result(
        &self,
        page: RenderedPage,
        request: &ServerlessData,
    ) -> RenderedPage {
        let filters = self.context.filters();
        if !filters.has_filters(&HookName::ServerlessResult) {
            return page;
        }
        let args = json!({ "path": request.path, "query": request.query });
        let value = filters
            .apply_filters_async(
                &HookName::ServerlessResult,
                serde_json::to_value(&page).unwrap_or(Value::Null),
                args,
            )
            .await;
        match serde_json::from_value(value) {
            Ok(filtered) => filtered,
            Err(e) => {
                tracing::warn!(error = %e, "serverlessResult filter returned an invalid page, ignoring");
                page
            }
        }
    }
}

/// Whether `item` renders as a standalone page.
///
/// Items need a slug; terms and taxonomies only render when their taxonomy
/// is flagged as a page.
fn is_page(item: &RenderItem) -> bool {
    if item.slug().is_none() {
        return false;
    }
    match item.content_type.as_str() {
        "term" | "taxonomy" => TaxonomyInfo::from_item(item).is_some_and(|tax| tax.is_page),
        _ => true,
    }
}

fn normalize_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.trim_matches('/')
}

fn target_kind(target: &RenderTarget) -> &'static str {
    match target {
        RenderTarget::All => "all",
        RenderTarget::Serverless(_) => "serverless",
        RenderTarget::Preview(_) => "preview",
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use frond_config::SlugConfig;
    use frond_hooks::{Filter, Hooks};
    use frond_renderer::{
        RenderFunctions, http_error_fn, layout_fn, navigation_fn, render_fn, render_sync,
    };
    use frond_store::{ArchiveMeta, MemoryStore, Navigation, NavigationItem};
    use futures::FutureExt;
    use pretty_assertions::assert_eq;

    use super::*;

    fn functions() -> RenderFunctions {
        RenderFunctions::new()
            .with_function(
                "container",
                render_fn(|args| {
                    async move { format!("<div>{}</div>", args.render_children().await) }.boxed()
                }),
            )
            .with_function(
                "heading",
                render_sync(|args| {
                    let title = args.item.text().unwrap_or_default();
                    let id = args.page.add_heading(2, title);
                    format!("<h2 id=\"{id}\">{title}</h2>")
                }),
            )
            .with_function(
                "text",
                render_sync(|args| {
                    args.page.add_script("app", "/app.js");
                    format!("<p>{}</p>", args.item.text().unwrap_or_default())
                }),
            )
            .with_function(
                "listing",
                render_sync(|args| match args.page.pagination {
                    Some(p) => format!("<ol data-page=\"{}/{}\"></ol>", p.current, p.total),
                    None => String::new(),
                }),
            )
            .with_layout(layout_fn(|args| {
                format!(
                    "<title>{}</title><nav>{}</nav><main>{}</main>{}|{}",
                    args.meta.title,
                    args.page.navigations.get("main").map_or("", String::as_str),
                    args.content,
                    args.assets.script_tags(),
                    args.page.headings().len(),
                )
            }))
            .with_http_error(http_error_fn(|args| format!("error {}", args.status)))
    }

    fn store() -> MemoryStore {
        MemoryStore::new().with_archive_meta(
            "post",
            ArchiveMeta {
                id: "blog".to_owned(),
                slug: "blog".to_owned(),
                title: "Blog".to_owned(),
                ..ArchiveMeta::default()
            },
        )
    }

    fn site_with(store: MemoryStore, functions: RenderFunctions) -> Site {
        let context = Arc::new(RenderContext::new());
        context.set_render_functions(functions);
        let links = Links::new(
            Arc::new(store),
            SlugConfig::default(),
            Arc::clone(context.hooks()),
        );
        Site::new(context, links)
    }

    fn site() -> Site {
        site_with(store(), functions())
    }

    fn text(id: &str, text: &str) -> RenderItem {
        RenderItem::new(id, "block")
            .with_render_type("text")
            .with_content(text)
    }

    fn data() -> AllData {
        AllData::default()
            .with_item(
                RenderItem::new("home", "page")
                    .with_field("slug", "index")
                    .with_field("title", "Home")
                    .with_content(vec![
                        RenderItem::new("h", "block")
                            .with_render_type("heading")
                            .with_content("Welcome"),
                        text("t", "Hi"),
                    ]),
            )
            .with_item(
                RenderItem::new("blog", "page")
                    .with_field("slug", "blog")
                    .with_field("title", "Blog")
                    .with_field("pagination", json!({ "total": 2 }))
                    .with_content(vec![
                        RenderItem::new("l", "block").with_render_type("listing"),
                    ]),
            )
            .with_item(
                RenderItem::new("empty", "page")
                    .with_field("slug", "empty")
                    .with_content(vec![RenderItem::new("x", "block").with_render_type("unknown")]),
            )
            .with_item(
                RenderItem::new("p1", "post")
                    .with_field("slug", "hello")
                    .with_field("title", "Hello")
                    .with_content(vec![
                        RenderItem::new("c", "block")
                            .with_render_type("container")
                            .with_content(vec![text("t2", "Post body")]),
                    ]),
            )
            .with_item(
                RenderItem::new("t1", "term")
                    .with_field("slug", "rust")
                    .with_field("taxonomy", json!({ "id": "tag", "slug": "tags" }))
                    .with_content(vec![text("t3", "Tagged")]),
            )
            .with_item(RenderItem::new("draft", "post").with_content(vec![text("t4", "Draft")]))
            .with_redirect("/old-blog/", "/blog/", 301)
    }

    fn serverless(path: &str) -> RenderTarget {
        RenderTarget::Serverless(ServerlessData {
            path: path.to_owned(),
            query: BTreeMap::new(),
        })
    }

    #[tokio::test]
    async fn test_render_all_pages() {
        let pages = site().render(data(), &RenderTarget::All).await;
        let summary: Vec<(&str, u16)> = pages.iter().map(|p| (p.slug.as_str(), p.status)).collect();

        assert_eq!(
            summary,
            vec![
                ("", 200),
                ("blog", 200),
                ("blog/2", 200),
                ("empty", 404),
                ("blog/hello", 200),
            ]
        );
    }

    #[tokio::test]
    async fn test_layout_receives_page_state() {
        let pages = site().render(data(), &RenderTarget::All).await;
        let home = &pages[0];

        assert_eq!(
            home.output,
            "<title>Home</title><nav></nav><main><h2 id=\"welcome\">Welcome</h2><p>Hi</p></main>\
             <script src=\"/app.js\" defer></script>|1"
        );
        assert!(pages[2].output.contains("<ol data-page=\"2/2\"></ol>"));
    }

    #[tokio::test]
    async fn test_empty_body_is_not_found() {
        let pages = site().render(data(), &RenderTarget::All).await;
        let empty = pages.iter().find(|p| p.slug == "empty").unwrap();
        assert_eq!(empty.output, "error 404");
        assert!(!empty.is_ok());
    }

    #[tokio::test]
    async fn test_not_found_without_http_error_is_empty() {
        let site = site_with(store(), RenderFunctions::new());
        let pages = site.render(data(), &serverless("/missing/")).await;
        assert_eq!(pages, vec![RenderedPage {
            slug: "missing".to_owned(),
            output: String::new(),
            status: 404,
            redirect: None,
        }]);
    }

    #[tokio::test]
    async fn test_serverless_matches_path() {
        let site = site();

        let pages = site.render(data(), &serverless("/blog/hello/")).await;
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].slug, "blog/hello");
        assert!(pages[0].output.contains("<div><p>Post body</p></div>"));

        let home = site.render(data(), &serverless("/")).await;
        assert_eq!(home[0].slug, "");
        assert!(home[0].is_ok());
    }

    #[tokio::test]
    async fn test_serverless_pagination() {
        let site = site();

        let suffix = site.render(data(), &serverless("/blog/2/")).await;
        assert_eq!(suffix[0].slug, "blog/2");
        assert!(suffix[0].output.contains("data-page=\"2/2\""));

        let query = RenderTarget::Serverless(ServerlessData {
            path: "/blog/".to_owned(),
            query: BTreeMap::from([("page".to_owned(), "2".to_owned())]),
        });
        let pages = site.render(data(), &query).await;
        assert!(pages[0].output.contains("data-page=\"2/2\""));

        let beyond = site.render(data(), &serverless("/blog/3/")).await;
        assert_eq!(beyond[0].status, 404);
    }

    #[tokio::test]
    async fn test_serverless_redirect() {
        let pages = site().render(data(), &serverless("old-blog")).await;
        assert_eq!(pages, vec![RenderedPage {
            slug: "old-blog".to_owned(),
            output: String::new(),
            status: 301,
            redirect: Some("/blog/".to_owned()),
        }]);
    }

    #[tokio::test]
    async fn test_terms_of_non_page_taxonomies_skipped() {
        let site = site();
        let pages = site.render(data(), &serverless("/tags/rust/")).await;
        assert_eq!(pages[0].status, 404);

        let data = data().with_item(
            RenderItem::new("t2", "term")
                .with_field("slug", "go")
                .with_field("taxonomy", json!({ "id": "tag", "slug": "tags", "isPage": true }))
                .with_content(vec![text("t5", "Go")]),
        );
        let pages = site.render(data, &serverless("/tags/go/")).await;
        assert!(pages[0].is_ok());
    }

    #[tokio::test]
    async fn test_preview_by_id() {
        let site = site();
        let target = RenderTarget::Preview(PreviewData {
            id: "draft".to_owned(),
            content_type: "post".to_owned(),
        });
        let pages = site.render(data(), &target).await;
        assert_eq!(pages[0].slug, "blog");
        assert!(pages[0].output.contains("<p>Draft</p>"));

        let missing = RenderTarget::Preview(PreviewData {
            id: "draft".to_owned(),
            content_type: "page".to_owned(),
        });
        assert_eq!(site.render(data(), &missing).await[0].status, 404);
    }

    #[tokio::test]
    async fn test_all_data_filter() {
        let site = site();
        site.context().filters().add_filter(
            HookName::AllData,
            Filter::new(|mut data: Value, args: &Value| {
                assert_eq!(args["target"], json!("all"));
                data["content"]["post"] = json!([]);
                data
            }),
        );

        let pages = site.render(data(), &RenderTarget::All).await;
        assert!(pages.iter().all(|p| p.slug != "blog/hello"));
    }

    #[tokio::test]
    async fn test_serverless_result_filter() {
        let site = site();
        site.context().filters().add_filter(
            HookName::ServerlessResult,
            Filter::future(|mut page: Value, _args: Value| async move {
                page["status"] = json!(410);
                page
            }),
        );

        let pages = site.render(data(), &serverless("/blog/hello/")).await;
        assert_eq!(pages[0].status, 410);
    }

    #[tokio::test]
    async fn test_navigation_rendered_per_page() {
        let home = RenderItem::new("home", "page").with_field("slug", "index");
        let store = store().with_navigation(Navigation {
            id: "nav".to_owned(),
            title: "Main".to_owned(),
            location: "main".to_owned(),
            items: vec![NavigationItem {
                id: "n1".to_owned(),
                title: "Home".to_owned(),
                internal_link: Some(Box::new(home)),
                ..NavigationItem::default()
            }],
        });
        let functions = functions().with_navigation(navigation_fn(|args| {
            let links: Vec<String> = args.menus[0]
                .items
                .iter()
                .map(|link| format!("{}{}", link.link, if link.current { "*" } else { "" }))
                .collect();
            RenderedNavigations::from([("main".to_owned(), links.join(","))])
        }));
        let site = site_with(store, functions);

        let pages = site.render(data(), &RenderTarget::All).await;
        assert!(pages[0].output.contains("<nav>/*</nav>"));
        assert!(pages[1].output.contains("<nav>/</nav>"));
    }

    #[test]
    fn test_shared_hooks() {
        let hooks = Arc::new(Hooks::new());
        let context = Arc::new(RenderContext::with_hooks(Arc::clone(&hooks)));
        let site = Site::from_config(context, Arc::new(MemoryStore::new()), &Config::default());
        assert!(Arc::ptr_eq(site.context().hooks(), &hooks));
    }

    static_assertions::assert_impl_all!(Site: Send, Sync);
}
