//! Slug and permalink resolution.
//!
//! A slug is composed from up to six kinds of segments, in this order:
//!
//! 1. locale prefix (`slugs.locales`)
//! 2. type segment: the archive slug of the content type, or the
//!    `slugs.types` override when one is configured
//! 3. taxonomy segment, for terms (`slugs.taxonomies` or the taxonomy slug)
//! 4. ancestor slugs from the store's parents map
//! 5. the item slug (`index` collapses to nothing)
//! 6. the page number of a paginated listing
//!
//! For hierarchical content types the ancestors sit right before the item
//! slug; for the rest they follow the type segment, ahead of the taxonomy
//! segment. The parts pass through the `slugParts` filter, the joined slug
//! through the `slug` filter, and query parameters are appended last.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use frond_config::SlugConfig;
use frond_hooks::{HookName, Hooks};
use frond_store::{ParentEntry, RenderItem, Store};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Value, json};

use crate::archive::{self, TaxonomyInfo};

/// Characters left unescaped in query parameters.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Input of a slug lookup.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlugArgs<'a> {
    pub id: &'a str,
    /// The item's own slug.
    pub slug: &'a str,
    pub content_type: &'a str,
    /// Full item, for locale and taxonomy data.
    pub item: Option<&'a RenderItem>,
    /// Query parameters appended to the slug.
    pub params: Option<&'a BTreeMap<String, String>>,
    /// Page of a paginated listing; pages above 1 append their number.
    pub page: u32,
}

impl<'a> SlugArgs<'a> {
    /// Arguments describing `item`.
    #[must_use]
    pub fn from_item(item: &'a RenderItem) -> Self {
        Self {
            id: &item.id,
            slug: item.slug().unwrap_or_default(),
            content_type: &item.content_type,
            item: Some(item),
            params: None,
            page: 0,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: &'a BTreeMap<String, String>) -> Self {
        self.params = Some(params);
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

/// Slug plus the chain of parents it was built from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlugResult {
    pub slug: String,
    /// Archive, taxonomy and ancestor entries, outermost first.
    pub parents: Vec<ParentEntry>,
}

/// Resolves slugs, permalinks and links against a store.
pub struct Links {
    store: Arc<dyn Store>,
    slugs: SlugConfig,
    permalink_base: Option<String>,
    hooks: Arc<Hooks>,
}

impl Links {
    /// Create a resolver with relative permalinks.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, slugs: SlugConfig, hooks: Arc<Hooks>) -> Self {
        Self {
            store,
            slugs,
            permalink_base: None,
            hooks,
        }
    }

    /// Prefix permalinks with a production URL.
    #[must_use]
    pub fn with_permalink_base(mut self, base: Option<&str>) -> Self {
        self.permalink_base = base
            .map(|b| b.trim_end_matches('/').to_owned())
            .filter(|b| !b.is_empty());
        self
    }

    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    #[must_use]
    pub fn slug_config(&self) -> &SlugConfig {
        &self.slugs
    }

    /// Slug of an item, without leading or trailing slash.
    #[must_use]
    pub fn get_slug(&self, args: &SlugArgs<'_>) -> String {
        self.resolve(args, false).slug
    }

    /// Slug plus its parents, for breadcrumbs.
    ///
    /// An `index` slug is kept as is in this mode.
    #[must_use]
    pub fn get_slug_with_parents(&self, args: &SlugArgs<'_>) -> SlugResult {
        self.resolve(args, true)
    }

    /// Slug of `item`.
    #[must_use]
    pub fn item_slug(&self, item: &RenderItem) -> String {
        self.get_slug(&SlugArgs::from_item(item))
    }

    /// Permalink of `item`.
    #[must_use]
    pub fn item_permalink(&self, item: &RenderItem) -> String {
        self.get_permalink(&self.item_slug(item), true)
    }

    /// Absolute path (or URL in production) for `slug`.
    ///
    /// The root slug (`""` or `"/"`) always yields `/`. A trailing slash is
    /// added to other paths when `trailing_slash` is set, ahead of any query.
    #[must_use]
    pub fn get_permalink(&self, slug: &str, trailing_slash: bool) -> String {
        let (path, query) = match slug.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (slug, None),
        };
        let path = path.trim_matches('/');

        let mut link = self.permalink_base.clone().unwrap_or_default();
        link.push('/');
        if !path.is_empty() {
            link.push_str(path);
            if trailing_slash {
                link.push('/');
            }
        }
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            link.push('?');
            link.push_str(query);
        }
        link
    }

    /// Link target: the permalink of an internal item, else the external URL.
    #[must_use]
    pub fn get_link(&self, internal: Option<&RenderItem>, external: Option<&str>) -> Option<String> {
        if let Some(item) = internal {
            return Some(self.item_permalink(item));
        }
        external.filter(|url| !url.is_empty()).map(str::to_owned)
    }

    /// Slug of the archive page of `content_type`, if it has one.
    #[must_use]
    pub fn archive_slug(&self, content_type: &str, locale: Option<&str>) -> Option<String> {
        let segment = match self.slugs.type_in_slug(content_type, locale) {
            Some(segment) => segment.to_owned(),
            None => archive::archive_meta(self.store(), content_type, locale)
                .map(|meta| meta.slug)
                .filter(|slug| !slug.is_empty())?,
        };
        Some(join(
            self.slugs.locale_prefix(locale).into_iter().chain([segment.as_str()]),
        ))
    }

    /// Permalink of the archive page of `content_type`.
    #[must_use]
    pub fn archive_link(&self, content_type: &str, locale: Option<&str>) -> Option<String> {
        self.archive_slug(content_type, locale)
            .map(|slug| self.get_permalink(&slug, true))
    }

    fn resolve(&self, args: &SlugArgs<'_>, with_parents: bool) -> SlugResult {
        let locale = args.item.and_then(RenderItem::locale);
        let is_taxonomy = args.content_type == "taxonomy";
        let is_term = args.content_type == "term";

        let taxonomy = if is_taxonomy || is_term {
            args.item.and_then(TaxonomyInfo::from_item)
        } else {
            None
        };

        // Content type whose archive provides the type segment.
        let archive_type = match &taxonomy {
            Some(tax) if tax.use_content_type_slug => tax.primary_content_type(),
            _ if is_taxonomy || is_term => None,
            _ => Some(args.content_type),
        };

        // The `slugs.types` override wins over the archive slug.
        let archive = archive_type.and_then(|t| archive::archive_meta(self.store(), t, locale));
        let type_segment = archive_type
            .and_then(|t| self.slugs.type_in_slug(t, locale))
            .map(str::to_owned)
            .or_else(|| archive.as_ref().map(|meta| meta.slug.clone()))
            .filter(|segment| !segment.is_empty());

        let mut parents = Vec::new();
        if let (Some(archive_type), Some(meta), Some(segment)) = (archive_type, archive, &type_segment) {
            let title = if meta.title.is_empty() {
                archive::archive_labels(self.store(), archive_type, locale).plural
            } else {
                meta.title
            };
            parents.push(ParentEntry::new(meta.id, segment, title));
        }

        let mut tax_segment = None;
        if is_term && let Some(tax) = &taxonomy {
            let segment = self
                .slugs
                .taxonomy_slug(&tax.id, locale)
                .unwrap_or(&tax.slug);
            if !segment.is_empty() {
                tax_segment = Some(segment.to_owned());
                parents.push(ParentEntry::new(&tax.id, segment, &tax.title));
            }
        }

        let mut ancestors = self.store.ancestors(args.content_type, args.id);
        ancestors.reverse();

        let own = match &taxonomy {
            Some(tax) if is_taxonomy => self
                .slugs
                .taxonomy_slug(&tax.id, locale)
                .unwrap_or(args.slug),
            _ => args.slug,
        };
        let own = if own == "index" && !with_parents { "" } else { own };

        let mut parts: Vec<String> = Vec::new();
        parts.extend(self.slugs.locale_prefix(locale).map(str::to_owned));
        parts.extend(type_segment);
        let ancestor_slugs = ancestors.iter().map(|p| p.slug.clone());
        if self.slugs.is_hierarchical(args.content_type) {
            parts.extend(tax_segment);
            parts.extend(ancestor_slugs);
        } else {
            parts.extend(ancestor_slugs);
            parts.extend(tax_segment);
        }
        parts.push(own.to_owned());
        if args.page > 1 {
            parts.push(args.page.to_string());
        }

        let filter_args = json!({
            "id": args.id,
            "slug": args.slug,
            "contentType": args.content_type,
            "locale": locale,
            "page": args.page,
        });
        let parts = self.filter_parts(parts, &filter_args);
        let slug = self.filter_slug(join(parts.iter().map(String::as_str)), &filter_args);
        let slug = append_params(slug, args.params);

        if with_parents {
            parents.extend(ancestors);
        } else {
            parents.clear();
        }
        SlugResult { slug, parents }
    }

    fn filter_parts(&self, parts: Vec<String>, args: &Value) -> Vec<String> {
        let filters = &self.hooks.filters;
        if !filters.has_filters(&HookName::SlugParts) {
            return parts;
        }
        let value = Value::Array(parts.iter().cloned().map(Value::String).collect());
        match filters.apply_filters(&HookName::SlugParts, value, args) {
            Value::Array(values) => values
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            other => {
                tracing::warn!(result = %other, "slugParts filter returned a non-array, ignoring");
                parts
            }
        }
    }

    fn filter_slug(&self, slug: String, args: &Value) -> String {
        let filters = &self.hooks.filters;
        if !filters.has_filters(&HookName::Slug) {
            return slug;
        }
        match filters.apply_filters(&HookName::Slug, Value::String(slug.clone()), args) {
            Value::String(filtered) => filtered,
            other => {
                tracing::warn!(result = %other, "slug filter returned a non-string, ignoring");
                slug
            }
        }
    }
}

impl fmt::Debug for Links {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("slugs", &self.slugs)
            .field("permalink_base", &self.permalink_base)
            .finish_non_exhaustive()
    }
}

/// Join non-empty segments with `/`, trimming stray slashes.
fn join<'s>(parts: impl IntoIterator<Item = &'s str>) -> String {
    parts
        .into_iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn append_params(mut slug: String, params: Option<&BTreeMap<String, String>>) -> String {
    let Some(params) = params.filter(|p| !p.is_empty()) else {
        return slug;
    };
    let query = params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_ENCODE_SET),
                utf8_percent_encode(value, QUERY_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&");
    slug.push('?');
    slug.push_str(&query);
    slug
}
