//! Slug resolution and page rendering for frond.
//!
//! This crate provides:
//! - [`Links`]: slugs, permalinks and links composed from locale, archive,
//!   taxonomy and parent segments
//! - [`Site`]: top-level rendering of static, serverless and preview pages
//! - Archive and navigation helpers used by both
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use frond_config::SlugConfig;
//! use frond_hooks::Hooks;
//! use frond_site::Links;
//! use frond_store::{ArchiveMeta, MemoryStore, RenderItem};
//!
//! let store = MemoryStore::new().with_archive_meta(
//!     "post",
//!     ArchiveMeta { slug: "blog".to_owned(), ..ArchiveMeta::default() },
//! );
//! let links = Links::new(Arc::new(store), SlugConfig::default(), Arc::new(Hooks::new()));
//!
//! let post = RenderItem::new("1", "post").with_field("slug", "hello");
//! assert_eq!(links.item_slug(&post), "blog/hello");
//! assert_eq!(links.item_permalink(&post), "/blog/hello/");
//! ```

mod archive;
mod data;
mod link;
mod nav;
mod site;

pub use archive::{ArchiveLabels, TaxonomyInfo, archive_labels, archive_meta};
pub use data::{AllData, Redirect, page_count};
pub use link::{Links, SlugArgs, SlugResult};
pub use nav::resolve_menus;
pub use site::{PreviewData, RenderTarget, RenderedPage, ServerlessData, Site};
