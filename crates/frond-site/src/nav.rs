//! Navigation menu resolution.
//!
//! Store menus reference items; layouts need links. [`resolve_menus`] turns
//! each [`Navigation`] into a [`NavMenu`] whose entries carry permalinks and
//! a `current` flag for the page being rendered.

use frond_renderer::{NavLink, NavMenu};
use frond_store::{Navigation, NavigationItem};

use crate::link::Links;

/// Resolve every menu against `current_link`, the permalink of the page.
#[must_use]
pub fn resolve_menus(links: &Links, navigations: &[Navigation], current_link: &str) -> Vec<NavMenu> {
    navigations
        .iter()
        .map(|nav| NavMenu {
            id: nav.id.clone(),
            title: nav.title.clone(),
            location: nav.location.clone(),
            items: resolve_items(links, &nav.items, current_link),
        })
        .collect()
}

fn resolve_items(links: &Links, items: &[NavigationItem], current_link: &str) -> Vec<NavLink> {
    items
        .iter()
        .map(|item| {
            let internal = item.internal_link.as_deref();
            let link = links
                .get_link(internal, item.external_link.as_deref())
                .unwrap_or_default();
            let external = internal.is_none() && !link.is_empty();
            NavLink {
                id: item.id.clone(),
                title: item.title.clone(),
                current: !external && !link.is_empty() && link == current_link,
                external,
                link,
                children: resolve_items(links, &item.children, current_link),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use frond_config::SlugConfig;
    use frond_hooks::Hooks;
    use frond_store::{ArchiveMeta, MemoryStore, RenderItem};
    use pretty_assertions::assert_eq;

    use super::*;

    fn links() -> Links {
        let store = MemoryStore::new().with_archive_meta(
            "post",
            ArchiveMeta {
                id: "10".to_owned(),
                slug: "blog".to_owned(),
                ..ArchiveMeta::default()
            },
        );
        Links::new(Arc::new(store), SlugConfig::default(), Arc::new(Hooks::new()))
    }

    fn entry(id: &str, title: &str) -> NavigationItem {
        NavigationItem {
            id: id.to_owned(),
            title: title.to_owned(),
            ..NavigationItem::default()
        }
    }

    #[test]
    fn test_resolve_menus() {
        let blog = RenderItem::new("10", "page").with_field("slug", "blog");
        let hello = RenderItem::new("1", "post").with_field("slug", "hello");
        let navigation = Navigation {
            id: "n1".to_owned(),
            title: "Main".to_owned(),
            location: "main".to_owned(),
            items: vec![
                NavigationItem {
                    internal_link: Some(Box::new(blog)),
                    children: vec![NavigationItem {
                        internal_link: Some(Box::new(hello)),
                        ..entry("c1", "Hello")
                    }],
                    ..entry("i1", "Blog")
                },
                NavigationItem {
                    external_link: Some("https://github.com".to_owned()),
                    ..entry("i2", "GitHub")
                },
                entry("i3", "Label"),
            ],
        };

        let menus = resolve_menus(&links(), &[navigation], "/blog/hello/");
        assert_eq!(menus.len(), 1);
        let menu = &menus[0];
        assert_eq!(menu.location, "main");

        let blog = &menu.items[0];
        assert_eq!((blog.link.as_str(), blog.current, blog.external), ("/blog/", false, false));
        let hello = &blog.children[0];
        assert_eq!((hello.link.as_str(), hello.current), ("/blog/hello/", true));

        let github = &menu.items[1];
        assert_eq!((github.link.as_str(), github.external), ("https://github.com", true));

        let label = &menu.items[2];
        assert_eq!((label.link.as_str(), label.external, label.current), ("", false, false));
    }
}
