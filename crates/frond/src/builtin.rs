//! Built-in render functions.
//!
//! A small table covering plain content: `container`, `richText`, `text` and
//! `heading`, plus an HTML layout, navigation menus and error pages.

use frond_hooks::HookName;
use frond_renderer::{
    HttpErrorArgs, LayoutArgs, LayoutFunction, NavLink, NavigationArgs, RenderArgs,
    RenderFunctions, RenderedNavigations, escape_html, http_error_fn, navigation_fn, render_fn,
    render_sync,
};
use futures::FutureExt;
use serde_json::{Value, json};

/// Render-function table used by the CLI.
pub(crate) fn render_functions() -> RenderFunctions {
    RenderFunctions::new()
        .with_function("container", render_fn(|args| container(args).boxed()))
        .with_function("richText", render_fn(|args| rich_text(args).boxed()))
        .with_function("text", render_sync(text))
        .with_function("heading", render_sync(heading))
        .with_layout(HtmlLayout)
        .with_navigation(navigation_fn(menus))
        .with_http_error(http_error_fn(error_page))
}

async fn container(args: RenderArgs<'_>) -> String {
    let props = args.context.filters().apply_filters(
        &HookName::ContainerProps,
        json!({ "tag": "div", "class": "container" }),
        &json!({ "id": args.item.id, "depth": args.parents.len() }),
    );
    let tag = props["tag"]
        .as_str()
        .filter(|tag| !tag.is_empty() && tag.bytes().all(|b| b.is_ascii_alphanumeric()))
        .unwrap_or("div")
        .to_owned();
    let class = props["class"].as_str().unwrap_or_default().to_owned();

    let children = args.render_children().await;
    if class.is_empty() {
        format!("<{tag}>{children}</{tag}>")
    } else {
        format!("<{tag} class=\"{}\">{children}</{tag}>", escape_html(&class))
    }
}

/// Rich text content is trusted HTML.
async fn rich_text(args: RenderArgs<'_>) -> String {
    let html = args.render_children().await;
    if html.is_empty() {
        return html;
    }
    let filtered = args.context.filters().apply_filters(
        &HookName::RichTextOutput,
        Value::String(html.clone()),
        &json!({ "id": args.item.id }),
    );
    let html = match filtered {
        Value::String(s) => s,
        _ => html,
    };
    format!("<div class=\"rich-text\">{html}</div>")
}

fn text(args: &RenderArgs<'_>) -> String {
    match args.item.text() {
        Some(text) if !text.is_empty() => format!("<p>{}</p>", escape_html(text)),
        _ => String::new(),
    }
}

fn heading(args: &RenderArgs<'_>) -> String {
    let Some(title) = args.item.text().or_else(|| args.item.title()) else {
        return String::new();
    };
    let level = args
        .item
        .field("level")
        .and_then(Value::as_u64)
        .and_then(|l| u8::try_from(l).ok())
        .unwrap_or(2)
        .clamp(1, 6);
    let id = args.page.add_heading(level, title);
    format!("<h{level} id=\"{id}\">{}</h{level}>", escape_html(title))
}

/// Full HTML document around the page body.
struct HtmlLayout;

impl LayoutFunction for HtmlLayout {
    fn layout(&self, args: &LayoutArgs<'_>) -> String {
        let lang = escape_html(args.meta.locale.as_deref().unwrap_or("en"));
        let nav = args.page.navigations.get("main").map_or("", String::as_str);
        format!(
            "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n<link rel=\"canonical\" href=\"{permalink}\">\n{styles}\
             </head>\n<body>\n{nav}<main>\n{content}\n</main>\n{scripts}</body>\n</html>\n",
            title = escape_html(&args.meta.title),
            permalink = escape_html(&args.meta.permalink),
            styles = args.assets.style_tags(),
            content = args.content,
            scripts = args.assets.script_tags(),
        )
    }
}

fn menus(args: &NavigationArgs<'_>) -> RenderedNavigations {
    let mut rendered = RenderedNavigations::new();
    for menu in args.menus {
        rendered.entry(menu.location.clone()).or_default().push_str(&format!(
            "<nav aria-label=\"{}\">{}</nav>",
            escape_html(&menu.title),
            links(&menu.items)
        ));
    }
    rendered
}

fn links(items: &[NavLink]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut html = String::from("<ul>");
    for item in items {
        let title = escape_html(&item.title);
        html.push_str("<li>");
        if item.link.is_empty() {
            html.push_str(&format!("<span>{title}</span>"));
        } else {
            let current = if item.current { " aria-current=\"page\"" } else { "" };
            let rel = if item.external { " rel=\"noopener\"" } else { "" };
            html.push_str(&format!(
                "<a href=\"{}\"{current}{rel}>{title}</a>",
                escape_html(&item.link)
            ));
        }
        html.push_str(&links(&item.children));
        html.push_str("</li>");
    }
    html.push_str("</ul>");
    html
}

fn error_page(args: &HttpErrorArgs<'_>) -> String {
    let message = if args.status == 404 {
        "Page not found"
    } else {
        "Something went wrong"
    };
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{message}</title>\n\
         </head>\n<body>\n<h1>{status}</h1>\n<p>{message}</p>\n</body>\n</html>\n",
        status = args.status,
    )
}
