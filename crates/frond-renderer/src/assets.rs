//! Script and style dependencies collected while rendering a page.

use crate::util::escape_html;

/// Registered asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    /// Unique handle; the first registration of a handle wins.
    pub handle: String,
    /// URL of the script or stylesheet.
    pub src: String,
}

/// Script and style dependency maps.
///
/// Render functions register what their output needs while the tree is
/// walked. Entries keep first-registration order, which is deterministic
/// because items render sequentially.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assets {
    scripts: Vec<Asset>,
    styles: Vec<Asset>,
}

impl Assets {
    /// Register a script. Returns `false` if the handle is already taken.
    pub fn add_script(&mut self, handle: impl Into<String>, src: impl Into<String>) -> bool {
        insert(&mut self.scripts, handle.into(), src.into())
    }

    /// Register a stylesheet. Returns `false` if the handle is already taken.
    pub fn add_style(&mut self, handle: impl Into<String>, src: impl Into<String>) -> bool {
        insert(&mut self.styles, handle.into(), src.into())
    }

    #[must_use]
    pub fn scripts(&self) -> &[Asset] {
        &self.scripts
    }

    #[must_use]
    pub fn styles(&self) -> &[Asset] {
        &self.styles
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty() && self.styles.is_empty()
    }

    /// `<script>` tags in registration order.
    #[must_use]
    pub fn script_tags(&self) -> String {
        self.scripts
            .iter()
            .map(|a| format!(r#"<script src="{}" defer></script>"#, escape_html(&a.src)))
            .collect()
    }

    /// Stylesheet `<link>` tags in registration order.
    #[must_use]
    pub fn style_tags(&self) -> String {
        self.styles
            .iter()
            .map(|a| format!(r#"<link rel="stylesheet" href="{}">"#, escape_html(&a.src)))
            .collect()
    }
}

fn insert(assets: &mut Vec<Asset>, handle: String, src: String) -> bool {
    if assets.iter().any(|a| a.handle == handle) {
        return false;
    }
    assets.push(Asset { handle, src });
    true
}
