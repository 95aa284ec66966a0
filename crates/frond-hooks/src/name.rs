//! Extension point names.

use std::fmt;

/// Name of an extension point.
///
/// The unit variants form the fixed set every registry is initialized with.
/// [`HookName::Custom`] carries any other name: callbacks may be registered
/// under it, but the pipeline never dispatches to it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookName {
    ColumnProps,
    ContainerProps,
    FormOptionProps,
    FormFieldProps,
    FormProps,
    RichTextProps,
    RichTextOutput,
    RichTextContentItem,
    RichTextContent,
    RichTextContentOutput,
    RenderItem,
    RenderItemData,
    RenderContent,
    ServerlessResult,
    ContactResult,
    CacheData,
    StoreData,
    ContentfulData,
    WordpressData,
    LocalData,
    AllData,
    SlugParts,
    Slug,
    /// Name outside the built-in set.
    Custom(String),
}

impl HookName {
    /// Extension points present in a freshly reset registry.
    pub const BUILT_IN: [Self; 23] = [
        Self::ColumnProps,
        Self::ContainerProps,
        Self::FormOptionProps,
        Self::FormFieldProps,
        Self::FormProps,
        Self::RichTextProps,
        Self::RichTextOutput,
        Self::RichTextContentItem,
        Self::RichTextContent,
        Self::RichTextContentOutput,
        Self::RenderItem,
        Self::RenderItemData,
        Self::RenderContent,
        Self::ServerlessResult,
        Self::ContactResult,
        Self::CacheData,
        Self::StoreData,
        Self::ContentfulData,
        Self::WordpressData,
        Self::LocalData,
        Self::AllData,
        Self::SlugParts,
        Self::Slug,
    ];

    /// Wire name of the extension point (camelCase).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ColumnProps => "columnProps",
            Self::ContainerProps => "containerProps",
            Self::FormOptionProps => "formOptionProps",
            Self::FormFieldProps => "formFieldProps",
            Self::FormProps => "formProps",
            Self::RichTextProps => "richTextProps",
            Self::RichTextOutput => "richTextOutput",
            Self::RichTextContentItem => "richTextContentItem",
            Self::RichTextContent => "richTextContent",
            Self::RichTextContentOutput => "richTextContentOutput",
            Self::RenderItem => "renderItem",
            Self::RenderItemData => "renderItemData",
            Self::RenderContent => "renderContent",
            Self::ServerlessResult => "serverlessResult",
            Self::ContactResult => "contactResult",
            Self::CacheData => "cacheData",
            Self::StoreData => "storeData",
            Self::ContentfulData => "contentfulData",
            Self::WordpressData => "wordpressData",
            Self::LocalData => "localData",
            Self::AllData => "allData",
            Self::SlugParts => "slugParts",
            Self::Slug => "slug",
            Self::Custom(name) => name.as_str(),
        }
    }

    /// Whether this is one of the built-in extension points.
    #[must_use]
    pub fn is_built_in(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    /// Whether callbacks may be registered under this name.
    ///
    /// Only an empty custom name is rejected.
    #[must_use]
    pub(crate) fn is_valid(&self) -> bool {
        !self.as_str().is_empty()
    }
}

impl From<&str> for HookName {
    fn from(name: &str) -> Self {
        Self::BUILT_IN
            .into_iter()
            .find(|hook| hook.as_str() == name)
            .unwrap_or_else(|| Self::Custom(name.to_owned()))
    }
}

impl From<String> for HookName {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
