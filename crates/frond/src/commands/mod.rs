//! CLI command implementations.

pub(crate) mod links;
pub(crate) mod render;

pub(crate) use links::LinksArgs;
pub(crate) use render::RenderArgs;
