//! `frond links` command implementation.

use std::path::PathBuf;

use clap::Args;
use frond_config::CliSettings;
use frond_site::SlugArgs;

use crate::error::CliError;
use crate::output::Output;
use crate::project::Project;

/// Arguments for the links command.
#[derive(Args)]
pub(crate) struct LinksArgs {
    /// Path to configuration file (default: auto-discover frond.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Local JSON data file (overrides config).
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Only list items of this content type.
    #[arg(short = 't', long)]
    content_type: Option<String>,

    /// Print permalinks with the production URL.
    #[arg(long)]
    prod: bool,
}

impl LinksArgs {
    /// Execute the links command.
    ///
    /// Prints one row per item: content type, id, slug and permalink, plus
    /// the breadcrumb trail when the item has parents.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let settings = CliSettings {
            prod: self.prod.then_some(true),
            data: self.data,
            ..CliSettings::default()
        };
        let project = Project::load(self.config.as_deref(), &settings).await?;
        let links = project.site.links();

        for item in project.data.items().filter(|item| {
            self.content_type
                .as_deref()
                .is_none_or(|content_type| item.content_type == content_type)
        }) {
            let slug = links.item_slug(item);
            let permalink = links.get_permalink(&slug, true);
            let crumbs = links
                .get_slug_with_parents(&SlugArgs::from_item(item))
                .parents
                .iter()
                .map(|parent| parent.title.as_str())
                .filter(|title| !title.is_empty())
                .collect::<Vec<_>>()
                .join(" > ");
            output.row(
                &[item.content_type.as_str(), item.id.as_str(), slug.as_str(), permalink.as_str()],
                &crumbs,
            );
        }
        Ok(())
    }
}
