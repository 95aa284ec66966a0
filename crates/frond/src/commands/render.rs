//! `frond render` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use frond_config::CliSettings;
use frond_site::{RenderTarget, RenderedPage};

use crate::error::CliError;
use crate::output::Output;
use crate::project::Project;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to configuration file (default: auto-discover frond.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Local JSON data file (overrides config).
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Production build: prefix permalinks with the production URL.
    #[arg(long)]
    prod: bool,

    /// Production URL (overrides config).
    #[arg(long, env = "FROND_PROD_URL")]
    prod_url: Option<String>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or a page cannot be written.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let settings = CliSettings {
            prod: self.prod.then_some(true),
            prod_url: self.prod_url,
            data: self.data,
            output_dir: self.output_dir,
        };
        let project = Project::load(self.config.as_deref(), &settings).await?;
        let output_dir = &project.config.source_resolved.output_dir;

        output.info(&format!(
            "Rendering {} from {}",
            project.data.content.keys().cloned().collect::<Vec<_>>().join(", "),
            project.config.source_resolved.data.display()
        ));

        let pages = project.site.render(project.data, &RenderTarget::All).await;
        let mut written = 0;
        for page in &pages {
            if page.is_ok() {
                write_page(output_dir, page)?;
                written += 1;
            } else {
                output.warning(&format!("Skipped /{} (status {})", page.slug, page.status));
            }
        }

        output.success(&format!(
            "Wrote {written} pages to {}",
            output_dir.display()
        ));
        Ok(())
    }
}

/// Write `page` to `<output_dir>/<slug>/index.html`.
fn write_page(output_dir: &Path, page: &RenderedPage) -> Result<PathBuf, CliError> {
    let dir = page
        .slug
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .fold(output_dir.to_path_buf(), |dir, segment| dir.join(segment));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("index.html");
    std::fs::write(&path, &page.output)?;
    tracing::debug!(path = %path.display(), "Wrote page");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn page(slug: &str) -> RenderedPage {
        RenderedPage {
            slug: slug.to_owned(),
            output: "<p>hi</p>".to_owned(),
            status: 200,
            redirect: None,
        }
    }

    #[test]
    fn test_write_page_paths() {
        let dir = TempDir::new().unwrap();

        let root = write_page(dir.path(), &page("")).unwrap();
        assert_eq!(root, dir.path().join("index.html"));

        let nested = write_page(dir.path(), &page("blog/hello")).unwrap();
        assert_eq!(nested, dir.path().join("blog").join("hello").join("index.html"));
        assert_eq!(std::fs::read_to_string(nested).unwrap(), "<p>hi</p>");
    }

    #[test]
    fn test_write_page_stays_in_output_dir() {
        let dir = TempDir::new().unwrap();
        let path = write_page(dir.path(), &page("../escape")).unwrap();
        assert_eq!(path, dir.path().join("escape").join("index.html"));
    }

    #[tokio::test]
    async fn test_render_project() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("frond.toml"), "[source]\noutput_dir = \"out\"\n").unwrap();
        std::fs::write(
            dir.path().join("data.json"),
            r#"{
                "content": {
                    "page": [
                        {
                            "id": "1",
                            "contentType": "page",
                            "slug": "index",
                            "title": "Home",
                            "content": [{ "id": "t", "contentType": "block", "renderType": "text", "content": "Hello" }]
                        },
                        { "id": "2", "contentType": "page", "slug": "blank" }
                    ]
                }
            }"#,
        )
        .unwrap();

        let args = RenderArgs {
            config: Some(dir.path().join("frond.toml")),
            data: None,
            output_dir: None,
            prod: false,
            prod_url: None,
        };
        args.execute().await.unwrap();

        let home = std::fs::read_to_string(dir.path().join("out").join("index.html")).unwrap();
        assert!(home.contains("<title>Home</title>"));
        assert!(home.contains("<p>Hello</p>"));
        assert!(!dir.path().join("out").join("blank").exists());
    }
}
