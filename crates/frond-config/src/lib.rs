//! Configuration management for frond.
//!
//! Parses `frond.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `env.prod_url` supports environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! ## Example
//!
//! ```toml
//! [env]
//! prod = true
//! prod_url = "${SITE_URL:-https://example.com}"
//!
//! [slugs]
//! hierarchical_types = ["page"]
//! locales = { es = "es" }
//! types = { product = "shop" }
//! taxonomies = { category = "topics" }
//!
//! [slugs.localized.es]
//! types = { product = "tienda" }
//!
//! [source]
//! data = "data/site.json"
//! output_dir = "dist"
//! ```

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override production flag.
    pub prod: Option<bool>,
    /// Override production URL.
    pub prod_url: Option<String>,
    /// Override local data file.
    pub data: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "frond.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Environment flags.
    pub env: EnvConfig,
    /// Slug composition rules.
    pub slugs: SlugConfig,
    /// Source configuration (paths are relative strings from TOML).
    source: SourceConfigRaw,

    /// Resolved source configuration (set after loading).
    #[serde(skip)]
    pub source_resolved: SourceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::rooted_at(Path::new("."))
    }
}

/// Environment flags.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Whether permalinks are prefixed with the production URL.
    pub prod: bool,
    /// Production site URL (e.g. `https://example.com`).
    pub prod_url: Option<String>,
}

impl EnvConfig {
    /// Production URL without trailing slash, when running in production.
    #[must_use]
    pub fn permalink_base(&self) -> Option<&str> {
        if !self.prod {
            return None;
        }
        self.prod_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }
}

/// Slug composition rules.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SlugConfig {
    /// Content types whose parents form a physical path (e.g. pages).
    pub hierarchical_types: Vec<String>,
    /// Locale → slug prefix.
    pub locales: BTreeMap<String, String>,
    /// Content type → type segment override.
    pub types: BTreeMap<String, String>,
    /// Taxonomy id → taxonomy segment.
    pub taxonomies: BTreeMap<String, String>,
    /// Locale-specific overrides of `types` and `taxonomies`.
    pub localized: BTreeMap<String, LocalizedSlugs>,
}

impl Default for SlugConfig {
    fn default() -> Self {
        Self {
            hierarchical_types: vec!["page".to_owned()],
            locales: BTreeMap::new(),
            types: BTreeMap::new(),
            taxonomies: BTreeMap::new(),
            localized: BTreeMap::new(),
        }
    }
}

/// Locale-specific slug overrides.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LocalizedSlugs {
    pub types: BTreeMap<String, String>,
    pub taxonomies: BTreeMap<String, String>,
}

impl SlugConfig {
    /// Whether parents of `content_type` are placed right before the item slug.
    #[must_use]
    pub fn is_hierarchical(&self, content_type: &str) -> bool {
        self.hierarchical_types.iter().any(|t| t == content_type)
    }

    /// Slug prefix configured for `locale`.
    #[must_use]
    pub fn locale_prefix(&self, locale: Option<&str>) -> Option<&str> {
        non_empty(self.locales.get(locale?))
    }

    /// Type segment override for `content_type`; the locale-specific entry wins.
    #[must_use]
    pub fn type_in_slug(&self, content_type: &str, locale: Option<&str>) -> Option<&str> {
        self.localized(locale, |l| &l.types, content_type)
            .or_else(|| non_empty(self.types.get(content_type)))
    }

    /// Segment for taxonomy `taxonomy`; the locale-specific entry wins.
    #[must_use]
    pub fn taxonomy_slug(&self, taxonomy: &str, locale: Option<&str>) -> Option<&str> {
        self.localized(locale, |l| &l.taxonomies, taxonomy)
            .or_else(|| non_empty(self.taxonomies.get(taxonomy)))
    }

    fn localized<'a>(
        &'a self,
        locale: Option<&str>,
        map: impl Fn(&'a LocalizedSlugs) -> &'a BTreeMap<String, String>,
        key: &str,
    ) -> Option<&'a str> {
        let overrides = self.localized.get(locale?)?;
        non_empty(map(overrides).get(key))
    }

    /// Strip surrounding slashes from configured segments.
    fn normalize(&mut self) {
        let trim = |map: &mut BTreeMap<String, String>| {
            for value in map.values_mut() {
                *value = value.trim_matches('/').to_owned();
            }
        };
        trim(&mut self.locales);
        trim(&mut self.types);
        trim(&mut self.taxonomies);
        for overrides in self.localized.values_mut() {
            trim(&mut overrides.types);
            trim(&mut overrides.taxonomies);
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

/// Raw source configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SourceConfigRaw {
    data: Option<String>,
    output_dir: Option<String>,
}

/// Resolved source configuration with absolute paths.
#[derive(Debug, Default)]
pub struct SourceConfig {
    /// Local JSON data file.
    pub data: PathBuf,
    /// Directory rendered pages are written to.
    pub output_dir: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`env.prod_url`").
        field: String,
        /// Error message (e.g., "${`SITE_URL`} not set").
        message: String,
    },
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::Validation(format!("{field} {message}"))
}

/// Nearest `frond.toml` in `start` or one of its ancestors.
fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// Without an explicit `config_path`, the nearest `frond.toml` in the
    /// working directory or its parents is used. With none found, paths
    /// default to `data.json` and `dist` in the working directory.
    ///
    /// CLI settings take precedence over file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_default();
        let path = match config_path {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => Some(path.to_path_buf()),
            None => find_config(&cwd),
        };
        let mut config = match path {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::rooted_at(&cwd),
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(prod) = settings.prod {
            self.env.prod = prod;
        }
        if let Some(prod_url) = &settings.prod_url {
            self.env.prod_url = Some(prod_url.clone());
        }
        if let Some(data) = &settings.data {
            self.source_resolved.data.clone_from(data);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.source_resolved.output_dir.clone_from(output_dir);
        }
    }

    /// Default configuration with source paths under `base`.
    fn rooted_at(base: &Path) -> Self {
        let mut config = Self {
            env: EnvConfig::default(),
            slugs: SlugConfig::default(),
            source: SourceConfigRaw::default(),
            source_resolved: SourceConfig::default(),
        };
        config.resolve_paths(base);
        config
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.slugs.normalize();

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_env()?;
        self.validate_slugs()?;
        Ok(())
    }

    fn validate_env(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.env.prod_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(invalid("env.prod_url", "must start with http:// or https://"));
        }
        if self.env.prod && self.env.prod_url.is_none() {
            tracing::warn!("env.prod is set without env.prod_url, permalinks stay relative");
        }
        Ok(())
    }

    fn validate_slugs(&self) -> Result<(), ConfigError> {
        if self.slugs.hierarchical_types.iter().any(String::is_empty) {
            return Err(invalid("slugs.hierarchical_types", "cannot contain empty entries"));
        }
        if let Some(locale) = self
            .slugs
            .locales
            .iter()
            .find_map(|(locale, prefix)| prefix.contains(['?', '#']).then_some(locale))
        {
            return Err(invalid(
                &format!("slugs.locales.{locale}"),
                "cannot contain '?' or '#'",
            ));
        }
        if self.slugs.localized.contains_key("") {
            return Err(invalid("slugs.localized", "cannot have an empty locale"));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.env.prod_url {
            self.env.prod_url = Some(expand::expand_env(url, "env.prod_url")?);
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.source_resolved = SourceConfig {
            data: resolve(self.source.data.as_deref(), "data.json"),
            output_dir: resolve(self.source.output_dir.as_deref(), "dist"),
        };
    }
}
