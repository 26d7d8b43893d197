//! Configuration management for the Pulsar site tooling.
//!
//! Parses `pulsar-site.toml` with serde and provides auto-discovery of the
//! config file in parent directories. The resolved [`LinkBases`] are what the
//! inject resolvers consume.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! URL values support `${VAR}` and `${VAR:-default}`:
//!
//! - `site.url`
//! - `site.github_url`
//! - every `links.*` override

mod expand;
pub mod versions;

use std::path::{Path, PathBuf};

use pulsar_inject::{DEFAULT_GITHUB_URL, DEFAULT_SITE_URL, LinkBases};
use serde::Deserialize;

pub use versions::{CURRENT_VERSION, DocsVersions, VersionEntry};

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the public site URL (and every base derived from it).
    pub site_url: Option<String>,
    /// Override the markdown source directory.
    pub source_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "pulsar-site.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site URLs.
    pub site: SiteConfig,
    /// Per-API base URL overrides.
    links: LinksConfigRaw,
    /// Docs paths as relative strings from TOML.
    docs: DocsConfigRaw,

    /// Resolved link bases (set after loading).
    #[serde(skip)]
    pub links_resolved: LinkBases,
    /// Resolved docs paths (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Public site URLs.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Public URL of the website; API references live below it.
    pub url: String,
    /// Source repository URL.
    pub github_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SITE_URL.to_owned(),
            github_url: DEFAULT_GITHUB_URL.to_owned(),
        }
    }
}

/// Explicit base URLs replacing the ones derived from `site.url`.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LinksConfigRaw {
    javadoc: Option<String>,
    rest: Option<String>,
    functions: Option<String>,
    source: Option<String>,
    sink: Option<String>,
    packages: Option<String>,
    transactions: Option<String>,
    lookup: Option<String>,
}

impl LinksConfigRaw {
    fn fields_mut(&mut self) -> [(&'static str, &mut Option<String>); 8] {
        [
            ("links.javadoc", &mut self.javadoc),
            ("links.rest", &mut self.rest),
            ("links.functions", &mut self.functions),
            ("links.source", &mut self.source),
            ("links.sink", &mut self.sink),
            ("links.packages", &mut self.packages),
            ("links.transactions", &mut self.transactions),
            ("links.lookup", &mut self.lookup),
        ]
    }
}

/// Raw docs configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    versions_file: Option<String>,
    build_versions_file: Option<String>,
}

/// Resolved docs configuration with absolute paths.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DocsConfig {
    /// Markdown source directory.
    pub source_dir: PathBuf,
    /// JSON list of released versions.
    pub versions_file: PathBuf,
    /// Optional JSON list of versions to build.
    pub build_versions_file: PathBuf,
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
    /// JSON parsing error (versions files).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.url`").
        field: String,
        /// Error message (e.g., "${`SITE_URL`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `pulsar-site.toml` in the current directory and its parents, and
    /// falls back to defaults.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, parsing or
    /// environment expansion fails, or the result doesn't validate.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(site_url) = &settings.site_url {
            self.site.url.clone_from(site_url);
            self.resolve_links();
        }
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
    }

    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            site: SiteConfig::default(),
            links: LinksConfigRaw::default(),
            docs: DocsConfigRaw::default(),
            links_resolved: LinkBases::default(),
            docs_resolved: DocsConfig::default(),
            config_path: None,
        };
        config.resolve_paths(base);
        config
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.resolve_links();
        config.config_path = Some(path.to_path_buf());

        tracing::debug!(path = %path.display(), site_url = %config.site.url, "Loaded config");
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a URL is empty or not http(s).
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site.url, "site.url")?;
        require_http_url(&self.site.url, "site.url")?;
        require_non_empty(&self.site.github_url, "site.github_url")?;
        require_http_url(&self.site.github_url, "site.github_url")?;

        let bases = &self.links_resolved;
        for (field, url) in [
            ("links.javadoc", &bases.javadoc),
            ("links.rest", &bases.rest),
            ("links.functions", &bases.functions),
            ("links.source", &bases.source),
            ("links.sink", &bases.sink),
            ("links.packages", &bases.packages),
            ("links.transactions", &bases.transactions),
            ("links.lookup", &bases.lookup),
        ] {
            require_non_empty(url, field)?;
            require_http_url(url, field)?;
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.url = expand::expand_env(&self.site.url, "site.url")?;
        self.site.github_url = expand::expand_env(&self.site.github_url, "site.github_url")?;

        for (field, value) in self.links.fields_mut() {
            if let Some(url) = value.as_deref() {
                *value = Some(expand::expand_env(url, field)?);
            }
        }

        Ok(())
    }

    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.docs_resolved = DocsConfig {
            source_dir: resolve(self.docs.source_dir.as_deref(), "docs"),
            versions_file: resolve(self.docs.versions_file.as_deref(), "versions.json"),
            build_versions_file: resolve(
                self.docs.build_versions_file.as_deref(),
                ".build-versions.json",
            ),
        };
    }

    /// Derive link bases from `site` and apply `[links]` overrides.
    fn resolve_links(&mut self) {
        let mut bases = LinkBases::from_site_url(&self.site.url, &self.site.github_url);
        let links = &self.links;

        for (base, value) in [
            (&mut bases.javadoc, &links.javadoc),
            (&mut bases.rest, &links.rest),
            (&mut bases.functions, &links.functions),
            (&mut bases.source, &links.source),
            (&mut bases.sink, &links.sink),
            (&mut bases.packages, &links.packages),
            (&mut bases.transactions, &links.transactions),
            (&mut bases.lookup, &links.lookup),
        ] {
            if let Some(value) = value {
                base.clone_from(value);
            }
        }

        self.links_resolved = bases;
    }
}
