//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::import::mapper::{Locale, Placeholders};
use crate::import::{IngestOptions, Strictness};

/// Actor label used when nothing else names the current user
pub const DEFAULT_USER: &str = "Admin";

/// partcat configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Label written to audit entries
    pub user: Option<String>,

    /// Language of the placeholders filled in for missing CSV fields
    pub locale: Option<Locale>,

    /// What to do with CSV rows that have no sku
    pub strictness: Option<Strictness>,

    /// Override for the placeholder picture URL
    pub placeholder_image: Option<String>,

    /// Output format used when `--format auto`
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        Self::load_with(None)
    }

    /// Like [`Config::load`], with an extra file layered above the global one
    pub fn load_with(explicit: Option<&Path>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/partcat/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. File named on the command line
        if let Some(path) = explicit {
            match Self::read_file(path) {
                Some(file) => config.merge(file),
                None => warn!(path = %path.display(), "config file not loaded"),
            }
        }

        // 4. Environment variables
        if let Ok(user) = std::env::var("PARTCAT_USER") {
            config.user = Some(user);
        }
        if let Ok(locale) = std::env::var("PARTCAT_LOCALE") {
            match locale.parse() {
                Ok(l) => config.locale = Some(l),
                Err(e) => warn!("ignoring PARTCAT_LOCALE: {}", e),
            }
        }
        if let Ok(strictness) = std::env::var("PARTCAT_STRICTNESS") {
            match strictness.parse() {
                Ok(s) => config.strictness = Some(s),
                Err(e) => warn!("ignoring PARTCAT_STRICTNESS: {}", e),
            }
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config");
                Some(config)
            }
            Err(e) => {
                warn!(path = %path.display(), "invalid config: {}", e);
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "partcat")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.user.is_some() {
            self.user = other.user;
        }
        if other.locale.is_some() {
            self.locale = other.locale;
        }
        if other.strictness.is_some() {
            self.strictness = other.strictness;
        }
        if other.placeholder_image.is_some() {
            self.placeholder_image = other.placeholder_image;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Get the audit user, falling back to the login name
    pub fn user(&self) -> String {
        if let Some(ref user) = self.user {
            if !user.trim().is_empty() {
                return user.trim().to_string();
            }
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| DEFAULT_USER.to_string())
    }

    /// Placeholders for the configured locale and image
    pub fn placeholders(&self) -> Placeholders {
        let mut placeholders = Placeholders::for_locale(self.locale.unwrap_or_default());
        if let Some(ref image) = self.placeholder_image {
            placeholders.image = image.clone();
        }
        placeholders
    }

    /// Ingestion settings derived from this configuration
    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            strictness: self.strictness.unwrap_or_default(),
            placeholders: self.placeholders(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            user: Some("Admin".to_string()),
            locale: Some(Locale::En),
            ..Config::default()
        };
        base.merge(Config {
            locale: Some(Locale::Es),
            strictness: Some(Strictness::Warn),
            ..Config::default()
        });
        assert_eq!(base.user.as_deref(), Some("Admin"));
        assert_eq!(base.locale, Some(Locale::Es));
        assert_eq!(base.strictness, Some(Strictness::Warn));
    }

    #[test]
    fn test_read_yaml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        fs::write(
            &path,
            "user: Maria\nlocale: es\nstrictness: strict\nplaceholder_image: https://img.example/none.png\n",
        )
        .unwrap();

        let config = Config::read_file(&path).unwrap();
        assert_eq!(config.user(), "Maria");
        assert_eq!(config.locale, Some(Locale::Es));

        let options = config.ingest_options();
        assert_eq!(options.strictness, Strictness::Strict);
        assert_eq!(options.placeholders.image, "https://img.example/none.png");
        assert_eq!(options.placeholders.name, "Producto Nuevo");
    }

    #[test]
    fn test_invalid_yaml_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        fs::write(&path, "strictness: [not, a, level]\n").unwrap();
        assert!(Config::read_file(&path).is_none());
        assert!(Config::read_file(&tmp.path().join("missing.yaml")).is_none());
    }

    #[test]
    fn test_defaults() {
        let options = Config::default().ingest_options();
        assert_eq!(options.strictness, Strictness::Lenient);
        assert_eq!(options.placeholders, Placeholders::english());
    }
}
