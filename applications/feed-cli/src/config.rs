/// Feed CLI configuration
use crate::error::{CliError, Result};
use fuplay_feed::FeedConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default = "default_library")]
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibrarySettings {
    /// Directories scanned for videos
    #[serde(default)]
    pub directories: Vec<PathBuf>,

    /// Maximum directory depth (unlimited when absent)
    #[serde(default)]
    pub max_depth: Option<usize>,

    #[serde(default = "default_follow_links")]
    pub follow_links: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        default_library()
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// `path` defaults to `fuplay.toml` in the working directory; a missing
    /// default file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from("fuplay.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (FUPLAY_FEED__TICK_INTERVAL_MS=50)
        settings = settings.add_source(
            config::Environment::with_prefix("FUPLAY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.feed
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;

        if self.library.max_depth == Some(0) {
            return Err(CliError::Config(
                "library.max_depth must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Library directories, with `extra` taking precedence when given
    pub fn directories(&self, extra: &[PathBuf]) -> Vec<PathBuf> {
        if extra.is_empty() {
            self.library.directories.clone()
        } else {
            extra.to_vec()
        }
    }
}

// Default values
fn default_library() -> LibrarySettings {
    LibrarySettings {
        directories: Vec::new(),
        max_depth: None,
        follow_links: default_follow_links(),
    }
}

fn default_follow_links() -> bool {
    true
}
