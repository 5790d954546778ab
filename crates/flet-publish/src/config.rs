//! Optional `publish.toml` configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use flet_bundle::{RouteUrlStrategy, WebRenderer};
use serde::Deserialize;

/// Default config file name.
pub const CONFIG_FILE: &str = "publish.toml";

/// Configuration file structure (publish.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub publish: PublishSettings,
}

/// Defaults for the publish command. Command-line flags take precedence.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PublishSettings {
    pub assets: Option<PathBuf>,
    pub app_title: Option<String>,
    pub app_description: Option<String>,
    pub base_url: Option<String>,
    pub web_renderer: Option<WebRenderer>,
    pub route_url_strategy: Option<RouteUrlStrategy>,
    #[serde(default)]
    pub pre: bool,
    pub web_dir: Option<PathBuf>,
    pub distpath: Option<PathBuf>,
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

pub const DEFAULT_CONFIG: &str = r#"# flet-publish configuration
# Command-line flags override these values.
# web_dir and distpath are relative to this file.

[publish]
# Assets directory, relative to the app script
# assets = "assets"

# Page title and description
# app_title = "My App"
# app_description = "My Flet app"

# Base URL the app is served under
# base_url = "/"

# "canvaskit" or "html"
web_renderer = "canvaskit"

# "path" or "hash"
route_url_strategy = "path"

# Allow pre-release Python packages
pre = false

# Prebuilt Flet web runtime (defaults to FLET_WEB_DIR or web/ next to the binary)
# web_dir = "/opt/flet/web"

# Output directory (defaults to dist/ next to the app script when unset)
# distpath = "dist"
"#;
